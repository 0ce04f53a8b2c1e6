//! Prompt and message rendering for the Agrinet advisor.
//!
//! This crate owns every piece of farmer-facing presentation text:
//! - YAML-based prompt definitions (with a built-in answer prompt)
//! - Handlebars template rendering
//! - Bilingual decline and "information not found" messages, keyed by
//!   the template identifiers the classifier emits

pub mod builder;
pub mod loader;
pub mod messages;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{default_prompt, load_prompt, ANSWER_PROMPT_ID, SUGGESTIONS_PROMPT_ID};
pub use messages::{decline_message, not_found_message};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptOutputSpec};
