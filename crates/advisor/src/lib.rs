//! Query classification and multi-query retrieval for the Agrinet advisor.
//!
//! A farmer's query is gated by a rule classifier, decomposed into short
//! English search phrases, fanned out concurrently to a document search
//! backend, and merged into ranked, cited evidence for the generation layer.
//!
//! # Example
//! ```no_run
//! use agrinet_advisor::{
//!     Glossary, InMemoryConversationStore, MarqoSearch, Orchestrator, Query, ResponseLanguage,
//!     SessionId,
//! };
//! use agrinet_core::AdvisorConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(
//!     AdvisorConfig::default(),
//!     Arc::new(MarqoSearch::new("http://localhost:8882", "sunbird-va-index")),
//!     Arc::new(Glossary::builtin()),
//!     Arc::new(InMemoryConversationStore::new()),
//! )?;
//!
//! let session = SessionId::generate();
//! let query = Query::new("How to treat mastitis in cows?", ResponseLanguage::English);
//! let outcome = orchestrator.handle_turn(&session, query).await?;
//! for citation in &outcome.context.citations {
//!     println!("{}", citation.display_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod citation;
pub mod classifier;
pub mod decompose;
pub mod generation;
pub mod glossary;
pub mod orchestrator;
pub mod query;
pub mod retrieval;
pub mod search;
pub mod state;
pub mod suggest;
pub mod vocab;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use citation::Citation;
pub use classifier::{Action, Category, Classification, DeclineTemplate, RuleClassifier};
pub use decompose::{QueryDecomposer, SearchSubQuery};
pub use generation::{GenerationRequest, Generator, LlmGenerator};
pub use glossary::{Glossary, TermPair};
pub use orchestrator::{AnswerContext, Orchestrator, TurnOutcome, TurnState};
pub use query::{Query, ResponseLanguage};
pub use retrieval::{
    FailureReason, MergedEvidence, PartialRetrievalFailure, RetrievalExecutor, RetrievalReport,
};
pub use search::{DocumentSearch, MarqoSearch, SearchHit};
pub use state::{ConversationStore, ConversationTurn, InMemoryConversationStore, SessionId};
pub use suggest::{LlmSuggester, Suggester, SuggestionContext};
pub use vocab::Intent;
