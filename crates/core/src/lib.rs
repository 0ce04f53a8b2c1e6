//! Agrinet Core Library
//!
//! This crate provides the foundational utilities shared by the advisor crates:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (application, advisor and search settings)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AdvisorConfig, AppConfig, SearchConfig};
pub use error::{AppError, AppResult};
