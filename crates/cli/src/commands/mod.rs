//! Command handlers for the Agrinet CLI.

pub mod ask;
pub mod chat;
pub mod classify;
mod engine;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use classify::ClassifyCommand;
