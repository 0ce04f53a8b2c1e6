//! Ask command handler.
//!
//! Runs one query through the advisor in a fresh session and prints the
//! answer with its sources.

use super::engine;
use agrinet_advisor::{Query, SessionId};
use agrinet_core::{config::AppConfig, AppError, AppResult};
use clap::Args;
use std::path::PathBuf;

/// Answer a single query
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The farmer's question
    pub query: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "query")]
    pub file: Option<PathBuf>,

    /// Response language (en or the regional tag, e.g. gu)
    #[arg(short, long, default_value = "en")]
    pub lang: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Stop after retrieval and print the evidence summary instead of an answer
    #[arg(long)]
    pub no_generate: bool,

    /// Also suggest follow-up questions grounded in the retrieved documents
    #[arg(long)]
    pub suggest: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let text = self.get_query()?;
        let language = engine::response_language(&self.lang, config)?;

        let orchestrator = engine::build_orchestrator(config)?;
        let generator = if self.no_generate {
            None
        } else {
            Some(engine::build_generator(config)?)
        };

        let session = SessionId::generate();
        let outcome = orchestrator
            .handle_turn(&session, Query::new(text, language))
            .await?;

        for failure in &outcome.failures {
            tracing::debug!("Sub-query '{}' failed: {}", failure.sub_query, failure.reason);
        }

        let answer = match generator {
            Some(ref generator) => Some(engine::answer(generator, &outcome).await?),
            None => None,
        };

        let suggestions = if self.suggest {
            let suggester = engine::build_suggester(config)?;
            Some(orchestrator.suggest(&session, &suggester).await?)
        } else {
            None
        };

        if self.json {
            println!(
                "{}",
                engine::render_json(&outcome, answer.as_deref(), suggestions.as_deref())?
            );
        } else {
            println!("{}", engine::render_text(&outcome, answer.as_deref()));
            if let Some(ref suggestions) = suggestions {
                print!("\n{}", engine::render_suggestions(suggestions));
            }
        }

        Ok(())
    }

    /// The question text from the argument or the file.
    fn get_query(&self) -> AppResult<String> {
        let text = match (&self.query, &self.file) {
            (Some(query), _) => query.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read query file {:?}: {}", path, e))
            })?,
            (None, None) => String::new(),
        };

        if text.trim().is_empty() {
            return Err(AppError::Config("No query provided".to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(query: Option<&str>, file: Option<PathBuf>) -> AskCommand {
        AskCommand {
            query: query.map(str::to_string),
            file,
            lang: "en".to_string(),
            json: false,
            no_generate: true,
            suggest: false,
        }
    }

    #[test]
    fn test_query_from_argument() {
        let cmd = command(Some("How to treat mastitis in cows?"), None);
        assert_eq!(cmd.get_query().unwrap(), "How to treat mastitis in cows?");
    }

    #[test]
    fn test_query_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("query.txt");
        std::fs::write(&path, "When to sow wheat?\n").unwrap();

        let cmd = command(None, Some(path));
        assert_eq!(cmd.get_query().unwrap().trim(), "When to sow wheat?");
    }

    #[test]
    fn test_blank_query_rejected() {
        assert!(command(Some("   "), None).get_query().is_err());
        assert!(command(None, None).get_query().is_err());
    }
}
