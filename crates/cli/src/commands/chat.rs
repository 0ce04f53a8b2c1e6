//! Chat command handler.
//!
//! Reads one query per line from stdin and answers each in the same
//! session, so short follow-ups resolve against earlier turns.

use super::engine;
use agrinet_advisor::{Query, SessionId};
use agrinet_core::{config::AppConfig, AppResult};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Answer queries from stdin in one session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Response language (en or the regional tag, e.g. gu)
    #[arg(short, long, default_value = "en")]
    pub lang: String,

    /// Session identifier (a new one is generated when omitted)
    #[arg(short, long)]
    pub session: Option<String>,

    /// Output each turn as a JSON object
    #[arg(long)]
    pub json: bool,

    /// Suggest follow-up questions after each answer
    #[arg(long)]
    pub suggest: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let language = engine::response_language(&self.lang, config)?;
        let orchestrator = engine::build_orchestrator(config)?;
        let generator = engine::build_generator(config)?;
        let suggester = if self.suggest {
            Some(engine::build_suggester(config)?)
        } else {
            None
        };

        let session = self
            .session
            .as_deref()
            .map(SessionId::new)
            .unwrap_or_else(SessionId::generate);
        tracing::info!("Chat session {}", session);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }

            let outcome = orchestrator
                .handle_turn(&session, Query::new(text, language))
                .await?;
            let answer = engine::answer(&generator, &outcome).await?;
            let suggestions = match suggester {
                Some(ref suggester) => Some(orchestrator.suggest(&session, suggester).await?),
                None => None,
            };

            if self.json {
                println!("{}", serde_json::to_string(&serde_json::json!({
                    "answer": answer,
                    "suggestions": suggestions,
                    "turn": outcome,
                }))?);
            } else {
                println!("{}\n", engine::render_text(&outcome, Some(&answer)));
                if let Some(ref suggestions) = suggestions {
                    if !suggestions.is_empty() {
                        println!("{}", engine::render_suggestions(suggestions));
                    }
                }
            }
        }

        let turns = orchestrator.store().next_position(&session);
        tracing::info!("Chat session {} ended after {} turns", session, turns);
        orchestrator.end_session(&session);

        Ok(())
    }
}
