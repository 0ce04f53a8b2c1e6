//! Classify command handler.
//!
//! Shows the category, action and sub-query plan for a query without
//! calling the search service or the LLM.

use super::engine;
use agrinet_advisor::{Query, QueryDecomposer, RuleClassifier};
use agrinet_core::{config::AppConfig, AppResult};
use clap::Args;

/// Classify a query and show its search plan
#[derive(Args, Debug)]
pub struct ClassifyCommand {
    /// The farmer's question
    pub query: String,

    /// Response language (en or the regional tag, e.g. gu)
    #[arg(short, long, default_value = "en")]
    pub lang: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ClassifyCommand {
    /// Execute the classify command.
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing classify command");

        let language = engine::response_language(&self.lang, config)?;
        let glossary = engine::load_glossary(config)?;
        let classifier = RuleClassifier::new(&config.advisor, glossary.clone());
        let decomposer = QueryDecomposer::new(&config.advisor, glossary);

        let query = Query::new(self.query.as_str(), language);
        let classification = classifier.classify(&query, &[]);
        let plan = if classification.is_proceed() {
            decomposer.decompose(query.text())
        } else {
            Vec::new()
        };

        if self.json {
            let output = serde_json::json!({
                "query": query,
                "classification": classification,
                "subQueries": plan,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Category:  {}", classification.category());
        match classification.decline_template() {
            Some(template) => println!("Action:    decline ({})", template.id()),
            None => println!("Action:    proceed"),
        }
        if let Some(rationale) = classification.rationale() {
            println!("Rationale: {}", rationale);
        }
        for sub_query in &plan {
            println!(
                "  [{}] {} ({})",
                sub_query.cluster,
                sub_query.text,
                sub_query.intent.as_str()
            );
        }

        Ok(())
    }
}
