//! Wiring shared by the commands: building the engine, the generator and
//! the suggester from the loaded configuration, and printing turn results.

use agrinet_advisor::{
    citation::render_sources, Generator, GenerationRequest, Glossary, InMemoryConversationStore,
    LlmGenerator, LlmSuggester, MarqoSearch, Orchestrator, ResponseLanguage, TurnOutcome,
};
use agrinet_core::{config::AppConfig, AppError, AppResult};
use agrinet_llm::{create_client, LlmClient};
use agrinet_prompt::{load_prompt, ANSWER_PROMPT_ID, SUGGESTIONS_PROMPT_ID};
use std::sync::Arc;
use std::time::Duration;

/// Parse a `--lang` value against the configured regional language.
pub fn response_language(lang: &str, config: &AppConfig) -> AppResult<ResponseLanguage> {
    ResponseLanguage::from_tag(lang, &config.advisor.regional_language).ok_or_else(|| {
        AppError::Config(format!(
            "Unsupported response language '{}'. Supported: {}",
            lang,
            config.advisor.supported_languages().join(", ")
        ))
    })
}

/// Glossary from the configured file, or the built-in one.
pub fn load_glossary(config: &AppConfig) -> AppResult<Arc<Glossary>> {
    let glossary = match config.glossary_path() {
        Some(path) => Glossary::load(&path)?,
        None => Glossary::builtin(),
    };
    Ok(Arc::new(glossary))
}

/// Orchestrator over the configured Marqo index with an in-memory store.
pub fn build_orchestrator(config: &AppConfig) -> AppResult<Orchestrator> {
    let endpoint = config.search.endpoint.as_deref().ok_or_else(|| {
        AppError::Config(
            "No search endpoint configured. Set AGRINET_SEARCH_ENDPOINT or search.endpoint in config.yaml"
                .to_string(),
        )
    })?;

    let search = MarqoSearch::with_timeout(
        endpoint,
        &config.search.index_name,
        config.advisor.sub_query_timeout(),
    )?;

    Orchestrator::new(
        config.advisor.clone(),
        Arc::new(search),
        load_glossary(config)?,
        Arc::new(InMemoryConversationStore::new()),
    )
}

fn build_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let provider_config = config.get_provider_config(&config.provider);
    let endpoint = provider_config.map(|pc| pc.endpoint.as_str());
    let timeout = provider_config
        .and_then(|pc| pc.timeout)
        .map(Duration::from_secs);

    create_client(&config.provider, endpoint, timeout)
}

/// Answer generator for the active provider.
pub fn build_generator(config: &AppConfig) -> AppResult<LlmGenerator> {
    let client = build_client(config)?;
    let prompt = load_prompt(&config.workspace, ANSWER_PROMPT_ID)?;
    tracing::debug!("Loaded prompt definition: {}", prompt.id);

    Ok(LlmGenerator::new(client, config.model.clone(), prompt))
}

/// Follow-up question suggester for the active provider.
pub fn build_suggester(config: &AppConfig) -> AppResult<LlmSuggester> {
    let client = build_client(config)?;
    let prompt = load_prompt(&config.workspace, SUGGESTIONS_PROMPT_ID)?;
    tracing::debug!("Loaded prompt definition: {}", prompt.id);

    Ok(LlmSuggester::new(client, config.model.clone(), prompt))
}

/// Plain-text block listing suggested questions. Empty when there are none.
pub fn render_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let mut out = String::from("Suggested questions:\n");
    for question in suggestions {
        out.push_str(&format!("- {}\n", question));
    }
    out
}

/// Produce the farmer-facing answer for a handled turn.
pub async fn answer(generator: &dyn Generator, outcome: &TurnOutcome) -> AppResult<String> {
    let request = GenerationRequest::from(&outcome.context);
    generator.generate(&request).await
}

/// Plain-text rendering of a turn: the answer followed by its sources.
pub fn render_text(outcome: &TurnOutcome, answer: Option<&str>) -> String {
    let mut out = String::new();

    match answer {
        Some(text) => out.push_str(text.trim_end()),
        None => {
            if let Some(template) = outcome.context.decline {
                out.push_str(&format!("Declined ({})", template.id()));
            } else if outcome.context.is_no_evidence() {
                out.push_str("No evidence found");
            } else {
                out.push_str(&format!(
                    "{} evidence documents from {} sub-queries",
                    outcome.context.evidence.len(),
                    outcome.sub_queries.len()
                ));
            }
        }
    }

    if !outcome.context.citations.is_empty() {
        out.push_str("\n\nSources:\n");
        out.push_str(&render_sources(&outcome.context.citations));
    }

    out
}

/// JSON rendering of a turn.
pub fn render_json(
    outcome: &TurnOutcome,
    answer: Option<&str>,
    suggestions: Option<&[String]>,
) -> AppResult<String> {
    let output = serde_json::json!({
        "answer": answer,
        "suggestions": suggestions,
        "turn": outcome,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrinet_core::config::ProviderConfig;

    fn config() -> AppConfig {
        AppConfig::default()
    }

    #[test]
    fn test_response_language_tags() {
        let config = config();
        assert_eq!(response_language("en", &config).unwrap(), ResponseLanguage::English);
        assert_eq!(response_language("gu", &config).unwrap(), ResponseLanguage::Regional);
        assert!(matches!(
            response_language("ta", &config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_orchestrator_requires_endpoint() {
        match build_orchestrator(&config()) {
            Err(AppError::Config(msg)) => assert!(msg.contains("search endpoint")),
            _ => panic!("Expected config error without a search endpoint"),
        }
    }

    #[test]
    fn test_orchestrator_with_endpoint() {
        let mut config = config();
        config.search.endpoint = Some("http://localhost:8882".to_string());
        assert!(build_orchestrator(&config).is_ok());
    }

    #[test]
    fn test_glossary_from_workspace_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("terms.json"),
            r#"[{"en": "groundnut", "gu": "મગફળી", "transliteration": "magfali"}]"#,
        )
        .unwrap();

        let mut config = config();
        config.workspace = dir.path().to_path_buf();
        config.search.glossary_path = Some("terms.json".into());

        let glossary = load_glossary(&config).unwrap();
        assert_eq!(glossary.len(), 1);
        assert!(glossary.lookup("groundnut").is_some());
    }

    #[test]
    fn test_generator_uses_provider_endpoint() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = config();
        config.workspace = dir.path().to_path_buf();
        config.llm = Some(agrinet_core::config::LlmConfig {
            active_provider: "ollama".to_string(),
            providers: [(
                "ollama".to_string(),
                ProviderConfig {
                    endpoint: "http://localhost:11500".to_string(),
                    model: "llama3.2".to_string(),
                    timeout: Some(30),
                },
            )]
            .into_iter()
            .collect(),
        });
        assert!(build_generator(&config).is_ok());
        assert!(build_suggester(&config).is_ok());
    }

    #[test]
    fn test_render_suggestions() {
        assert!(render_suggestions(&[]).is_empty());
        let text = render_suggestions(&["How to prevent mastitis?".to_string()]);
        assert_eq!(text, "Suggested questions:\n- How to prevent mastitis?\n");
    }
}
