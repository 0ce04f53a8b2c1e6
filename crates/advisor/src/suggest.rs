//! Follow-up question suggestions.
//!
//! Suggestions are grounded the same way answers are: the topic of the
//! session's latest agricultural turn is searched again and only that
//! evidence is shown to the model.

use crate::generation::render_evidence;
use crate::query::{display_name, ResponseLanguage};
use crate::retrieval::{MergedEvidence, PartialRetrievalFailure};
use agrinet_core::AppResult;
use agrinet_llm::{LlmClient, LlmRequest};
use agrinet_prompt::{build_prompt, PromptDefinition};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const DEFAULT_COUNT: usize = 3;

/// Evidence and conversation a suggester works from.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionContext {
    pub language: ResponseLanguage,
    pub language_tag: String,
    /// Farmer queries in the lookback window, oldest first.
    pub recent_queries: Vec<String>,
    /// Search basis of the turn being followed up, if any.
    pub topic: Option<String>,
    pub evidence: MergedEvidence,
    pub failures: Vec<PartialRetrievalFailure>,
}

impl SuggestionContext {
    pub fn is_grounded(&self) -> bool {
        self.topic.is_some() && !self.evidence.is_empty()
    }
}

/// Capability that turns a grounded context into follow-up questions.
#[async_trait::async_trait]
pub trait Suggester: Send + Sync {
    async fn suggest(&self, context: &SuggestionContext) -> AppResult<Vec<String>>;
}

/// Suggester backed by an LLM client and the suggestions prompt.
pub struct LlmSuggester {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    count: usize,
}

impl LlmSuggester {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            count: DEFAULT_COUNT,
        }
    }

    /// Number of questions to ask for. At least one.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count.max(1);
        self
    }

    fn variables(&self, context: &SuggestionContext) -> HashMap<String, String> {
        let conversation = context
            .recent_queries
            .iter()
            .map(|q| format!("- {}", q))
            .collect::<Vec<_>>()
            .join("\n");

        let mut vars = HashMap::new();
        vars.insert(
            "language".to_string(),
            display_name(&context.language_tag).to_string(),
        );
        vars.insert("conversation".to_string(), conversation);
        vars.insert("evidence".to_string(), render_evidence(&context.evidence));
        vars.insert("count".to_string(), self.count.to_string());
        vars
    }
}

#[async_trait::async_trait]
impl Suggester for LlmSuggester {
    async fn suggest(&self, context: &SuggestionContext) -> AppResult<Vec<String>> {
        if !context.is_grounded() {
            return Ok(Vec::new());
        }

        let built = build_prompt(&self.prompt, self.variables(context))?;
        let mut request = LlmRequest::new(built.user, self.model.clone());
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(temperature) = built.metadata.temperature {
            request = request.with_temperature(temperature);
        }

        let response = self.client.complete(&request).await?;
        let suggestions = parse_suggestions(&response.content, self.count);
        if suggestions.is_empty() {
            tracing::warn!("Model reply held no usable suggestions");
        }
        Ok(suggestions)
    }
}

/// Questions from a model reply: a JSON array of strings, optionally fenced,
/// or failing that one question per line. Repeats are dropped.
pub fn parse_suggestions(reply: &str, max: usize) -> Vec<String> {
    let candidates = json_array(reply).unwrap_or_else(|| {
        reply
            .lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .map(strip_list_marker)
            .map(str::to_string)
            .collect()
    });

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(max)
        .collect()
}

fn json_array(reply: &str) -> Option<Vec<String>> {
    let start = reply.find('[')?;
    let end = reply.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&reply[start..=end]).ok()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line);

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{merge_results, SearchResult};
    use crate::vocab::Intent;
    use agrinet_llm::{LlmResponse, LlmUsage};
    use agrinet_prompt::{default_prompt, SUGGESTIONS_PROMPT_ID};
    use std::sync::Mutex;

    struct CannedClient {
        reply: String,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl CannedClient {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for CannedClient {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    fn context(evidence: MergedEvidence) -> SuggestionContext {
        SuggestionContext {
            language: ResponseLanguage::Regional,
            language_tag: "gu".to_string(),
            recent_queries: vec!["How to treat mastitis in cows?".to_string()],
            topic: Some("How to treat mastitis in cows?".to_string()),
            evidence,
            failures: Vec::new(),
        }
    }

    fn evidence() -> MergedEvidence {
        merge_results(&[(
            Intent::Treatment,
            vec![SearchResult {
                document_id: "vet-12".to_string(),
                display_name: "Mastitis treatment guide".to_string(),
                snippet: "Strip the infected quarter.".to_string(),
                sub_query_index: 0,
                score: 0.8,
            }],
        )])
    }

    fn suggester(client: Arc<CannedClient>) -> LlmSuggester {
        LlmSuggester::new(client, "llama3.2", default_prompt(SUGGESTIONS_PROMPT_ID).unwrap())
    }

    #[test]
    fn test_parse_json_array_in_fence() {
        let reply = "```json\n[\"How to prevent mastitis?\", \"What feed helps recovery?\"]\n```";
        assert_eq!(
            parse_suggestions(reply, 3),
            vec!["How to prevent mastitis?", "What feed helps recovery?"]
        );
    }

    #[test]
    fn test_parse_numbered_lines() {
        let reply = "1. How to prevent mastitis?\n2) When to call a vet?\n- how to prevent mastitis?\n\n";
        assert_eq!(
            parse_suggestions(reply, 5),
            vec!["How to prevent mastitis?", "When to call a vet?"]
        );
    }

    #[test]
    fn test_parse_caps_count() {
        let reply = r#"["a?", "b?", "c?", "d?"]"#;
        assert_eq!(parse_suggestions(reply, 2), vec!["a?", "b?"]);
    }

    #[tokio::test]
    async fn test_ungrounded_context_skips_llm() {
        let client = CannedClient::new("[\"x?\"]");
        let suggestions = suggester(Arc::clone(&client))
            .suggest(&context(MergedEvidence::default()))
            .await
            .unwrap();
        assert!(suggestions.is_empty());
        assert!(client.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_carries_conversation_and_evidence() {
        let client = CannedClient::new(r#"["How to prevent mastitis?", "Which teat dip to use?"]"#);
        let suggestions = suggester(Arc::clone(&client))
            .with_count(2)
            .suggest(&context(evidence()))
            .await
            .unwrap();
        assert_eq!(suggestions.len(), 2);

        let requests = client.requests.lock().unwrap();
        let sent = &requests[0];
        assert!(sent.prompt.contains("- How to treat mastitis in cows?"));
        assert!(sent.prompt.contains("Strip the infected quarter."));
        let system = sent.system.as_deref().unwrap();
        assert!(system.contains("Gujarati"));
        assert!(system.contains("exactly 2 strings"));
    }
}
