//! Generation boundary.
//!
//! The engine hands an [`AnswerContext`] to a [`Generator`] and treats the
//! returned prose as opaque.

use crate::citation::{render_sources, Citation};
use crate::classifier::DeclineTemplate;
use crate::orchestrator::AnswerContext;
use crate::query::display_name;
use crate::retrieval::MergedEvidence;
use agrinet_core::{AppError, AppResult};
use agrinet_llm::{LlmClient, LlmRequest};
use agrinet_prompt::{build_prompt, decline_message, not_found_message, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Inputs to a generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub query: &'a str,
    pub language_tag: &'a str,
    pub evidence: &'a MergedEvidence,
    pub citations: &'a [Citation],
    pub decline: Option<DeclineTemplate>,
}

impl<'a> From<&'a AnswerContext> for GenerationRequest<'a> {
    fn from(context: &'a AnswerContext) -> Self {
        Self {
            query: &context.query_text,
            language_tag: &context.language_tag,
            evidence: &context.evidence,
            citations: &context.citations,
            decline: context.decline,
        }
    }
}

/// Language generation capability.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest<'_>) -> AppResult<String>;
}

/// Generator backed by an LLM client and a prompt definition.
///
/// Declines and empty-evidence turns are answered from the fixed message
/// table; the LLM only sees turns with evidence.
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    max_tokens: Option<u32>,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn variables(&self, request: &GenerationRequest<'_>) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), request.query.to_string());
        vars.insert(
            "language".to_string(),
            display_name(request.language_tag).to_string(),
        );
        vars.insert("evidence".to_string(), render_evidence(request.evidence));
        vars.insert("citations".to_string(), render_sources(request.citations));
        vars
    }
}

#[async_trait::async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, request: &GenerationRequest<'_>) -> AppResult<String> {
        if let Some(template) = request.decline {
            return decline_message(template.id(), request.language_tag)
                .map(str::to_string)
                .ok_or_else(|| AppError::Prompt(format!("No decline message for {}", template.id())));
        }

        if request.evidence.is_empty() {
            return Ok(not_found_message(request.language_tag).to_string());
        }

        let built = build_prompt(&self.prompt, self.variables(request))?;

        let mut llm_request = LlmRequest::new(built.user, self.model.clone());
        if let Some(system) = built.system {
            llm_request = llm_request.with_system(system);
        }
        if let Some(temperature) = built.metadata.temperature {
            llm_request = llm_request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            llm_request = llm_request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            provider = self.client.provider_name(),
            documents = request.evidence.len(),
            "Generating answer"
        );
        let response = self.client.complete(&llm_request).await?;
        Ok(response.content)
    }
}

/// Evidence as markdown, grouped by intent, one fenced block per snippet.
pub fn render_evidence(evidence: &MergedEvidence) -> String {
    let mut out = String::new();
    for (intent, entries) in evidence.grouped_by_intent() {
        out.push_str(&format!("## {}\n\n", intent.as_str()));
        for entry in entries {
            out.push_str(&format!("**{}** ({})\n", entry.display_name, entry.document_id));
            for snippet in &entry.snippets {
                out.push_str("```\n");
                out.push_str(&snippet.text);
                out.push_str("\n```\n");
            }
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}
