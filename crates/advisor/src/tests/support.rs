//! Scripted search backend, recording generator, suggester and store doubles.

use crate::classifier::DeclineTemplate;
use crate::generation::{GenerationRequest, Generator};
use crate::glossary::Glossary;
use crate::orchestrator::Orchestrator;
use crate::search::{DocumentSearch, SearchHit};
use crate::state::{ConversationState, ConversationStore, ConversationTurn, InMemoryConversationStore, SessionId};
use crate::suggest::{Suggester, SuggestionContext};
use agrinet_core::{AdvisorConfig, AppError, AppResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub enum Scripted {
    Hits(Vec<SearchHit>),
    Fail(String),
    Delayed(Duration, Vec<SearchHit>),
}

/// Search backend answering from a fixed table keyed by query text.
/// Unknown queries return no hits.
#[derive(Default)]
pub struct StaticSearch {
    responses: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.responses.insert(query.to_string(), Scripted::Hits(hits));
        self
    }

    pub fn failing(mut self, query: &str, message: &str) -> Self {
        self.responses
            .insert(query.to_string(), Scripted::Fail(message.to_string()));
        self
    }

    pub fn delayed(mut self, query: &str, delay: Duration, hits: Vec<SearchHit>) -> Self {
        self.responses
            .insert(query.to_string(), Scripted::Delayed(delay, hits));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DocumentSearch for StaticSearch {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<SearchHit>> {
        self.calls.lock().unwrap().push(query.to_string());
        match self.responses.get(query) {
            Some(Scripted::Hits(hits)) => Ok(hits.iter().take(limit).cloned().collect()),
            Some(Scripted::Fail(message)) => Err(AppError::Search(message.clone())),
            Some(Scripted::Delayed(delay, hits)) => {
                tokio::time::sleep(*delay).await;
                Ok(hits.iter().take(limit).cloned().collect())
            }
            None => Ok(Vec::new()),
        }
    }
}

pub fn hit(id: &str, name: &str, snippet: &str, score: f32) -> SearchHit {
    SearchHit::new(id, name, snippet, score)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedGeneration {
    pub decline: Option<DeclineTemplate>,
    pub citation_ids: Vec<String>,
    pub evidence_ids: Vec<String>,
}

/// Generator that records what it was asked and returns a summary line.
#[derive(Default)]
pub struct RecordingGenerator {
    pub requests: Mutex<Vec<RecordedGeneration>>,
}

#[async_trait::async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest<'_>) -> AppResult<String> {
        self.requests.lock().unwrap().push(RecordedGeneration {
            decline: request.decline,
            citation_ids: request.citations.iter().map(|c| c.document_id.clone()).collect(),
            evidence_ids: request.evidence.document_ids(),
        });
        Ok(match request.decline {
            Some(template) => format!("declined: {}", template.id()),
            None if request.evidence.is_empty() => "not found".to_string(),
            None => format!("answered from {} documents", request.evidence.len()),
        })
    }
}

/// Suggester that records the contexts it was given.
#[derive(Default)]
pub struct RecordingSuggester {
    pub contexts: Mutex<Vec<SuggestionContext>>,
}

#[async_trait::async_trait]
impl Suggester for RecordingSuggester {
    async fn suggest(&self, context: &SuggestionContext) -> AppResult<Vec<String>> {
        self.contexts.lock().unwrap().push(context.clone());
        Ok(context
            .evidence
            .entries()
            .iter()
            .map(|e| format!("What does {} say?", e.display_name))
            .collect())
    }
}

/// Store that always claims the session is empty, so every turn after the
/// first is appended out of order.
#[derive(Default)]
pub struct StaleStore {
    inner: InMemoryConversationStore,
}

impl ConversationStore for StaleStore {
    fn append(&self, session: &SessionId, turn: ConversationTurn) -> AppResult<()> {
        self.inner.append(session, turn)
    }

    fn last_n(&self, session: &SessionId, n: usize) -> Vec<ConversationTurn> {
        self.inner.last_n(session, n)
    }

    fn next_position(&self, _session: &SessionId) -> u64 {
        0
    }

    fn state(&self, session: &SessionId) -> Option<ConversationState> {
        self.inner.state(session)
    }

    fn clear(&self, session: &SessionId) -> bool {
        self.inner.clear(session)
    }
}

pub fn orchestrator_with(
    config: AdvisorConfig,
    search: Arc<StaticSearch>,
    store: Arc<dyn ConversationStore>,
) -> Orchestrator {
    Orchestrator::new(config, search, Arc::new(Glossary::builtin()), store).unwrap()
}

pub fn orchestrator(search: Arc<StaticSearch>) -> Orchestrator {
    orchestrator_with(
        AdvisorConfig::default(),
        search,
        Arc::new(InMemoryConversationStore::new()),
    )
}
