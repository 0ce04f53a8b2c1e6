//! Turn orchestration.
//!
//! A turn moves through a fixed state machine:
//!
//! ```text
//! Received -> Classified -> Declined
//!                        -> Retrieving -> EvidenceReady -> Answering
//!                                      -> NoEvidence
//! ```
//!
//! Declined turns never reach the decomposer or the search backend. The
//! conversation store is written exactly once per turn, after the turn has
//! reached a terminal state.

use crate::citation::{cite, Citation};
use crate::classifier::{Classification, DeclineTemplate, RuleClassifier};
use crate::decompose::{QueryDecomposer, SearchSubQuery};
use crate::glossary::Glossary;
use crate::query::{Query, ResponseLanguage};
use crate::retrieval::{MergedEvidence, PartialRetrievalFailure, RetrievalExecutor};
use crate::search::DocumentSearch;
use crate::state::{AnswerSummary, ConversationStore, ConversationTurn, SessionId, TurnOutcomeKind};
use crate::suggest::{SuggestionContext, Suggester};
use agrinet_core::{AdvisorConfig, AppResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Received,
    Classified,
    Declined,
    Retrieving,
    EvidenceReady,
    Answering,
    NoEvidence,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Answering | Self::NoEvidence)
    }
}

/// Everything the generation layer needs for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerContext {
    pub query_text: String,
    pub language: ResponseLanguage,
    pub language_tag: String,
    pub evidence: MergedEvidence,
    pub citations: Vec<Citation>,
    pub decline: Option<DeclineTemplate>,
}

impl AnswerContext {
    pub fn is_declined(&self) -> bool {
        self.decline.is_some()
    }

    /// Approved, but nothing was found to answer from.
    pub fn is_no_evidence(&self) -> bool {
        self.decline.is_none() && self.evidence.is_empty()
    }
}

/// Result of one handled turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub session: SessionId,
    pub position: u64,
    pub classification: Classification,
    pub sub_queries: Vec<SearchSubQuery>,
    pub failures: Vec<PartialRetrievalFailure>,
    /// States visited, in order.
    pub states: Vec<TurnState>,
    pub context: AnswerContext,
}

impl TurnOutcome {
    pub fn terminal_state(&self) -> TurnState {
        self.states.last().copied().unwrap_or(TurnState::Received)
    }
}

/// Sequences classification, decomposition, retrieval and citation for a turn.
pub struct Orchestrator {
    config: AdvisorConfig,
    classifier: RuleClassifier,
    decomposer: QueryDecomposer,
    executor: RetrievalExecutor,
    store: Arc<dyn ConversationStore>,
    session_locks: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(
        config: AdvisorConfig,
        search: Arc<dyn DocumentSearch>,
        glossary: Arc<Glossary>,
        store: Arc<dyn ConversationStore>,
    ) -> AppResult<Self> {
        config.validate()?;

        tracing::debug!(
            "Orchestrator using search backend '{}' with {} glossary terms",
            search.name(),
            glossary.len()
        );

        let executor = RetrievalExecutor::new(
            search,
            Arc::clone(&glossary),
            config.sub_query_timeout(),
            config.turn_deadline(),
            config.max_results_per_sub_query,
        );

        Ok(Self {
            classifier: RuleClassifier::new(&config, Arc::clone(&glossary)),
            decomposer: QueryDecomposer::new(&config, glossary),
            executor,
            store,
            config,
            session_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Handle one query for `session` and record it.
    ///
    /// Only a sequencing error from the store fails the call. Search
    /// failures are reported in the outcome.
    pub async fn handle_turn(&self, session: &SessionId, query: Query) -> AppResult<TurnOutcome> {
        let lock = self.session_lock(session);
        let result = {
            let _guard = lock.lock().await;
            let position = self.store.next_position(session);
            let span = tracing::info_span!("turn", session = %session, position);
            self.run_turn(session, position, query).instrument(span).await
        };
        self.release_session_lock(session, lock);
        result
    }

    /// Search the topic of the session's latest agricultural turn again and
    /// collect the evidence follow-up suggestions may draw on.
    ///
    /// Nothing is recorded. The context is empty when the session has no
    /// agricultural turn in the lookback window.
    pub async fn suggestion_context(&self, session: &SessionId) -> SuggestionContext {
        let lock = self.session_lock(session);
        let context = {
            let _guard = lock.lock().await;
            let span = tracing::info_span!("suggest", session = %session);
            self.collect_suggestion_context(session).instrument(span).await
        };
        self.release_session_lock(session, lock);
        context
    }

    /// Follow-up questions for `session`, grounded in freshly retrieved evidence.
    ///
    /// Returns an empty list without calling `suggester` when there is no
    /// topic to follow up on or nothing was found for it.
    pub async fn suggest(&self, session: &SessionId, suggester: &dyn Suggester) -> AppResult<Vec<String>> {
        let context = self.suggestion_context(session).await;
        if !context.is_grounded() {
            tracing::info!("No grounded topic to suggest follow-ups for in session {}", session);
            return Ok(Vec::new());
        }
        let suggestions = suggester.suggest(&context).await?;
        tracing::info!("Suggested {} follow-up questions", suggestions.len());
        Ok(suggestions)
    }

    /// Forget a session's log. Returns whether it existed.
    pub fn end_session(&self, session: &SessionId) -> bool {
        self.session_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session);
        let existed = self.store.clear(session);
        tracing::info!("Ended session {}", session);
        existed
    }

    fn session_lock(&self, session: &SessionId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .session_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(session.clone()).or_default())
    }

    /// Forget the session's lock once no other caller holds or waits on it.
    fn release_session_lock(&self, session: &SessionId, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .session_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let idle = locks
            .get(session)
            .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            locks.remove(session);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_sessions(&self) -> usize {
        self.session_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn collect_suggestion_context(&self, session: &SessionId) -> SuggestionContext {
        let history = self.store.last_n(session, self.config.lookback_turns);
        let recent_queries = history.iter().map(|t| t.query.text().to_string()).collect();
        let language = history
            .last()
            .map_or(ResponseLanguage::English, |t| t.query.response_language());
        let mut context = SuggestionContext {
            language,
            language_tag: language.tag(&self.config.regional_language).to_string(),
            recent_queries,
            topic: None,
            evidence: MergedEvidence::default(),
            failures: Vec::new(),
        };

        let Some(anchor) = history.iter().rev().find(|t| t.classification.is_proceed()) else {
            return context;
        };

        let sub_queries = self.decomposer.decompose(&anchor.search_basis);
        let annotate = language == ResponseLanguage::Regional;
        let report = self.executor.execute(&sub_queries, annotate).await;
        tracing::debug!(
            "Suggestion search for turn {} found {} documents",
            anchor.position,
            report.evidence.len()
        );

        context.topic = Some(anchor.search_basis.clone());
        context.evidence = report.evidence.truncated(self.config.max_evidence_documents);
        context.failures = report.failures;
        context
    }

    async fn run_turn(&self, session: &SessionId, position: u64, query: Query) -> AppResult<TurnOutcome> {
        let mut states = vec![TurnState::Received];
        tracing::info!("Received query ({} chars)", query.text().chars().count());

        let history = self.store.last_n(session, self.config.lookback_turns);
        let classification = self.classifier.classify(&query, &history);
        transition(&mut states, TurnState::Classified);

        let language = query.response_language();
        let language_tag = language.tag(&self.config.regional_language).to_string();

        if let Some(template) = classification.decline_template() {
            transition(&mut states, TurnState::Declined);
            tracing::info!(
                category = classification.category().as_str(),
                template = template.id(),
                "Declined"
            );

            let basis = query.text().to_string();
            let context = AnswerContext {
                query_text: query.text().to_string(),
                language,
                language_tag,
                evidence: MergedEvidence::default(),
                citations: Vec::new(),
                decline: Some(template),
            };
            let turn = ConversationTurn::new(position, query, classification.clone(), basis)
                .with_answer(AnswerSummary::declined());
            self.store.append(session, turn)?;

            return Ok(TurnOutcome {
                session: session.clone(),
                position,
                classification,
                sub_queries: Vec::new(),
                failures: Vec::new(),
                states,
                context,
            });
        }

        let basis = self.decomposer.resolve_basis(&query, &classification, &history);
        let sub_queries = self.decomposer.decompose(&basis);
        transition(&mut states, TurnState::Retrieving);

        let annotate = language == ResponseLanguage::Regional;
        let report = self.executor.execute(&sub_queries, annotate).await;

        let (evidence, outcome) = if report.no_evidence_found() {
            transition(&mut states, TurnState::NoEvidence);
            tracing::info!("No evidence found for {} sub-queries", sub_queries.len());
            (MergedEvidence::default(), TurnOutcomeKind::NoEvidence)
        } else {
            transition(&mut states, TurnState::EvidenceReady);
            let evidence = report.evidence.truncated(self.config.max_evidence_documents);
            transition(&mut states, TurnState::Answering);
            (evidence, TurnOutcomeKind::Answered)
        };

        let citations = cite(&evidence);
        tracing::info!(
            documents = evidence.len(),
            failures = report.failures.len(),
            "Evidence ready"
        );

        let summary = AnswerSummary {
            outcome,
            document_ids: evidence.document_ids(),
            citation_count: citations.len(),
            partial_failures: report.failures.len(),
        };
        let context = AnswerContext {
            query_text: query.text().to_string(),
            language,
            language_tag,
            evidence,
            citations,
            decline: None,
        };
        let turn = ConversationTurn::new(position, query, classification.clone(), basis).with_answer(summary);
        self.store.append(session, turn)?;

        Ok(TurnOutcome {
            session: session.clone(),
            position,
            classification,
            sub_queries,
            failures: report.failures,
            states,
            context,
        })
    }
}

fn transition(states: &mut Vec<TurnState>, next: TurnState) {
    if let Some(from) = states.last() {
        tracing::debug!("{:?} -> {:?}", from, next);
    }
    states.push(next);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TurnState::Declined.is_terminal());
        assert!(TurnState::Answering.is_terminal());
        assert!(TurnState::NoEvidence.is_terminal());
        assert!(!TurnState::Retrieving.is_terminal());
        assert!(!TurnState::EvidenceReady.is_terminal());
    }

    #[test]
    fn test_answer_context_flags() {
        let context = AnswerContext {
            query_text: "q".to_string(),
            language: ResponseLanguage::English,
            language_tag: "en".to_string(),
            evidence: MergedEvidence::default(),
            citations: Vec::new(),
            decline: None,
        };
        assert!(context.is_no_evidence());
        assert!(!context.is_declined());

        let declined = AnswerContext {
            decline: Some(DeclineTemplate::Political),
            ..context
        };
        assert!(declined.is_declined());
        assert!(!declined.is_no_evidence());
    }
}
