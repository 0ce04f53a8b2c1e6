//! Per-session conversation log.
//!
//! Turns are appended once, after a turn reaches a terminal state, and are
//! never modified afterwards. Positions start at 0 and must be contiguous.

use crate::classifier::Classification;
use crate::query::Query;
use agrinet_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Identifier scoping one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random session id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcomeKind {
    Declined,
    NoEvidence,
    Answered,
}

/// What the turn produced, without the generated prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSummary {
    pub outcome: TurnOutcomeKind,
    pub document_ids: Vec<String>,
    pub citation_count: usize,
    pub partial_failures: usize,
}

impl AnswerSummary {
    pub fn declined() -> Self {
        Self {
            outcome: TurnOutcomeKind::Declined,
            document_ids: Vec::new(),
            citation_count: 0,
            partial_failures: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub position: u64,
    pub query: Query,
    pub classification: Classification,
    /// Text the sub-queries were built from. Differs from the query text
    /// when a short reply was resolved against an earlier turn.
    pub search_basis: String,
    pub answer: Option<AnswerSummary>,
    pub recorded_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(
        position: u64,
        query: Query,
        classification: Classification,
        search_basis: impl Into<String>,
    ) -> Self {
        Self {
            position,
            query,
            classification,
            search_basis: search_basis.into(),
            answer: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_answer(mut self, answer: AnswerSummary) -> Self {
        self.answer = Some(answer);
        self
    }
}

/// Ordered turns of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: SessionId,
    pub turns: Vec<ConversationTurn>,
}

impl ConversationState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            turns: Vec::new(),
        }
    }

    pub fn next_position(&self) -> u64 {
        self.turns.last().map_or(0, |t| t.position + 1)
    }

    /// The `n` most recent turns, oldest first.
    pub fn last_n(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    fn push(&mut self, turn: ConversationTurn) -> AppResult<()> {
        let expected = self.next_position();
        if turn.position != expected {
            return Err(AppError::InvalidTurnOrder {
                session: self.session_id.to_string(),
                expected,
                found: turn.position,
            });
        }
        self.turns.push(turn);
        Ok(())
    }
}

/// Storage for conversation logs.
///
/// Implementations must reject out-of-sequence appends and must never
/// hand out turns belonging to another session.
pub trait ConversationStore: Send + Sync {
    /// Append a completed turn. Fails with `InvalidTurnOrder` unless the turn
    /// position is exactly one past the last stored position.
    fn append(&self, session: &SessionId, turn: ConversationTurn) -> AppResult<()>;

    /// Up to `n` most recent turns, oldest first. Unknown sessions yield nothing.
    fn last_n(&self, session: &SessionId, n: usize) -> Vec<ConversationTurn>;

    /// Position the next turn of this session must carry.
    fn next_position(&self, session: &SessionId) -> u64;

    /// Full copy of a session's log.
    fn state(&self, session: &SessionId) -> Option<ConversationState>;

    /// Forget a session. Returns whether it existed.
    fn clear(&self, session: &SessionId) -> bool;
}

/// Process-local store. Sessions are independent map entries.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: RwLock<HashMap<SessionId, ConversationState>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn append(&self, session: &SessionId, turn: ConversationTurn) -> AppResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let position = turn.position;
        sessions
            .entry(session.clone())
            .or_insert_with(|| ConversationState::new(session.clone()))
            .push(turn)?;
        tracing::debug!("Appended turn {} to session {}", position, session);
        Ok(())
    }

    fn last_n(&self, session: &SessionId, n: usize) -> Vec<ConversationTurn> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .map(|state| state.last_n(n).to_vec())
            .unwrap_or_default()
    }

    fn next_position(&self, session: &SessionId) -> u64 {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .map_or(0, ConversationState::next_position)
    }

    fn state(&self, session: &SessionId) -> Option<ConversationState> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .cloned()
    }

    fn clear(&self, session: &SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session)
            .is_some()
    }
}
