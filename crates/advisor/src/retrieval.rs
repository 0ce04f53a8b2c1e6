//! Concurrent fan-out of sub-queries and merging of their results.
//!
//! Every sub-query gets its own search call under a per-call timeout, and
//! the whole fan-out is bounded by a turn deadline. A failed or late call
//! becomes a [`PartialRetrievalFailure`] and the turn carries on with
//! whatever did come back.

use crate::decompose::SearchSubQuery;
use crate::glossary::Glossary;
use crate::search::{clean_snippet, DocumentSearch, SearchHit};
use crate::vocab::Intent;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, timeout_at, Instant};

/// One hit, tagged with the sub-query that found it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: String,
    pub display_name: String,
    pub snippet: String,
    pub sub_query_index: usize,
    pub score: f32,
}

impl SearchResult {
    pub fn from_hit(hit: SearchHit, sub_query_index: usize) -> Self {
        Self {
            document_id: hit.document_id,
            display_name: hit.display_name,
            snippet: hit.snippet,
            sub_query_index,
            score: hit.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSnippet {
    pub text: String,
    pub sub_query_index: usize,
    pub intent: Intent,
}

/// All evidence for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub document_id: String,
    pub display_name: String,
    /// Highest score any sub-query gave this document.
    pub score: f32,
    /// Earliest sub-query that returned this document.
    pub first_sub_query: usize,
    /// Distinct snippets in discovery order.
    pub snippets: Vec<EvidenceSnippet>,
}

/// Deduplicated, ranked evidence for a turn. Each document id appears once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedEvidence {
    entries: Vec<EvidenceEntry>,
}

impl MergedEvidence {
    pub fn entries(&self) -> &[EvidenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, document_id: &str) -> bool {
        self.entries.iter().any(|e| e.document_id == document_id)
    }

    pub fn get(&self, document_id: &str) -> Option<&EvidenceEntry> {
        self.entries.iter().find(|e| e.document_id == document_id)
    }

    pub fn document_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.document_id.clone()).collect()
    }

    /// The `n` best entries.
    pub fn truncated(&self, n: usize) -> Self {
        Self {
            entries: self.entries.iter().take(n).cloned().collect(),
        }
    }

    /// Entries grouped under the intent of their first snippet, in rank order.
    pub fn grouped_by_intent(&self) -> Vec<(Intent, Vec<&EvidenceEntry>)> {
        let mut groups: Vec<(Intent, Vec<&EvidenceEntry>)> = Vec::new();
        for entry in &self.entries {
            let intent = entry
                .snippets
                .first()
                .map_or(Intent::General, |s| s.intent);
            match groups.iter_mut().find(|(i, _)| *i == intent) {
                Some((_, members)) => members.push(entry),
                None => groups.push((intent, vec![entry])),
            }
        }
        groups
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "message")]
pub enum FailureReason {
    Error(String),
    Timeout,
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(message) => write!(f, "error: {}", message),
            Self::Timeout => f.write_str("timed out"),
            Self::Cancelled => f.write_str("cancelled at turn deadline"),
        }
    }
}

/// A sub-query that contributed nothing. Recorded, never raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialRetrievalFailure {
    pub sub_query: String,
    pub index: usize,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalReport {
    pub evidence: MergedEvidence,
    pub failures: Vec<PartialRetrievalFailure>,
}

impl RetrievalReport {
    /// Designed outcome: nothing usable came back.
    pub fn no_evidence_found(&self) -> bool {
        self.evidence.is_empty()
    }
}

type CallOutcome = Result<Vec<SearchHit>, FailureReason>;

/// Issues one search call per sub-query and merges what comes back.
pub struct RetrievalExecutor {
    search: Arc<dyn DocumentSearch>,
    glossary: Arc<Glossary>,
    call_timeout: Duration,
    turn_deadline: Duration,
    limit: usize,
}

impl RetrievalExecutor {
    pub fn new(
        search: Arc<dyn DocumentSearch>,
        glossary: Arc<Glossary>,
        call_timeout: Duration,
        turn_deadline: Duration,
        limit: usize,
    ) -> Self {
        Self {
            search,
            glossary,
            call_timeout,
            turn_deadline,
            limit,
        }
    }

    /// Run every sub-query concurrently and merge the results.
    ///
    /// With `annotate` set, snippets get regional glossary terms in brackets.
    pub async fn execute(&self, sub_queries: &[SearchSubQuery], annotate: bool) -> RetrievalReport {
        let deadline = Instant::now() + self.turn_deadline;
        let mut slots: Vec<Option<CallOutcome>> = vec![None; sub_queries.len()];

        let mut in_flight: FuturesUnordered<_> = sub_queries
            .iter()
            .enumerate()
            .map(|(index, sub)| async move {
                let outcome = match timeout(self.call_timeout, self.search.search(&sub.text, self.limit)).await {
                    Ok(Ok(hits)) => Ok(hits),
                    Ok(Err(e)) => Err(FailureReason::Error(e.to_string())),
                    Err(_) => Err(FailureReason::Timeout),
                };
                (index, outcome)
            })
            .collect();

        loop {
            let next = timeout_at(deadline, in_flight.next()).await;
            match next {
                Ok(Some((index, outcome))) => slots[index] = Some(outcome),
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        "Turn deadline reached with {} sub-queries in flight",
                        in_flight.len()
                    );
                    break;
                }
            }
        }
        // Dropping the stream cancels whatever is still running.
        drop(in_flight);

        let mut batches = Vec::with_capacity(sub_queries.len());
        let mut failures = Vec::new();

        for (index, (sub, slot)) in sub_queries.iter().zip(slots).enumerate() {
            match slot.unwrap_or(Err(FailureReason::Cancelled)) {
                Ok(hits) => {
                    let results: Vec<SearchResult> = hits
                        .into_iter()
                        .map(|hit| self.prepare(hit, index, annotate))
                        .collect();
                    batches.push((sub.intent, results));
                }
                Err(reason) => {
                    tracing::warn!(sub_query = %sub.text, %reason, "Sub-query failed");
                    failures.push(PartialRetrievalFailure {
                        sub_query: sub.text.clone(),
                        index,
                        reason,
                    });
                    batches.push((sub.intent, Vec::new()));
                }
            }
        }

        let evidence = merge_results(&batches);
        tracing::debug!(
            "Merged {} documents from {} sub-queries ({} failed)",
            evidence.len(),
            sub_queries.len(),
            failures.len()
        );

        RetrievalReport { evidence, failures }
    }

    fn prepare(&self, hit: SearchHit, index: usize, annotate: bool) -> SearchResult {
        let mut result = SearchResult::from_hit(hit, index);
        result.snippet = clean_snippet(&result.snippet);
        if annotate {
            result.snippet = self.glossary.annotate(&result.snippet);
        }
        result
    }
}

/// Merge per-sub-query result batches given in issue order.
///
/// Documents are keyed by id: the highest score wins, snippets are unioned
/// without exact repeats, and the final order is score descending, then
/// earliest sub-query, then document id. The output depends only on the
/// batch contents, never on completion order.
pub fn merge_results(batches: &[(Intent, Vec<SearchResult>)]) -> MergedEvidence {
    let mut entries: Vec<EvidenceEntry> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for (intent, results) in batches {
        for result in results {
            let score = if result.score.is_finite() { result.score } else { 0.0 };
            let snippet = EvidenceSnippet {
                text: result.snippet.clone(),
                sub_query_index: result.sub_query_index,
                intent: *intent,
            };

            let existing = by_id.get(&result.document_id).copied();
            match existing {
                Some(slot) => {
                    let entry = &mut entries[slot];
                    if score > entry.score {
                        entry.score = score;
                    }
                    if entry.display_name.is_empty() {
                        entry.display_name = result.display_name.clone();
                    }
                    if !snippet.text.is_empty()
                        && !entry.snippets.iter().any(|s| s.text == snippet.text)
                    {
                        entry.snippets.push(snippet);
                    }
                }
                None => {
                    by_id.insert(result.document_id.clone(), entries.len());
                    entries.push(EvidenceEntry {
                        document_id: result.document_id.clone(),
                        display_name: result.display_name.clone(),
                        score,
                        first_sub_query: result.sub_query_index,
                        snippets: if snippet.text.is_empty() {
                            Vec::new()
                        } else {
                            vec![snippet]
                        },
                    });
                }
            }
        }
    }

    entries.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.first_sub_query.cmp(&b.first_sub_query))
            .then_with(|| a.document_id.cmp(&b.document_id))
    });

    MergedEvidence { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, score: f32, sub: usize, snippet: &str) -> SearchResult {
        SearchResult {
            document_id: id.to_string(),
            display_name: format!("Doc {}", id),
            snippet: snippet.to_string(),
            sub_query_index: sub,
            score,
        }
    }

    #[test]
    fn test_merge_keeps_each_id_once_with_best_score() {
        let batches = vec![
            (Intent::Treatment, vec![result("a", 0.4, 0, "first"), result("b", 0.9, 0, "b")]),
            (Intent::Symptom, vec![result("a", 0.7, 1, "second")]),
        ];
        let merged = merge_results(&batches);

        assert_eq!(merged.document_ids(), vec!["b", "a"]);
        let a = merged.get("a").unwrap();
        assert_eq!(a.score, 0.7);
        assert_eq!(a.first_sub_query, 0);
        let texts: Vec<_> = a.snippets.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_merge_drops_repeated_snippets() {
        let batches = vec![
            (Intent::General, vec![result("a", 0.5, 0, "same text")]),
            (Intent::General, vec![result("a", 0.5, 1, "same text")]),
        ];
        assert_eq!(merge_results(&batches).entries()[0].snippets.len(), 1);
    }

    #[test]
    fn test_ties_break_on_sub_query_then_id() {
        let batches = vec![
            (Intent::General, vec![result("z", 0.5, 0, "z")]),
            (Intent::General, vec![result("c", 0.5, 1, "c"), result("b", 0.5, 1, "b")]),
        ];
        assert_eq!(merge_results(&batches).document_ids(), vec!["z", "b", "c"]);
    }

    #[test]
    fn test_non_finite_scores_rank_last() {
        let batches = vec![(
            Intent::General,
            vec![result("nan", f32::NAN, 0, "x"), result("ok", 0.1, 0, "y")],
        )];
        let merged = merge_results(&batches);
        assert_eq!(merged.document_ids(), vec!["ok", "nan"]);
        assert_eq!(merged.get("nan").unwrap().score, 0.0);
    }

    #[test]
    fn test_empty_batches_merge_to_nothing() {
        let batches = vec![(Intent::General, Vec::new()), (Intent::Treatment, Vec::new())];
        assert!(merge_results(&batches).is_empty());
    }

    #[test]
    fn test_grouped_by_intent_keeps_rank_order() {
        let batches = vec![
            (Intent::Treatment, vec![result("a", 0.9, 0, "a"), result("c", 0.3, 0, "c")]),
            (Intent::Prevention, vec![result("b", 0.5, 1, "b")]),
        ];
        let merged = merge_results(&batches);
        let groups = merged.grouped_by_intent();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Intent::Treatment);
        let ids: Vec<_> = groups[0].1.iter().map(|e| e.document_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(groups[1].0, Intent::Prevention);
    }

    #[test]
    fn test_truncated_keeps_best() {
        let batches = vec![(
            Intent::General,
            vec![result("a", 0.1, 0, "a"), result("b", 0.9, 0, "b"), result("c", 0.5, 0, "c")],
        )];
        assert_eq!(merge_results(&batches).truncated(2).document_ids(), vec!["b", "c"]);
    }
}
