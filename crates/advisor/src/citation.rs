//! Binding answers to the documents that back them.
//!
//! Citations are only ever derived from the evidence of the current turn,
//! so a citation for a document that was not retrieved cannot be built.

use crate::retrieval::MergedEvidence;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub display_name: String,
}

/// Cite every document in `evidence`, in rank order.
pub fn cite(evidence: &MergedEvidence) -> Vec<Citation> {
    evidence
        .entries()
        .iter()
        .map(|entry| Citation {
            document_id: entry.document_id.clone(),
            display_name: entry.display_name.clone(),
        })
        .collect()
}

/// Cite the documents a generator reports having used.
///
/// Keeps the order of `used`, drops repeats, and drops any id that is not
/// part of `evidence`.
pub fn cite_subset<S: AsRef<str>>(evidence: &MergedEvidence, used: &[S]) -> Vec<Citation> {
    let mut seen = HashSet::new();
    let mut citations = Vec::new();

    for id in used {
        let id = id.as_ref();
        let Some(entry) = evidence.get(id) else {
            tracing::warn!("Dropping citation for document '{}' not in evidence", id);
            continue;
        };
        if seen.insert(id.to_string()) {
            citations.push(Citation {
                document_id: entry.document_id.clone(),
                display_name: entry.display_name.clone(),
            });
        }
    }

    citations
}

/// True when every citation refers to a document in `evidence`.
pub fn verify(citations: &[Citation], evidence: &MergedEvidence) -> bool {
    citations.iter().all(|c| evidence.contains(&c.document_id))
}

/// Markdown list of citations, one per line.
pub fn render_sources(citations: &[Citation]) -> String {
    citations
        .iter()
        .map(|c| {
            if c.display_name.is_empty() {
                format!("- {}", c.document_id)
            } else {
                format!("- {} ({})", c.display_name, c.document_id)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
