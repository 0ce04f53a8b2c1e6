//! Document search capability.

mod marqo;

pub use marqo::MarqoSearch;

use agrinet_core::AppResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// One ranked document returned by a search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: String,
    pub display_name: String,
    pub snippet: String,
    pub score: f32,
}

impl SearchHit {
    pub fn new(
        document_id: impl Into<String>,
        display_name: impl Into<String>,
        snippet: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            display_name: display_name.into(),
            snippet: snippet.into(),
            score,
        }
    }
}

/// A search backend the retrieval executor can fan out to.
#[async_trait::async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Return up to `limit` hits for an English query, best first.
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<SearchHit>>;
}

static BLANK_LINES: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\n{2,}"));
static TAB_RUNS: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\t+"));

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!("Snippet pattern {:?} failed to compile, leaving text as is: {}", pattern, e);
            None
        }
    }
}

/// Collapse runs of blank lines and tabs in retrieved text.
pub fn clean_snippet(text: &str) -> String {
    let mut cleaned = text.to_string();
    if let Some(re) = BLANK_LINES.as_ref() {
        cleaned = re.replace_all(&cleaned, "\n\n").into_owned();
    }
    if let Some(re) = TAB_RUNS.as_ref() {
        cleaned = re.replace_all(&cleaned, "\t").into_owned();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_patterns_compile() {
        assert!(BLANK_LINES.is_some());
        assert!(TAB_RUNS.is_some());
        assert!(compile("(unclosed").is_none());
    }

    #[test]
    fn test_clean_snippet_collapses_whitespace_runs() {
        assert_eq!(clean_snippet("a\n\n\n\nb\t\t\tc"), "a\n\nb\tc");
        assert_eq!(clean_snippet("single\nline\tok"), "single\nline\tok");
    }
}
