//! Marqo hybrid search client.
//!
//! Marqo API: https://docs.marqo.ai/latest/reference/api/search/search/

use super::{DocumentSearch, SearchHit};
use agrinet_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HybridParameters {
    retrieval_method: &'static str,
    ranking_method: &'static str,
    alpha: f32,
    rrf_k: u32,
}

impl Default for HybridParameters {
    fn default() -> Self {
        Self {
            retrieval_method: "disjunction",
            ranking_method: "rrf",
            alpha: 0.5,
            rrf_k: 60,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarqoRequest<'a> {
    q: &'a str,
    limit: usize,
    search_method: &'static str,
    hybrid_parameters: HybridParameters,
}

#[derive(Debug, Deserialize)]
struct MarqoResponse {
    #[serde(default)]
    hits: Vec<MarqoHit>,
}

#[derive(Debug, Deserialize)]
struct MarqoHit {
    #[serde(default)]
    doc_id: Option<String>,
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    text: String,
    #[serde(rename = "_score", default)]
    score: Option<f32>,
}

impl MarqoHit {
    fn into_hit(self) -> Option<SearchHit> {
        let document_id = self
            .doc_id
            .filter(|id| !id.is_empty())
            .or(self.id)
            .filter(|id| !id.is_empty())?;
        Some(SearchHit {
            document_id,
            display_name: self.name,
            snippet: self.text,
            score: self.score.unwrap_or(0.0),
        })
    }
}

/// Client for a Marqo index using hybrid (lexical + tensor) search.
pub struct MarqoSearch {
    endpoint: String,
    index_name: String,
    client: reqwest::Client,
}

impl MarqoSearch {
    pub fn new(endpoint: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            index_name: index_name.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        index_name: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Search(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            index_name: index_name.into(),
            client,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/indexes/{}/search", self.endpoint, self.index_name)
    }
}

#[async_trait::async_trait]
impl DocumentSearch for MarqoSearch {
    fn name(&self) -> &str {
        "marqo"
    }

    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<SearchHit>> {
        tracing::info!("Searching for '{}' in index '{}'", query, self.index_name);

        let body = MarqoRequest {
            q: query,
            limit,
            search_method: "HYBRID",
            hybrid_parameters: HybridParameters::default(),
        };

        let response = self
            .client
            .post(self.search_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to reach Marqo: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Search(format!(
                "Marqo API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: MarqoResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse Marqo response: {}", e)))?;

        let total = parsed.hits.len();
        let hits: Vec<SearchHit> = parsed
            .hits
            .into_iter()
            .filter_map(MarqoHit::into_hit)
            .collect();
        if hits.len() < total {
            tracing::debug!("Dropped {} Marqo hits without an id", total - hits.len());
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_uses_hybrid_rrf() {
        let body = MarqoRequest {
            q: "mastitis treatment cows",
            limit: 10,
            search_method: "HYBRID",
            hybrid_parameters: HybridParameters::default(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["q"], "mastitis treatment cows");
        assert_eq!(json["limit"], 10);
        assert_eq!(json["searchMethod"], "HYBRID");
        assert_eq!(json["hybridParameters"]["retrievalMethod"], "disjunction");
        assert_eq!(json["hybridParameters"]["rankingMethod"], "rrf");
        assert_eq!(json["hybridParameters"]["rrfK"], 60);
        assert_eq!(json["hybridParameters"]["alpha"], 0.5);
    }

    #[test]
    fn test_hit_prefers_doc_id_over_internal_id() {
        let hits: MarqoResponse = serde_json::from_str(
            r#"{"hits": [
                {"doc_id": "doc-7", "_id": "chunk-1", "name": "Mastitis", "text": "Milk cows last", "_score": 0.82},
                {"_id": "chunk-2", "name": "Cotton", "text": "Sow in June"},
                {"name": "orphan", "text": "no id"}
            ]}"#,
        )
        .unwrap();

        let hits: Vec<_> = hits.hits.into_iter().filter_map(MarqoHit::into_hit).collect();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document_id, "doc-7");
        assert_eq!(hits[0].score, 0.82);
        assert_eq!(hits[1].document_id, "chunk-2");
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn test_search_url_trims_trailing_slash() {
        let search = MarqoSearch::new("http://localhost:8882/", "sunbird-va-index");
        assert_eq!(
            search.search_url(),
            "http://localhost:8882/indexes/sunbird-va-index/search"
        );
    }
}
