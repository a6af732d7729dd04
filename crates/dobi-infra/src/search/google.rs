//! Google Programmable Search (Custom Search JSON API).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use dobi_core::search::WebSearch;
use dobi_types::error::SearchError;

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Returned in place of snippets when the query has no results.
pub const NO_RESULT_TEXT: &str = "No good Google Search Result was found";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    snippet: Option<String>,
}

/// Does NOT derive Debug: holds the API key.
pub struct GoogleSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    cse_id: SecretString,
    num_results: u8,
}

impl GoogleSearch {
    /// `num_results` is clamped to the API's 1..=10 range.
    pub fn new(api_key: SecretString, cse_id: SecretString, num_results: u8) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SearchError::Request(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: ENDPOINT.to_string(),
            api_key,
            cse_id,
            num_results: num_results.clamp(1, 10),
        })
    }
}

/// Snippets joined by a single space, or [`NO_RESULT_TEXT`] when empty.
fn join_snippets(response: SearchResponse) -> String {
    let snippets: Vec<String> = response
        .items
        .into_iter()
        .filter_map(|item| item.snippet)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if snippets.is_empty() {
        NO_RESULT_TEXT.to_string()
    } else {
        snippets.join(" ")
    }
}

impl WebSearch for GoogleSearch {
    fn name(&self) -> &str {
        "google"
    }

    #[tracing::instrument(skip(self), fields(provider = "google"))]
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        let num = self.num_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.expose_secret()),
                ("cx", self.cse_id.expose_secret()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Deserialization(e.without_url().to_string()))?;

        tracing::debug!(results = parsed.items.len(), "search completed");
        Ok(join_snippets(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippets_joined_with_space() {
        let raw = r#"{"items":[{"title":"a","snippet":"카카오싱크는 "},{"title":"b"},{"snippet":"간편가입 서비스입니다."}]}"#;
        let response: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(join_snippets(response), "카카오싱크는 간편가입 서비스입니다.");
    }

    #[test]
    fn test_no_items_gives_fixed_text() {
        let response: SearchResponse = serde_json::from_str(r#"{"kind":"customsearch#search"}"#).unwrap();
        assert_eq!(join_snippets(response), NO_RESULT_TEXT);
    }

    #[test]
    fn test_num_results_clamped() {
        let key = || SecretString::from("k".to_string());
        assert_eq!(GoogleSearch::new(key(), key(), 0).unwrap().num_results, 1);
        assert_eq!(GoogleSearch::new(key(), key(), 50).unwrap().num_results, 10);
    }
}
