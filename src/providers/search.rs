//! Google Custom Search adapter
//!
//! Queries the Custom Search JSON API restricted to the past 7 days and
//! sorted by date, so the most recent coverage comes first. Result order
//! is preserved as returned by the provider.

use async_trait::async_trait;

use super::{SearchHit, SearchProvider};
use crate::config::SearchConfig;
use crate::errors::AppError;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

pub struct GoogleSearch {
    client: reqwest::Client,
    config: SearchConfig,
}

impl GoogleSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AppError> {
        let (api_key, engine_id) = match (&self.config.api_key, &self.config.engine_id) {
            (Some(key), Some(cx)) => (key, cx),
            _ => {
                return Err(AppError::ConfigurationError(
                    "Google Search API credentials not configured".into(),
                ))
            }
        };

        let res = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("key", api_key.as_str()),
                ("cx", engine_id.as_str()),
                ("q", query),
                ("num", "10"),
                ("dateRestrict", "d7"),
                ("sort", "date"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider {
                provider: "google-search",
                status: None,
                message: format!("Request failed: {e}"),
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::Provider {
                provider: "google-search",
                status: Some(status.as_u16()),
                message: format!("Search failed for query: {query}"),
            });
        }

        let body: serde_json::Value = res.json().await.map_err(|e| AppError::Provider {
            provider: "google-search",
            status: None,
            message: format!("Parse error: {e}"),
        })?;

        // No `items` key means zero results, not an error
        let hits: Vec<SearchHit> = body["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| SearchHit {
                        title: item["title"].as_str().unwrap_or_default().to_string(),
                        snippet: item["snippet"].as_str().unwrap_or_default().to_string(),
                        link: item["link"].as_str().unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        tracing::debug!(query, count = hits.len(), "Search completed");
        Ok(hits)
    }
}
