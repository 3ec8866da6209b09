//! Provider capability interfaces
//!
//! Each third-party vendor (search, text generation, speech synthesis) is
//! wrapped by a uniform adapter implementing one of the traits below.
//! Adapters are constructed once at startup from configuration and injected
//! as `Arc<dyn Trait>`; they hold no mutable state and perform no side
//! effects beyond the network call. New vendors are added as new
//! implementations, not new call sites.

mod generate;
mod search;
mod speech;

pub use generate::{ClaudeGenerator, GeminiGenerator};
pub use search::GoogleSearch;
pub use speech::ElevenLabsSpeech;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Target languages for the daily generation run.
pub const TARGET_LANGUAGES: [Language; 2] = [Language::En, Language::Zh];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Zh,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search result; ordering across results is provider-determined
/// (recency-sorted where supported) and must be preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// A generated article before persistence.
#[derive(Debug, Clone)]
pub struct GeneratedArticle {
    pub headline: String,
    pub content: String,
    pub sources: Vec<String>,
}

/// A page extracted from a URL, regardless of which strategy produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub publish_date: Option<String>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for recent material about a query. Fails with
    /// `ConfigurationError` when credentials are absent.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AppError>;
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Whether the orchestrator must run the explicit search stage and pass
    /// its hits as context. Providers with built-in grounding return false.
    fn needs_search(&self) -> bool;

    /// Generate a daily article about a topic in the given language.
    async fn generate_article(
        &self,
        topic: &str,
        language: Language,
        context: Option<&[SearchHit]>,
    ) -> Result<GeneratedArticle, AppError>;

    /// Summarize article content in 150-250 words.
    async fn summarize(&self, content: &str) -> Result<String, AppError>;

    /// AI-based page extraction, used as the extraction chain's last resort.
    async fn extract_page(&self, url: &str) -> Result<ExtractedPage, AppError>;
}

#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize speech for the given text, returning the audio payload.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AppError>;
}

/// De-duplicate cited URIs, preserving first-seen order.
pub fn dedup_sources(sources: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    sources
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_preserves_first_seen_order() {
        let sources = vec![
            "https://a.example/1".to_string(),
            "https://b.example/2".to_string(),
            "https://a.example/1".to_string(),
            "https://c.example/3".to_string(),
        ];
        assert_eq!(
            dedup_sources(sources),
            vec![
                "https://a.example/1".to_string(),
                "https://b.example/2".to_string(),
                "https://c.example/3".to_string(),
            ]
        );
    }

    #[test]
    fn language_round_trip() {
        assert_eq!(Language::En.as_str(), "en");
        assert_eq!(Language::Zh.to_string(), "zh");
        assert_eq!(
            serde_json::to_string(&Language::Zh).unwrap(),
            "\"zh\"".to_string()
        );
    }
}
