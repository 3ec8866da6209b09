//! Social content pipeline
//!
//! URL submission runs validation, a duplicate pre-check, the extraction
//! chain and persistence. Summaries follow the same lazy gate pattern as
//! audio: generated on first request, cached in the `summary` column.

use std::sync::Arc;

use serde::Serialize;

use crate::db::{NewSocialArticle, SocialStore};
use crate::errors::AppError;
use crate::extraction::ExtractionChain;
use crate::providers::GenerationProvider;

/// Summarization prompt input cap, in characters.
const SUMMARY_INPUT_CHARS: usize = 5000;

#[derive(Debug, Serialize)]
pub struct SummaryRef {
    pub article_id: i32,
    pub summary: String,
    pub cached: bool,
}

pub struct SocialService {
    store: Arc<dyn SocialStore>,
    chain: Arc<ExtractionChain>,
    generator: Arc<dyn GenerationProvider>,
}

impl SocialService {
    pub fn new(
        store: Arc<dyn SocialStore>,
        chain: Arc<ExtractionChain>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            store,
            chain,
            generator,
        }
    }

    /// Submit a URL for an interest: extract the page and persist it.
    /// The pre-check keeps the common duplicate path cheap; the unique
    /// `source_url` constraint catches the raced case.
    pub async fn submit(&self, interest_id: i32, url: &str) -> Result<i32, AppError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::MissingField("url".into()));
        }
        if self.store.social_article_exists(url).await? {
            return Err(AppError::AlreadyExists(format!("article for {url}")));
        }

        let page = self.chain.extract(url).await?;

        let publish_date = page
            .publish_date
            .as_deref()
            .and_then(|d| d.parse::<chrono::NaiveDate>().ok());

        let id = self
            .store
            .insert_social_article(NewSocialArticle {
                interest_id,
                source_url: url.to_string(),
                title: page.title,
                content: page.content,
                author: page.author,
                publish_date,
                scraped_at: chrono::Utc::now().date_naive(),
            })
            .await?;

        metrics::counter!("dailybrief_social_articles_total").increment(1);
        tracing::info!(article_id = id, url, "Social article stored");
        Ok(id)
    }

    /// Return the summary for a social article, generating on first
    /// request. Same unlocked gate as audio: a raced double generation
    /// costs one extra provider call, nothing more.
    pub async fn summary_for(&self, id: i32) -> Result<SummaryRef, AppError> {
        let article = self
            .store
            .social_article_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource_type: "social article".into(),
                resource_id: id.to_string(),
            })?;

        if let Some(summary) = article.summary {
            return Ok(SummaryRef {
                article_id: id,
                summary,
                cached: true,
            });
        }

        let input = truncate_chars(&article.content, SUMMARY_INPUT_CHARS);
        let summary = self.generator.summarize(input).await?;
        self.store.set_social_summary(id, &summary).await?;

        metrics::counter!("dailybrief_summaries_total").increment(1);
        tracing::info!(article_id = id, "Summary generated");
        Ok(SummaryRef {
            article_id: id,
            summary,
            cached: false,
        })
    }
}

/// Truncate to at most `max` characters, never splitting a code point.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models;
    use crate::extraction::ExtractionStrategy;
    use crate::providers::{ExtractedPage, GeneratedArticle, Language, SearchHit};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySocialStore {
        existing_url: Option<String>,
        article: Mutex<Option<models::social_article::Model>>,
        inserted: Mutex<Vec<NewSocialArticle>>,
        saved_summary: Mutex<Option<String>>,
    }

    #[async_trait]
    impl SocialStore for MemorySocialStore {
        async fn social_article_exists(&self, source_url: &str) -> Result<bool, AppError> {
            Ok(self.existing_url.as_deref() == Some(source_url))
        }

        async fn insert_social_article(
            &self,
            article: NewSocialArticle,
        ) -> Result<i32, AppError> {
            let mut inserted = self.inserted.lock().unwrap();
            inserted.push(article);
            Ok(inserted.len() as i32)
        }

        async fn social_article_by_id(
            &self,
            _id: i32,
        ) -> Result<Option<models::social_article::Model>, AppError> {
            Ok(self.article.lock().unwrap().clone())
        }

        async fn set_social_summary(&self, _id: i32, summary: &str) -> Result<(), AppError> {
            *self.saved_summary.lock().unwrap() = Some(summary.to_string());
            Ok(())
        }
    }

    struct FixedStrategy;

    #[async_trait]
    impl ExtractionStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn attempt(&self, _url: &str) -> Result<ExtractedPage, AppError> {
            Ok(ExtractedPage {
                title: "Extracted Title".into(),
                content: "Extracted body with plenty of characters to pass validation.".into(),
                author: Some("Author".into()),
                publish_date: Some("2026-03-10".into()),
            })
        }
    }

    struct CountingSummarizer {
        calls: AtomicUsize,
        seen_input_chars: AtomicUsize,
    }

    #[async_trait]
    impl GenerationProvider for CountingSummarizer {
        fn needs_search(&self) -> bool {
            false
        }

        async fn generate_article(
            &self,
            _topic: &str,
            _language: Language,
            _context: Option<&[SearchHit]>,
        ) -> Result<GeneratedArticle, AppError> {
            unimplemented!("not used in these tests")
        }

        async fn summarize(&self, content: &str) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_input_chars
                .store(content.chars().count(), Ordering::SeqCst);
            Ok("A concise summary.".into())
        }

        async fn extract_page(&self, _url: &str) -> Result<ExtractedPage, AppError> {
            unimplemented!("not used in these tests")
        }
    }

    fn social_article(
        id: i32,
        content: &str,
        summary: Option<&str>,
    ) -> models::social_article::Model {
        models::social_article::Model {
            id,
            interest_id: 1,
            source_url: "https://example.com/post".into(),
            title: "Title".into(),
            content: content.to_string(),
            summary: summary.map(String::from),
            author: None,
            publish_date: None,
            scraped_at: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap().into(),
        }
    }

    fn service(
        store: Arc<MemorySocialStore>,
        generator: Arc<CountingSummarizer>,
    ) -> SocialService {
        let chain = Arc::new(ExtractionChain::new(vec![Arc::new(FixedStrategy)]));
        SocialService::new(store, chain, generator)
    }

    fn summarizer() -> Arc<CountingSummarizer> {
        Arc::new(CountingSummarizer {
            calls: AtomicUsize::new(0),
            seen_input_chars: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn submit_extracts_and_persists() {
        let store = Arc::new(MemorySocialStore::default());
        let svc = service(store.clone(), summarizer());

        let id = svc.submit(3, "https://example.com/post").await.unwrap();
        assert_eq!(id, 1);

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted[0].interest_id, 3);
        assert_eq!(inserted[0].title, "Extracted Title");
        assert_eq!(
            inserted[0].publish_date,
            NaiveDate::from_ymd_opt(2026, 3, 10)
        );
    }

    #[tokio::test]
    async fn duplicate_url_is_a_conflict() {
        let store = Arc::new(MemorySocialStore {
            existing_url: Some("https://example.com/post".into()),
            ..Default::default()
        });
        let svc = service(store.clone(), summarizer());

        let err = svc.submit(3, "https://example.com/post").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_url_is_rejected() {
        let store = Arc::new(MemorySocialStore::default());
        let svc = service(store, summarizer());

        let err = svc.submit(3, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::MissingField(_)));
    }

    #[tokio::test]
    async fn summary_is_generated_once_then_cached() {
        let store = Arc::new(MemorySocialStore {
            article: Mutex::new(Some(social_article(5, "Body text.", None))),
            ..Default::default()
        });
        let generator = summarizer();
        let svc = service(store.clone(), generator.clone());

        let first = svc.summary_for(5).await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.summary, "A concise summary.");
        assert_eq!(
            store.saved_summary.lock().unwrap().as_deref(),
            Some("A concise summary.")
        );

        // Simulate the persisted summary being visible on the next read
        *store.article.lock().unwrap() =
            Some(social_article(5, "Body text.", Some("A concise summary.")));
        let second = svc.summary_for(5).await.unwrap();
        assert!(second.cached);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn summary_input_is_capped_at_the_char_limit() {
        let long = "字".repeat(6000);
        let store = Arc::new(MemorySocialStore {
            article: Mutex::new(Some(social_article(5, &long, None))),
            ..Default::default()
        });
        let generator = summarizer();
        let svc = service(store, generator.clone());

        svc.summary_for(5).await.unwrap();
        assert_eq!(generator.seen_input_chars.load(Ordering::SeqCst), 5000);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "héllo 世界";
        assert_eq!(truncate_chars(s, 7), "héllo 世");
        assert_eq!(truncate_chars(s, 100), s);
        assert_eq!(truncate_chars("", 5), "");
    }
}
