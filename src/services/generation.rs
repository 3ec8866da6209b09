//! Daily generation orchestrator
//!
//! Walks the cross product of active topics and target languages and
//! produces at most one article per (date, topic, language). Each pair is
//! independent: a provider failure or timeout on one pair is recorded and
//! the run moves on. Idempotency rests on the database's unique triple;
//! the exists check up front only avoids needless provider spend.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::models::topic;
use crate::db::{ArticleStore, NewArticle};
use crate::errors::AppError;
use crate::providers::{
    dedup_sources, GenerationProvider, Language, SearchProvider, TARGET_LANGUAGES,
};

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub date: NaiveDate,
    pub topics: usize,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<PairOutcome>,
}

#[derive(Debug, Serialize)]
pub struct PairOutcome {
    pub topic: String,
    pub language: Language,
    #[serde(flatten)]
    pub status: PairStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairStatus {
    Generated { article_id: i32 },
    Skipped { reason: String },
    Failed { error: String },
}

pub struct GenerationService {
    store: Arc<dyn ArticleStore>,
    search: Arc<dyn SearchProvider>,
    generator: Arc<dyn GenerationProvider>,
    pair_timeout: Duration,
}

impl GenerationService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        search: Arc<dyn SearchProvider>,
        generator: Arc<dyn GenerationProvider>,
        pair_timeout: Duration,
    ) -> Self {
        Self {
            store,
            search,
            generator,
            pair_timeout,
        }
    }

    /// Run the daily generation for a date across all active topics and
    /// every target language. Fails outright only when no topics are
    /// active; per-pair problems land in the report instead.
    pub async fn run(&self, date: NaiveDate) -> Result<RunReport, AppError> {
        let topics = self.store.get_active_topics().await?;
        if topics.is_empty() {
            return Err(AppError::ValidationError(
                "no active topics to generate for".into(),
            ));
        }

        tracing::info!(%date, topics = topics.len(), "Starting daily generation run");
        let started = std::time::Instant::now();

        let mut outcomes = Vec::with_capacity(topics.len() * TARGET_LANGUAGES.len());
        for topic in &topics {
            for language in TARGET_LANGUAGES {
                let status = match self.generate_pair(date, topic, language).await {
                    Ok(status) => status,
                    Err(AppError::AlreadyExists(_)) => PairStatus::Skipped {
                        reason: "article already exists".into(),
                    },
                    Err(e) => {
                        tracing::error!(
                            topic = %topic.name,
                            language = %language,
                            error = %e,
                            "Generation pair failed"
                        );
                        PairStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                outcomes.push(PairOutcome {
                    topic: topic.name.clone(),
                    language,
                    status,
                });
            }
        }

        let generated = outcomes
            .iter()
            .filter(|o| matches!(o.status, PairStatus::Generated { .. }))
            .count();
        let skipped = outcomes
            .iter()
            .filter(|o| matches!(o.status, PairStatus::Skipped { .. }))
            .count();
        let failed = outcomes.len() - generated - skipped;

        metrics::counter!("dailybrief_articles_generated_total").increment(generated as u64);
        metrics::counter!("dailybrief_generation_pairs_skipped_total").increment(skipped as u64);
        metrics::counter!("dailybrief_generation_pairs_failed_total").increment(failed as u64);
        metrics::histogram!("dailybrief_generation_run_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        tracing::info!(%date, generated, skipped, failed, "Daily generation run finished");

        Ok(RunReport {
            date,
            topics: topics.len(),
            generated,
            skipped,
            failed,
            outcomes,
        })
    }

    async fn generate_pair(
        &self,
        date: NaiveDate,
        topic: &topic::Model,
        language: Language,
    ) -> Result<PairStatus, AppError> {
        if self
            .store
            .article_exists(date, topic.id, language.as_str())
            .await?
        {
            return Ok(PairStatus::Skipped {
                reason: "article already exists".into(),
            });
        }

        let work = self.search_and_generate(topic, language);
        let article = match tokio::time::timeout(self.pair_timeout, work).await {
            Ok(result) => match result? {
                Some(article) => article,
                None => {
                    return Ok(PairStatus::Skipped {
                        reason: "no recent search results".into(),
                    })
                }
            },
            Err(_) => {
                return Err(AppError::Timeout {
                    stage: "article generation",
                    secs: self.pair_timeout.as_secs(),
                })
            }
        };

        let article_id = self
            .store
            .insert_article(NewArticle {
                date,
                topic_id: topic.id,
                language: language.as_str().to_string(),
                headline: article.headline,
                content: article.content,
                sources: dedup_sources(article.sources),
            })
            .await?;

        Ok(PairStatus::Generated { article_id })
    }

    /// Provider work for one pair. `None` means the explicit search stage
    /// found nothing recent, so the pair is skipped without generating.
    async fn search_and_generate(
        &self,
        topic: &topic::Model,
        language: Language,
    ) -> Result<Option<crate::providers::GeneratedArticle>, AppError> {
        let context = if self.generator.needs_search() {
            let hits = self.search.search(&topic.name).await?;
            if hits.is_empty() {
                return Ok(None);
            }
            Some(hits)
        } else {
            None
        };

        let article = self
            .generator
            .generate_article(&topic.name, language, context.as_deref())
            .await?;
        Ok(Some(article))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models;
    use crate::providers::{ExtractedPage, GeneratedArticle, SearchHit};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn topic(id: i32, name: &str) -> models::topic::Model {
        models::topic::Model {
            id,
            name: name.to_string(),
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().into(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[derive(Default)]
    struct MemoryStore {
        topics: Vec<models::topic::Model>,
        existing: HashSet<(i32, String)>,
        raced: HashSet<(i32, String)>,
        inserted: Mutex<Vec<NewArticle>>,
    }

    #[async_trait]
    impl ArticleStore for MemoryStore {
        async fn get_active_topics(&self) -> Result<Vec<models::topic::Model>, AppError> {
            Ok(self.topics.clone())
        }

        async fn article_exists(
            &self,
            _date: NaiveDate,
            topic_id: i32,
            language: &str,
        ) -> Result<bool, AppError> {
            Ok(self.existing.contains(&(topic_id, language.to_string())))
        }

        async fn insert_article(&self, article: NewArticle) -> Result<i32, AppError> {
            let key = (article.topic_id, article.language.clone());
            if self.raced.contains(&key) {
                return Err(AppError::AlreadyExists("article".into()));
            }
            let mut inserted = self.inserted.lock().unwrap();
            inserted.push(article);
            Ok(inserted.len() as i32)
        }

        async fn article_by_id(
            &self,
            _id: i32,
        ) -> Result<Option<models::article::Model>, AppError> {
            Ok(None)
        }

        async fn set_article_audio_path(&self, _id: i32, _path: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    struct FakeSearch {
        hits_per_query: usize,
        empty_for: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchProvider for FakeSearch {
        async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.empty_for == Some(query) {
                return Ok(Vec::new());
            }
            Ok((0..self.hits_per_query)
                .map(|i| SearchHit {
                    title: format!("{query} hit {i}"),
                    snippet: "snippet".into(),
                    link: format!("https://news.example/{i}"),
                })
                .collect())
        }
    }

    struct FakeGenerator {
        needs_search: bool,
        fail_for: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeGenerator {
        fn new(needs_search: bool) -> Self {
            Self {
                needs_search,
                fail_for: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationProvider for FakeGenerator {
        fn needs_search(&self) -> bool {
            self.needs_search
        }

        async fn generate_article(
            &self,
            topic: &str,
            language: Language,
            context: Option<&[SearchHit]>,
        ) -> Result<GeneratedArticle, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for == Some(topic) {
                return Err(AppError::Provider {
                    provider: "fake",
                    status: Some(500),
                    message: "generation blew up".into(),
                });
            }
            Ok(GeneratedArticle {
                headline: format!("{topic} headline"),
                content: format!("{topic} body in {language}"),
                sources: context
                    .map(|hits| hits.iter().map(|h| h.link.clone()).collect())
                    .unwrap_or_default(),
            })
        }

        async fn summarize(&self, _content: &str) -> Result<String, AppError> {
            Ok("summary".into())
        }

        async fn extract_page(&self, _url: &str) -> Result<ExtractedPage, AppError> {
            unimplemented!("not used in these tests")
        }
    }

    fn service(
        store: Arc<MemoryStore>,
        search: Arc<FakeSearch>,
        generator: Arc<FakeGenerator>,
    ) -> GenerationService {
        GenerationService::new(store, search, generator, Duration::from_secs(120))
    }

    #[tokio::test]
    async fn zero_active_topics_is_a_validation_error() {
        let store = Arc::new(MemoryStore::default());
        let search = Arc::new(FakeSearch {
            hits_per_query: 3,
            empty_for: None,
            calls: AtomicUsize::new(0),
        });
        let generator = Arc::new(FakeGenerator::new(false));
        let svc = service(store, search, generator);

        let err = svc.run(date()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn generates_one_article_per_topic_and_language() {
        let store = Arc::new(MemoryStore {
            topics: vec![topic(1, "AI"), topic(2, "EV")],
            ..Default::default()
        });
        let search = Arc::new(FakeSearch {
            hits_per_query: 3,
            empty_for: None,
            calls: AtomicUsize::new(0),
        });
        let generator = Arc::new(FakeGenerator::new(false));
        let svc = service(store.clone(), search, generator);

        let report = svc.run(date()).await.unwrap();
        assert_eq!(report.generated, 4);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed, 0);

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 4);
        let languages: HashSet<&str> = inserted.iter().map(|a| a.language.as_str()).collect();
        assert_eq!(languages, HashSet::from(["en", "zh"]));
    }

    #[tokio::test]
    async fn existing_pairs_are_skipped_without_calling_the_provider() {
        let store = Arc::new(MemoryStore {
            topics: vec![topic(1, "AI")],
            existing: HashSet::from([(1, "en".to_string()), (1, "zh".to_string())]),
            ..Default::default()
        });
        let search = Arc::new(FakeSearch {
            hits_per_query: 3,
            empty_for: None,
            calls: AtomicUsize::new(0),
        });
        let generator = Arc::new(FakeGenerator::new(false));
        let svc = service(store.clone(), search, generator.clone());

        let report = svc.run(date()).await.unwrap();
        assert_eq!(report.skipped, 2);
        assert_eq!(report.generated, 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_failing_pair_does_not_abort_the_run() {
        let store = Arc::new(MemoryStore {
            topics: vec![topic(1, "AI"), topic(2, "EV")],
            ..Default::default()
        });
        let search = Arc::new(FakeSearch {
            hits_per_query: 3,
            empty_for: None,
            calls: AtomicUsize::new(0),
        });
        let generator = Arc::new(FakeGenerator {
            needs_search: false,
            fail_for: Some("AI"),
            calls: AtomicUsize::new(0),
        });
        let svc = service(store.clone(), search, generator);

        let report = svc.run(date()).await.unwrap();
        assert_eq!(report.failed, 2);
        assert_eq!(report.generated, 2);
        let inserted = store.inserted.lock().unwrap();
        assert!(inserted.iter().all(|a| a.topic_id == 2));
    }

    #[tokio::test]
    async fn empty_search_results_skip_the_pair_for_search_backed_providers() {
        let store = Arc::new(MemoryStore {
            topics: vec![topic(1, "Politics"), topic(2, "EV")],
            ..Default::default()
        });
        let search = Arc::new(FakeSearch {
            hits_per_query: 2,
            empty_for: Some("Politics"),
            calls: AtomicUsize::new(0),
        });
        let generator = Arc::new(FakeGenerator::new(true));
        let svc = service(store.clone(), search, generator.clone());

        let report = svc.run(date()).await.unwrap();
        assert_eq!(report.skipped, 2);
        assert_eq!(report.generated, 2);
        // Generator was only invoked for the topic with results
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);

        let inserted = store.inserted.lock().unwrap();
        assert!(inserted.iter().all(|a| a.topic_id == 2));
        // Search hits flow through as sources
        assert_eq!(inserted[0].sources.len(), 2);
    }

    #[tokio::test]
    async fn raced_duplicate_insert_counts_as_skipped() {
        let store = Arc::new(MemoryStore {
            topics: vec![topic(1, "AI")],
            raced: HashSet::from([(1, "en".to_string()), (1, "zh".to_string())]),
            ..Default::default()
        });
        let search = Arc::new(FakeSearch {
            hits_per_query: 3,
            empty_for: None,
            calls: AtomicUsize::new(0),
        });
        let generator = Arc::new(FakeGenerator::new(false));
        let svc = service(store, search, generator);

        let report = svc.run(date()).await.unwrap();
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 0);
    }
}
