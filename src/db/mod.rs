//! Database layer
//!
//! Provides:
//! - Sea-ORM entity models
//! - `Repository` for all queries
//! - Startup schema creation and default-topic seeding
//! - The store-facing gate traits consumed by the pipeline services

pub mod models;
mod repository;

pub use repository::{ArticleWithTopic, Repository, SocialArticleRow};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::AppError;

/// A generated article ready for insertion (voice path is attached later,
/// on demand, by the speech gate).
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub date: NaiveDate,
    pub topic_id: i32,
    pub language: String,
    pub headline: String,
    pub content: String,
    pub sources: Vec<String>,
}

/// A scraped social article ready for insertion.
#[derive(Debug, Clone)]
pub struct NewSocialArticle {
    pub interest_id: i32,
    pub source_url: String,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub scraped_at: NaiveDate,
}

/// Store-facing contract for the daily generation pipeline and the speech
/// gate. The exists check is an optimization; the unique constraint on
/// `(date, topic_id, language)` is the authoritative idempotency guarantee,
/// and a raced insert surfaces as `AppError::AlreadyExists`.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn get_active_topics(&self) -> Result<Vec<models::topic::Model>, AppError>;

    async fn article_exists(
        &self,
        date: NaiveDate,
        topic_id: i32,
        language: &str,
    ) -> Result<bool, AppError>;

    async fn insert_article(&self, article: NewArticle) -> Result<i32, AppError>;

    async fn article_by_id(&self, id: i32) -> Result<Option<models::article::Model>, AppError>;

    async fn set_article_audio_path(&self, id: i32, path: &str) -> Result<(), AppError>;
}

/// Store-facing contract for the social content pipeline. `source_url`
/// uniqueness guards against re-submitting the same URL.
#[async_trait]
pub trait SocialStore: Send + Sync {
    async fn social_article_exists(&self, source_url: &str) -> Result<bool, AppError>;

    async fn insert_social_article(&self, article: NewSocialArticle) -> Result<i32, AppError>;

    async fn social_article_by_id(
        &self,
        id: i32,
    ) -> Result<Option<models::social_article::Model>, AppError>;

    async fn set_social_summary(&self, id: i32, summary: &str) -> Result<(), AppError>;
}
