//! Database repository
//!
//! High-level interface over the connection pool: topic and interest CRUD,
//! article persistence with natural-key idempotency, and the listing
//! queries backing the read endpoints. Unique-constraint violations are
//! mapped to `AppError::AlreadyExists` so callers can treat a raced insert
//! as a benign duplicate.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Set, SqlErr, Statement,
};
use serde::Serialize;

use super::models::{article, social_article, social_interest, topic};
use super::{ArticleStore, NewArticle, NewSocialArticle, SocialStore};
use crate::config::DatabaseConfig;
use crate::errors::AppError;

/// Topics seeded on first startup.
const DEFAULT_TOPICS: [&str; 5] = ["Politics", "Macro Economy Data", "AI", "EV", "Stock Market"];

#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
}

/// Article row joined with its topic name, for the read endpoints.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct ArticleWithTopic {
    pub id: i32,
    pub date: NaiveDate,
    pub topic_id: i32,
    pub topic_name: String,
    pub language: String,
    pub headline: String,
    pub content: String,
    pub sources: serde_json::Value,
    pub voice_file_path: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Social article row joined with its interest name.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct SocialArticleRow {
    pub id: i32,
    pub interest_id: i32,
    pub interest_name: String,
    pub source_url: String,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub scraped_at: NaiveDate,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(FromQueryResult)]
struct DateRow {
    date: NaiveDate,
}

fn map_conflict(err: DbErr, what: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::AlreadyExists(what.to_string()),
        _ => AppError::DatabaseQueryError(err),
    }
}

impl Repository {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut opt = sea_orm::ConnectOptions::new(&config.url);
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout))
            .sqlx_logging(cfg!(debug_assertions));

        let db = sea_orm::Database::connect(opt).await?;

        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database connection pool initialized"
        );

        Ok(Self { db })
    }

    /// Ping the database to verify connectivity. Used by the health check.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnectionError(e.to_string()))?;
        Ok(())
    }

    /// Create tables and seed default topics. Idempotent; the unique
    /// constraints created here are what the pipeline's idempotency
    /// guarantees rest on.
    pub async fn init_schema(&self) -> Result<(), AppError> {
        self.db
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS topics (
                    id SERIAL PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    is_active BOOLEAN NOT NULL DEFAULT true,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
                );
                CREATE TABLE IF NOT EXISTS articles (
                    id SERIAL PRIMARY KEY,
                    date DATE NOT NULL,
                    topic_id INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
                    language TEXT NOT NULL DEFAULT 'en',
                    headline TEXT NOT NULL,
                    content TEXT NOT NULL,
                    sources JSONB NOT NULL DEFAULT '[]',
                    voice_file_path TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    UNIQUE(date, topic_id, language)
                );
                CREATE TABLE IF NOT EXISTS social_interests (
                    id SERIAL PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    is_active BOOLEAN NOT NULL DEFAULT true,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
                );
                CREATE TABLE IF NOT EXISTS social_articles (
                    id SERIAL PRIMARY KEY,
                    interest_id INTEGER NOT NULL REFERENCES social_interests(id) ON DELETE CASCADE,
                    source_url TEXT NOT NULL UNIQUE,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL,
                    summary TEXT,
                    author TEXT,
                    publish_date DATE,
                    scraped_at DATE NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
                );
                CREATE INDEX IF NOT EXISTS idx_social_articles_scraped_at
                    ON social_articles(scraped_at);
                CREATE INDEX IF NOT EXISTS idx_social_articles_interest_id
                    ON social_articles(interest_id);
                "#,
            )
            .await?;

        for name in DEFAULT_TOPICS {
            self.db
                .execute(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    "INSERT INTO topics (name, is_active) VALUES ($1, true) ON CONFLICT (name) DO NOTHING",
                    [name.into()],
                ))
                .await?;
        }

        tracing::info!("Database schema initialized");
        Ok(())
    }

    // ---- Topics -----------------------------------------------------------

    pub async fn get_all_topics(&self) -> Result<Vec<topic::Model>, AppError> {
        Ok(topic::Entity::find()
            .order_by_asc(topic::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn add_topic(&self, name: &str) -> Result<topic::Model, AppError> {
        let model = topic::ActiveModel {
            name: Set(name.to_string()),
            is_active: Set(true),
            ..Default::default()
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| map_conflict(e, "topic"))
    }

    pub async fn update_topic(
        &self,
        id: i32,
        name: &str,
        is_active: bool,
    ) -> Result<topic::Model, AppError> {
        let model = topic::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            is_active: Set(is_active),
            ..Default::default()
        };
        model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NotFound {
                resource_type: "topic".into(),
                resource_id: id.to_string(),
            },
            other => map_conflict(other, "topic"),
        })
    }

    pub async fn delete_topic(&self, id: i32) -> Result<u64, AppError> {
        let res = topic::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected)
    }

    // ---- Articles ---------------------------------------------------------

    pub async fn article_dates(&self) -> Result<Vec<NaiveDate>, AppError> {
        let rows = DateRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT DISTINCT date FROM articles ORDER BY date DESC",
        ))
        .all(&self.db)
        .await?;
        Ok(rows.into_iter().map(|r| r.date).collect())
    }

    pub async fn articles_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ArticleWithTopic>, AppError> {
        let rows = ArticleWithTopic::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT a.id, a.date, a.topic_id, t.name AS topic_name, a.language,
                   a.headline, a.content, a.sources, a.voice_file_path, a.created_at
            FROM articles a
            JOIN topics t ON a.topic_id = t.id
            WHERE a.date = $1
            ORDER BY a.created_at ASC
            "#,
            [date.into()],
        ))
        .all(&self.db)
        .await?;
        Ok(rows)
    }

    pub async fn article_with_topic(&self, id: i32) -> Result<Option<ArticleWithTopic>, AppError> {
        let row = ArticleWithTopic::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT a.id, a.date, a.topic_id, t.name AS topic_name, a.language,
                   a.headline, a.content, a.sources, a.voice_file_path, a.created_at
            FROM articles a
            JOIN topics t ON a.topic_id = t.id
            WHERE a.id = $1
            "#,
            [id.into()],
        ))
        .one(&self.db)
        .await?;
        Ok(row)
    }

    // ---- Social interests -------------------------------------------------

    pub async fn get_all_social_interests(
        &self,
    ) -> Result<Vec<social_interest::Model>, AppError> {
        Ok(social_interest::Entity::find()
            .order_by_asc(social_interest::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn add_social_interest(&self, name: &str) -> Result<social_interest::Model, AppError> {
        let model = social_interest::ActiveModel {
            name: Set(name.to_string()),
            is_active: Set(true),
            ..Default::default()
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| map_conflict(e, "social interest"))
    }

    pub async fn update_social_interest(
        &self,
        id: i32,
        name: &str,
        is_active: bool,
    ) -> Result<social_interest::Model, AppError> {
        let model = social_interest::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            is_active: Set(is_active),
            ..Default::default()
        };
        model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NotFound {
                resource_type: "social interest".into(),
                resource_id: id.to_string(),
            },
            other => map_conflict(other, "social interest"),
        })
    }

    pub async fn delete_social_interest(&self, id: i32) -> Result<u64, AppError> {
        let res = social_interest::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }

    // ---- Social articles --------------------------------------------------

    pub async fn social_article_dates(&self) -> Result<Vec<NaiveDate>, AppError> {
        let rows = DateRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT DISTINCT scraped_at AS date FROM social_articles ORDER BY date DESC",
        ))
        .all(&self.db)
        .await?;
        Ok(rows.into_iter().map(|r| r.date).collect())
    }

    pub async fn social_articles_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<SocialArticleRow>, AppError> {
        let rows = SocialArticleRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT s.id, s.interest_id, i.name AS interest_name, s.source_url,
                   s.title, s.content, s.summary, s.author, s.publish_date,
                   s.scraped_at, s.created_at
            FROM social_articles s
            JOIN social_interests i ON s.interest_id = i.id
            WHERE s.scraped_at = $1
            ORDER BY s.created_at ASC
            "#,
            [date.into()],
        ))
        .all(&self.db)
        .await?;
        Ok(rows)
    }

    pub async fn delete_social_article(&self, id: i32) -> Result<u64, AppError> {
        let res = social_article::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}

#[async_trait]
impl ArticleStore for Repository {
    async fn get_active_topics(&self) -> Result<Vec<topic::Model>, AppError> {
        Ok(topic::Entity::find()
            .filter(topic::Column::IsActive.eq(true))
            .order_by_asc(topic::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn article_exists(
        &self,
        date: NaiveDate,
        topic_id: i32,
        language: &str,
    ) -> Result<bool, AppError> {
        let found = article::Entity::find()
            .filter(article::Column::Date.eq(date))
            .filter(article::Column::TopicId.eq(topic_id))
            .filter(article::Column::Language.eq(language))
            .one(&self.db)
            .await?;
        Ok(found.is_some())
    }

    async fn insert_article(&self, new: NewArticle) -> Result<i32, AppError> {
        let model = article::ActiveModel {
            date: Set(new.date),
            topic_id: Set(new.topic_id),
            language: Set(new.language),
            headline: Set(new.headline),
            content: Set(new.content),
            sources: Set(serde_json::json!(new.sources)),
            voice_file_path: Set(None),
            ..Default::default()
        };
        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| map_conflict(e, "article"))?;
        Ok(inserted.id)
    }

    async fn article_by_id(&self, id: i32) -> Result<Option<article::Model>, AppError> {
        Ok(article::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn set_article_audio_path(&self, id: i32, path: &str) -> Result<(), AppError> {
        let model = article::ActiveModel {
            id: Set(id),
            voice_file_path: Set(Some(path.to_string())),
            ..Default::default()
        };
        model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NotFound {
                resource_type: "article".into(),
                resource_id: id.to_string(),
            },
            other => AppError::DatabaseQueryError(other),
        })?;
        Ok(())
    }
}

#[async_trait]
impl SocialStore for Repository {
    async fn social_article_exists(&self, source_url: &str) -> Result<bool, AppError> {
        let found = social_article::Entity::find()
            .filter(social_article::Column::SourceUrl.eq(source_url))
            .one(&self.db)
            .await?;
        Ok(found.is_some())
    }

    async fn insert_social_article(&self, new: NewSocialArticle) -> Result<i32, AppError> {
        let model = social_article::ActiveModel {
            interest_id: Set(new.interest_id),
            source_url: Set(new.source_url),
            title: Set(new.title),
            content: Set(new.content),
            summary: Set(None),
            author: Set(new.author),
            publish_date: Set(new.publish_date),
            scraped_at: Set(new.scraped_at),
            ..Default::default()
        };
        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| map_conflict(e, "social article"))?;
        Ok(inserted.id)
    }

    async fn social_article_by_id(
        &self,
        id: i32,
    ) -> Result<Option<social_article::Model>, AppError> {
        Ok(social_article::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn set_social_summary(&self, id: i32, summary: &str) -> Result<(), AppError> {
        let model = social_article::ActiveModel {
            id: Set(id),
            summary: Set(Some(summary.to_string())),
            ..Default::default()
        };
        model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NotFound {
                resource_type: "social article".into(),
                resource_id: id.to_string(),
            },
            other => AppError::DatabaseQueryError(other),
        })?;
        Ok(())
    }
}
