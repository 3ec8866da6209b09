//! Sea-ORM entities for the dailybrief schema.
//!
//! Natural keys carry the idempotency guarantees: `topics.name` and
//! `social_interests.name` are unique, `articles` is unique on
//! `(date, topic_id, language)`, `social_articles` on `source_url`.

pub mod article;
pub mod social_article;
pub mod social_interest;
pub mod topic;
