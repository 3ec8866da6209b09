//! Article entity
//!
//! One generated article per (date, topic, language); the unique index on
//! that triple is the idempotency guard for the daily generation run.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub date: Date,

    pub topic_id: i32,

    #[sea_orm(column_type = "Text")]
    pub language: String,

    #[sea_orm(column_type = "Text")]
    pub headline: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// De-duplicated, order-preserving list of cited source URIs.
    #[sea_orm(column_type = "JsonBinary")]
    pub sources: Json,

    /// Set at most once per synthesis event by the speech gate.
    #[sea_orm(column_type = "Text", nullable)]
    pub voice_file_path: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::topic::Entity",
        from = "Column::TopicId",
        to = "super::topic::Column::Id",
        on_delete = "Cascade"
    )]
    Topic,
}

impl Related<super::topic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Topic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
