//! Social article entity
//!
//! `source_url` uniqueness is the idempotency guard against re-submitting
//! the same URL. `summary` is populated lazily, at most once.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "social_articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub interest_id: i32,

    #[sea_orm(column_type = "Text", unique)]
    pub source_url: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub author: Option<String>,

    #[sea_orm(nullable)]
    pub publish_date: Option<Date>,

    pub scraped_at: Date,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::social_interest::Entity",
        from = "Column::InterestId",
        to = "super::social_interest::Column::Id",
        on_delete = "Cascade"
    )]
    Interest,
}

impl Related<super::social_interest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Interest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
