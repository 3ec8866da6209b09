//! Social interest entity (same lifecycle as Topic, independent namespace)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "social_interests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text", unique)]
    pub name: String,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::social_article::Entity")]
    SocialArticles,
}

impl Related<super::social_article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SocialArticles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
