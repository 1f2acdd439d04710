use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Registered participant
/// - email is stored trimmed and lowercased
/// - lucky_number is unique and never reassigned
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub lucky_number: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::draw_records::Entity")]
    DrawRecords,
}

impl Related<super::draw_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DrawRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
