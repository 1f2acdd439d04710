use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Id of the only row in the `session` table
pub const SESSION_ROW_ID: i32 = 1;

/// Draw session state, a single row mutated in place
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub active: bool,
    pub session_id: Option<String>,
    pub draw_count: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
