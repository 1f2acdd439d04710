use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{draw_record_entity, participant_entity};

/// A drawn participant and the place they took
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Winner {
    /// 1st, 2nd or 3rd
    pub position: i32,
    pub participant_id: i32,
    pub name: String,
    pub lucky_number: i32,
}

impl Winner {
    pub fn new(record: &draw_record_entity::Model, participant: &participant_entity::Model) -> Self {
        Winner {
            position: record.position,
            participant_id: participant.id,
            name: participant.name.clone(),
            lucky_number: record.lucky_number,
        }
    }
}
