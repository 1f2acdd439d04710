use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::participant_entity;

/// Registration request, raw strings as typed by the user
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    /// Full name
    pub name: String,
    /// Email (trimmed and lowercased before storage)
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub participant_id: i32,
    pub name: String,
    pub email: String,
    /// Lucky number, 1000-9999 with the default range
    pub lucky_number: i32,
}

impl From<participant_entity::Model> for RegisterResponse {
    fn from(m: participant_entity::Model) -> Self {
        RegisterResponse {
            participant_id: m.id,
            name: m.name,
            email: m.email,
            lucky_number: m.lucky_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub lucky_number: i32,
    pub created_at: DateTime<Utc>,
}

impl From<participant_entity::Model> for ParticipantResponse {
    fn from(m: participant_entity::Model) -> Self {
        ParticipantResponse {
            id: m.id,
            name: m.name,
            email: m.email,
            lucky_number: m.lucky_number,
            created_at: m.created_at,
        }
    }
}

/// Participant list with its total, as shown in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantListResponse {
    pub total: usize,
    pub participants: Vec<ParticipantResponse>,
}

impl From<Vec<ParticipantResponse>> for ParticipantListResponse {
    fn from(participants: Vec<ParticipantResponse>) -> Self {
        ParticipantListResponse {
            total: participants.len(),
            participants,
        }
    }
}
