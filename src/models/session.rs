use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::entities::session_entity;

/// Winners per session
pub const MAX_DRAWS_PER_SESSION: i32 = 3;

/// Why a draw could not happen. Callers that only care about success see a
/// single failure; the reason is kept for logs and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DrawFailure {
    NoActiveSession,
    DrawLimitReached,
    NoEligibleParticipant,
}

impl fmt::Display for DrawFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawFailure::NoActiveSession => "no active session",
            DrawFailure::DrawLimitReached => "draw limit reached",
            DrawFailure::NoEligibleParticipant => "no eligible participant left",
        };
        f.write_str(text)
    }
}

/// Lifecycle of the draw session:
/// `Inactive -> start -> Active -> draw (<= 3) -> Active -> end -> Inactive`.
///
/// An inactive state still remembers the last session id so its results stay
/// readable after it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Inactive {
        session_id: Option<String>,
        draw_count: i32,
        started_at: Option<DateTime<Utc>>,
        ended_at: Option<DateTime<Utc>>,
    },
    Active {
        session_id: String,
        draw_count: i32,
        started_at: Option<DateTime<Utc>>,
    },
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }

    /// Id of the active session, or of the one that ended last
    pub fn session_id(&self) -> Option<&str> {
        match self {
            SessionState::Active { session_id, .. } => Some(session_id),
            SessionState::Inactive { session_id, .. } => session_id.as_deref(),
        }
    }

    pub fn draw_count(&self) -> i32 {
        match self {
            SessionState::Active { draw_count, .. } | SessionState::Inactive { draw_count, .. } => {
                *draw_count
            }
        }
    }

    /// `None` while a session is already active.
    pub fn start(&self, session_id: String, now: DateTime<Utc>) -> Option<SessionState> {
        if self.is_active() {
            return None;
        }
        Some(SessionState::Active {
            session_id,
            draw_count: 0,
            started_at: Some(now),
        })
    }

    /// Position the next winner would take.
    pub fn next_position(&self) -> Result<i32, DrawFailure> {
        match self {
            SessionState::Inactive { .. } => Err(DrawFailure::NoActiveSession),
            SessionState::Active { draw_count, .. } if *draw_count >= MAX_DRAWS_PER_SESSION => {
                Err(DrawFailure::DrawLimitReached)
            }
            SessionState::Active { draw_count, .. } => Ok(draw_count + 1),
        }
    }

    /// `None` when there is nothing to end.
    pub fn end(&self, now: DateTime<Utc>) -> Option<SessionState> {
        match self {
            SessionState::Active {
                session_id,
                draw_count,
                started_at,
            } => Some(SessionState::Inactive {
                session_id: Some(session_id.clone()),
                draw_count: *draw_count,
                started_at: *started_at,
                ended_at: Some(now),
            }),
            SessionState::Inactive { .. } => None,
        }
    }

    /// Full row image for persisting a lifecycle transition.
    pub fn to_active_model(&self) -> session_entity::ActiveModel {
        let (active, session_id, draw_count, started_at, ended_at) = match self {
            SessionState::Active {
                session_id,
                draw_count,
                started_at,
            } => (true, Some(session_id.clone()), *draw_count, *started_at, None),
            SessionState::Inactive {
                session_id,
                draw_count,
                started_at,
                ended_at,
            } => (false, session_id.clone(), *draw_count, *started_at, *ended_at),
        };
        session_entity::ActiveModel {
            id: Set(session_entity::SESSION_ROW_ID),
            active: Set(active),
            session_id: Set(session_id),
            draw_count: Set(draw_count),
            created_at: Set(started_at),
            ended_at: Set(ended_at),
        }
    }
}

impl From<session_entity::Model> for SessionState {
    fn from(m: session_entity::Model) -> Self {
        match (m.active, m.session_id) {
            (true, Some(session_id)) => SessionState::Active {
                session_id,
                draw_count: m.draw_count,
                started_at: m.created_at,
            },
            // an active flag without an id cannot be drawn from
            (_, session_id) => SessionState::Inactive {
                session_id,
                draw_count: m.draw_count,
                started_at: m.created_at,
                ended_at: m.ended_at,
            },
        }
    }
}

/// Session status as displayed on the admin panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionStatusResponse {
    pub active: bool,
    pub session_id: Option<String>,
    pub draw_count: i32,
    pub max_draws: i32,
}

impl From<&SessionState> for SessionStatusResponse {
    fn from(state: &SessionState) -> Self {
        SessionStatusResponse {
            active: state.is_active(),
            session_id: state.session_id().map(str::to_string),
            draw_count: state.draw_count(),
            max_draws: MAX_DRAWS_PER_SESSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StartSessionResponse {
    pub session_id: String,
    /// `false` when a session was already running; `session_id` is then the running one
    pub started: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SessionStatusQuery {
    /// Bypass the status cache
    #[serde(default)]
    pub fresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inactive() -> SessionState {
        SessionState::Inactive {
            session_id: None,
            draw_count: 0,
            started_at: None,
            ended_at: None,
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let now = Utc::now();
        let state = inactive();
        assert_eq!(state.next_position(), Err(DrawFailure::NoActiveSession));
        assert!(state.end(now).is_none());

        let active = state.start("abc123".into(), now).unwrap();
        assert!(active.is_active());
        assert_eq!(active.draw_count(), 0);
        assert_eq!(active.next_position(), Ok(1));
        assert!(active.start("other".into(), now).is_none());

        let ended = active.end(now).unwrap();
        assert!(!ended.is_active());
        assert_eq!(ended.session_id(), Some("abc123"));
    }

    #[test]
    fn test_draw_ceiling() {
        let state = SessionState::Active {
            session_id: "s".into(),
            draw_count: 2,
            started_at: None,
        };
        assert_eq!(state.next_position(), Ok(3));

        let full = SessionState::Active {
            session_id: "s".into(),
            draw_count: MAX_DRAWS_PER_SESSION,
            started_at: None,
        };
        assert_eq!(full.next_position(), Err(DrawFailure::DrawLimitReached));
    }

    #[test]
    fn test_from_row() {
        let row = session_entity::Model {
            id: session_entity::SESSION_ROW_ID,
            active: true,
            session_id: None,
            draw_count: 0,
            created_at: None,
            ended_at: None,
        };
        // active flag without an id is treated as inactive
        assert!(!SessionState::from(row).is_active());

        let row = session_entity::Model {
            id: session_entity::SESSION_ROW_ID,
            active: true,
            session_id: Some("f00d".into()),
            draw_count: 2,
            created_at: None,
            ended_at: None,
        };
        let state = SessionState::from(row);
        let status = SessionStatusResponse::from(&state);
        assert!(status.active);
        assert_eq!(status.session_id.as_deref(), Some("f00d"));
        assert_eq!(status.draw_count, 2);
        assert_eq!(status.max_draws, 3);
    }
}
