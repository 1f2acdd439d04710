use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::models::DrawFailure;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Email already registered!")]
    DuplicateEmail,

    #[error("Could not assign a free lucky number, please try again")]
    NumberExhaustion,

    #[error("Please wait a moment before repeating this action")]
    Debounced,

    #[error("Unable to draw: {0}")]
    DrawUnavailable(DrawFailure),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail | AppError::DrawUnavailable(_) => StatusCode::CONFLICT,
            AppError::NumberExhaustion => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Debounced => StatusCode::TOO_MANY_REQUESTS,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_)
            | AppError::ConnectionError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                ("VALIDATION_ERROR", msg.clone())
            }
            AppError::DuplicateEmail => ("DUPLICATE_EMAIL", self.to_string()),
            AppError::NumberExhaustion => {
                log::warn!("Lucky number space exhausted");
                ("NUMBER_EXHAUSTION", self.to_string())
            }
            AppError::Debounced => ("DEBOUNCED", self.to_string()),
            AppError::DrawUnavailable(reason) => {
                // one code for every draw failure; the tagged reason travels alongside
                return HttpResponse::build(self.status_code()).json(json!({
                    "success": false,
                    "error": {
                        "code": "DRAW_UNAVAILABLE",
                        "message": "Unable to draw!",
                        "reason": reason,
                    }
                }));
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                ("AUTH_ERROR", msg.clone())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                ("DATABASE_ERROR", "Database error".to_string())
            }
            AppError::ConnectionError(err) => {
                log::error!("Connection error: {err}");
                ("DATABASE_ERROR", "Database error".to_string())
            }
            AppError::InternalError(msg) => {
                log::error!("Internal error: {msg}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::DuplicateEmail.error_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Debounced.error_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::ValidationError("bad".into())
                .error_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DrawUnavailable(DrawFailure::DrawLimitReached)
                .error_response()
                .status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_status_code_matches_rendered_response() {
        let errors = [
            AppError::AuthError("Missing admin token".into()),
            AppError::NumberExhaustion,
            AppError::InternalError("boom".into()),
            AppError::DrawUnavailable(DrawFailure::NoActiveSession),
        ];
        for err in errors {
            assert_eq!(err.status_code(), err.error_response().status());
        }
        assert_eq!(
            AppError::AuthError("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(AppError::DuplicateEmail.to_string(), "Email already registered!");
        assert_eq!(
            AppError::DrawUnavailable(DrawFailure::NoEligibleParticipant).to_string(),
            "Unable to draw: no eligible participant left"
        );
    }
}
