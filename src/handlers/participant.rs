use crate::display::DisplayBoard;
use crate::models::*;
use crate::services::DrawService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/participants",
    tag = "participants",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered, lucky number assigned", body = RegisterResponse),
        (status = 400, description = "Missing name/email or malformed email"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Same email submitted again too quickly"),
        (status = 503, description = "No free lucky number found")
    )
)]
/// Register a participant. Name and email are trimmed, email lowercased.
pub async fn register(
    service: web::Data<DrawService>,
    board: web::Data<DisplayBoard>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    match service.register(&request.name, &request.email).await {
        Ok(registered) => {
            board.note_registration(registered.clone());
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
                registered,
                "Registered successfully!",
            )))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/participants",
    tag = "participants",
    responses(
        (status = 200, description = "Participants ordered by name", body = ParticipantListResponse)
    )
)]
pub async fn list_participants(service: web::Data<DrawService>) -> Result<HttpResponse> {
    match service.list_participants().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ParticipantListResponse::from(list),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn participant_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/participants")
            .route(web::post().to(register))
            .route(web::get().to(list_participants)),
    );
}
