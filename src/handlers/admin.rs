use crate::display::DisplayBoard;
use crate::middlewares::AdminGuard;
use crate::models::*;
use crate::services::DrawService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/admin/session/start",
    tag = "admin",
    security(
        ("admin_token" = [])
    ),
    responses(
        (status = 200, description = "Session started, or the running one returned with started=false", body = StartSessionResponse),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 429, description = "Repeated too quickly")
    )
)]
pub async fn start_session(
    service: web::Data<DrawService>,
    board: web::Data<DisplayBoard>,
) -> Result<HttpResponse> {
    match service.start_session().await {
        Ok(started) => {
            if started.started {
                board.clear();
            }
            let message = if started.started {
                "New session started"
            } else {
                "A session is already active"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(started, message)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/session/draw",
    tag = "admin",
    security(
        ("admin_token" = [])
    ),
    responses(
        (status = 200, description = "Winner drawn", body = Winner),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 409, description = "No active session, three draws done, or nobody left to draw"),
        (status = 429, description = "Repeated too quickly")
    )
)]
/// Draw the next winner:
/// 1. requires an active session with fewer than three draws
/// 2. picks uniformly among participants not yet drawn in this session
/// 3. records the position and bumps the draw count in one transaction
pub async fn draw(
    service: web::Data<DrawService>,
    board: web::Data<DisplayBoard>,
) -> Result<HttpResponse> {
    match service.draw().await {
        Ok(winner) => {
            board.show_winner(winner.clone());
            Ok(HttpResponse::Ok().json(ApiResponse::success(winner)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/session/end",
    tag = "admin",
    security(
        ("admin_token" = [])
    ),
    responses(
        (status = 200, description = "Session ended, winners by position (empty when nothing was active)", body = [Winner]),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 429, description = "Repeated too quickly")
    )
)]
pub async fn end_session(
    service: web::Data<DrawService>,
    board: web::Data<DisplayBoard>,
) -> Result<HttpResponse> {
    match service.end_session().await {
        Ok(winners) => {
            board.show_podium(winners.clone());
            Ok(HttpResponse::Ok().json(ApiResponse::success(winners)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/display/continue",
    tag = "admin",
    security(
        ("admin_token" = [])
    ),
    responses(
        (status = 204, description = "Winner announcement hidden")
    )
)]
pub async fn continue_drawing(board: web::Data<DisplayBoard>) -> Result<HttpResponse> {
    board.dismiss_winner();
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/admin/display",
    tag = "admin",
    security(
        ("admin_token" = [])
    ),
    responses(
        (status = 204, description = "Presentation finished, display cleared")
    )
)]
pub async fn finish_presentation(board: web::Data<DisplayBoard>) -> Result<HttpResponse> {
    board.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// Admin scope, gated by `token`. The guard sits on the scope rather than
/// the app, so it only ever sees requests the router already sent here.
pub fn admin_config(token: String) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/admin")
                .wrap(AdminGuard::new(token))
                .route("/session/start", web::post().to(start_session))
                .route("/session/draw", web::post().to(draw))
                .route("/session/end", web::post().to(end_session))
                .route("/display/continue", web::post().to(continue_drawing))
                .route("/display", web::delete().to(finish_presentation)),
        );
    }
}
