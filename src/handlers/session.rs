use crate::models::*;
use crate::services::DrawService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    params(
        ("fresh" = Option<bool>, Query, description = "Skip the status cache")
    ),
    responses(
        (status = 200, description = "Current session status", body = SessionStatusResponse)
    )
)]
/// Session status. Cached for a short while unless `fresh=true`.
pub async fn get_status(
    service: web::Data<DrawService>,
    query: web::Query<SessionStatusQuery>,
) -> Result<HttpResponse> {
    let status = if query.fresh {
        service.session_status_fresh().await
    } else {
        service.session_status().await
    };
    match status {
        Ok(status) => Ok(HttpResponse::Ok().json(ApiResponse::success(status))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/results",
    tag = "session",
    responses(
        (status = 200, description = "Winners of the current (or last ended) session by position", body = [Winner])
    )
)]
pub async fn get_results(service: web::Data<DrawService>) -> Result<HttpResponse> {
    match service.current_winners().await {
        Ok(winners) => Ok(HttpResponse::Ok().json(ApiResponse::success(winners))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn session_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/session", web::get().to(get_status))
        .route("/results", web::get().to(get_results));
}
