use crate::display::DisplayBoard;
use crate::models::ApiResponse;
use actix_web::{HttpResponse, Result, web};

#[utoipa::path(
    get,
    path = "/display",
    tag = "display",
    responses(
        (status = 200, description = "What the presentation screen should show", body = crate::display::DisplaySnapshot)
    )
)]
pub async fn get_display(board: web::Data<DisplayBoard>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(board.snapshot())))
}

pub fn display_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/display", web::get().to(get_display));
}
