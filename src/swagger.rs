use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::display::DisplaySnapshot;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::participant::register,
        handlers::participant::list_participants,
        handlers::session::get_status,
        handlers::session::get_results,
        handlers::display::get_display,
        handlers::admin::start_session,
        handlers::admin::draw,
        handlers::admin::end_session,
        handlers::admin::continue_drawing,
        handlers::admin::finish_presentation,
    ),
    components(
        schemas(
            RegisterRequest,
            RegisterResponse,
            ParticipantResponse,
            ParticipantListResponse,
            SessionStatusResponse,
            StartSessionResponse,
            SessionStatusQuery,
            DrawFailure,
            Winner,
            DisplaySnapshot,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "participants", description = "Registration and participant list"),
        (name = "session", description = "Session status and results"),
        (name = "display", description = "Presentation screen state"),
        (name = "admin", description = "Session control, requires the admin token")
    ),
    info(
        title = "Raffle Backend API",
        version = "0.1.0",
        description = "Participant registration, lucky numbers and three-winner draw sessions"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_admin_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/admin/session/draw"));
        assert!(paths.iter().any(|p| p.as_str() == "/participants"));
    }
}
