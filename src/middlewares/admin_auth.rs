use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;

/// Accepts `Authorization: Bearer <token>` or `X-Admin-Token: <token>`.
fn presented_token(req: &ServiceRequest) -> Option<&str> {
    let headers = req.headers();
    if let Some(value) = headers.get("Authorization")
        && let Ok(value) = value.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(token);
    }
    headers.get("X-Admin-Token").and_then(|v| v.to_str().ok())
}

/// Gate in front of session-control routes. Wrap it on the admin scope: it
/// runs after routing, so every request it sees has already matched an admin
/// route, however the path was spelled on the wire.
pub struct AdminGuard {
    token: Rc<String>,
}

impl AdminGuard {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Rc::new(token.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGuardService {
            service,
            token: Rc::clone(&self.token),
        }))
    }
}

pub struct AdminGuardService<S> {
    service: S,
    token: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for AdminGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight never carries credentials
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let authorized = presented_token(&req).map(|token| token == self.token.as_str());
        match authorized {
            Some(true) => Box::pin(self.service.call(req)),
            Some(false) => {
                let error = AppError::AuthError("Invalid admin token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
            None => {
                let error = AppError::AuthError("Missing admin token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}
