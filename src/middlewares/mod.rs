pub mod admin_auth;
pub mod cors;

pub use admin_auth::AdminGuard;
pub use cors::create_cors;
