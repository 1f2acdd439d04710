pub mod admin;
pub mod display;
pub mod participant;
pub mod session;

pub use admin::admin_config;
pub use display::display_config;
pub use participant::participant_config;
pub use session::session_config;
