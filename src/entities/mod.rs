pub mod draw_records;
pub mod participants;
pub mod session;

pub use draw_records as draw_record_entity;
pub use participants as participant_entity;
pub use session as session_entity;
