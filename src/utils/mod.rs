pub mod code_generator;

pub use code_generator::{generate_lucky_number, generate_session_id};
