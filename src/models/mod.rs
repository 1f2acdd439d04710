pub mod common;
pub mod participant;
pub mod session;
pub mod winner;

pub use common::*;
pub use participant::*;
pub use session::*;
pub use winner::*;
