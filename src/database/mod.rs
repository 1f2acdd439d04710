pub mod connection;
pub mod pool;

pub use connection::{open_handle, run_migrations};
pub use pool::{ConnectionPool, PoolStats, PooledConnection};
