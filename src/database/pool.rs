//! Bounded pool of SQLite storage handles.
//!
//! `acquire` prefers an idle handle, opens a new one while under the cap, and
//! once the cap is reached hands out the first open handle as a shared handle
//! instead of blocking. SQLite serialises writers on its own, so callers only
//! see slower access under contention.
//!
//! The mutex guards bookkeeping only. Opening and closing handles, and every
//! query run through a handle, happen outside of it.

use crate::config::DatabaseConfig;
use crate::database::connection::{StorageHandle, open_handle};
use crate::error::{AppError, AppResult};
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct PoolState {
    idle: Vec<(usize, StorageHandle)>,
    open: Vec<(usize, StorageHandle)>,
    in_use: usize,
    shared: usize,
    /// Slots reserved by callers that are currently opening a handle
    opening: usize,
    next_id: usize,
    /// Bumped by `close_all`; handles from an older generation are discarded on release
    generation: u64,
}

struct PoolInner {
    config: DatabaseConfig,
    max_size: usize,
    state: Mutex<PoolState>,
}

#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub max_size: usize,
    pub open: usize,
    pub idle: usize,
    pub in_use: usize,
    pub shared: usize,
}

enum Plan {
    Reuse(usize, StorageHandle),
    Open(usize),
    Share(usize, StorageHandle),
    Wait,
}

impl ConnectionPool {
    pub fn new(config: DatabaseConfig) -> Self {
        let max_size = config.max_connections.max(1) as usize;
        Self {
            inner: Arc::new(PoolInner {
                config,
                max_size,
                state: Mutex::new(PoolState::default()),
            }),
        }
    }

    /// Hand out a storage handle. Never blocks on other callers except while
    /// every slot is still being opened.
    pub async fn acquire(&self) -> AppResult<PooledConnection> {
        let deadline = Instant::now() + self.inner.config.connect_timeout();

        loop {
            let (plan, generation) = {
                let mut state = self.inner.state.lock();
                let generation = state.generation;
                let plan = if let Some((id, handle)) = state.idle.pop() {
                    state.in_use += 1;
                    Plan::Reuse(id, handle)
                } else if state.open.len() + state.opening < self.inner.max_size {
                    state.opening += 1;
                    let id = state.next_id;
                    state.next_id += 1;
                    Plan::Open(id)
                } else if let Some((id, handle)) = state.open.first().cloned() {
                    state.shared += 1;
                    Plan::Share(id, handle)
                } else {
                    Plan::Wait
                };
                (plan, generation)
            };

            match plan {
                Plan::Reuse(id, handle) => {
                    return Ok(self.wrap(id, handle, false, generation));
                }
                Plan::Share(id, handle) => {
                    log::debug!(
                        "Connection pool exhausted ({} handles), sharing handle #{id}",
                        self.inner.max_size
                    );
                    return Ok(self.wrap(id, handle, true, generation));
                }
                Plan::Open(id) => {
                    let opened = open_handle(&self.inner.config).await;
                    let mut state = self.inner.state.lock();
                    state.opening -= 1;
                    let handle = opened?;
                    if state.generation == generation {
                        state.open.push((id, handle.clone()));
                        state.in_use += 1;
                        log::debug!(
                            "Opened storage handle #{id} ({}/{})",
                            state.open.len(),
                            self.inner.max_size
                        );
                    }
                    return Ok(self.wrap(id, handle, false, generation));
                }
                Plan::Wait => {
                    if Instant::now() >= deadline {
                        return Err(AppError::InternalError(
                            "timed out waiting for a storage handle".into(),
                        ));
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            }
        }
    }

    /// Return a handle to the idle set. Dropping the handle does the same.
    pub fn release(&self, conn: PooledConnection) {
        drop(conn);
    }

    /// Close every open handle and reset the pool. Close failures are ignored.
    pub async fn close_all(&self) {
        let handles = {
            let mut state = self.inner.state.lock();
            let generation = state.generation + 1;
            let next_id = state.next_id;
            let handles = std::mem::take(&mut state.open);
            *state = PoolState {
                next_id,
                generation,
                ..PoolState::default()
            };
            handles
        };

        let count = handles.len();
        for (_, handle) in handles {
            handle.close().await;
        }
        log::info!("Closed {count} storage handle(s)");
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock();
        PoolStats {
            max_size: self.inner.max_size,
            open: state.open.len(),
            idle: state.idle.len(),
            in_use: state.in_use,
            shared: state.shared,
        }
    }

    fn wrap(
        &self,
        id: usize,
        handle: StorageHandle,
        shared: bool,
        generation: u64,
    ) -> PooledConnection {
        PooledConnection {
            id,
            handle,
            shared,
            generation,
            pool: Arc::clone(&self.inner),
        }
    }
}

/// A handle checked out of the pool. Goes back to the idle set when dropped;
/// shared handles are left alone since their owner returns them.
pub struct PooledConnection {
    id: usize,
    handle: StorageHandle,
    shared: bool,
    generation: u64,
    pool: Arc<PoolInner>,
}

impl PooledConnection {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }
}

impl Deref for PooledConnection {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.handle.db
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let mut state = self.pool.state.lock();
        if state.generation != self.generation {
            return;
        }
        if self.shared {
            state.shared = state.shared.saturating_sub(1);
            return;
        }
        state.in_use = state.in_use.saturating_sub(1);
        state.idle.push((self.id, self.handle.clone()));
    }
}
