//! Background maintenance jobs.
//!
//! Sweeps keep the in-memory maps bounded: cached responses nobody reads,
//! debounce keys of users who left, expired display flags.
//! Call `spawn_all` once during startup.

use crate::config::Config;
use crate::debounce::DebounceGuard;
use crate::display::DisplayBoard;
use crate::services::ResponseCache;
use std::sync::Arc;
use std::time::Duration;

/// Spawn all background tasks. Detaches via `tokio::spawn`; does not block.
pub fn spawn_all(
    config: &Config,
    cache: Arc<ResponseCache>,
    debounce: Arc<DebounceGuard>,
    board: Arc<DisplayBoard>,
) {
    let interval = Duration::from_secs(config.cache.sweep_interval_secs.max(1));
    let cache_max_age = Duration::from_secs(config.cache.max_age_secs);
    let debounce_horizon = Duration::from_secs(config.debounce.purge_after_secs);

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let evicted = cache.cleanup_expired(cache_max_age);
            if evicted > 0 {
                log::debug!("Cache sweep evicted {evicted} entries");
            }

            let purged = debounce.purge_stale(debounce_horizon);
            if purged > 0 {
                log::debug!("Debounce purge dropped {purged} keys");
            }

            let expired = board.sweep();
            if expired > 0 {
                log::debug!("Display sweep expired {expired} flags");
            }
        }
    });
}
