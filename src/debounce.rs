use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Minimum-interval gate per action key (e.g. `register:<email>`, `session:draw`).
///
/// Lives in memory only; a restart forgets every key.
#[derive(Default)]
pub struct DebounceGuard {
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl DebounceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `false` if `key` acted less than `min_interval` ago, otherwise records now and returns `true`.
    pub fn try_act(&self, key: &str, min_interval: Duration) -> bool {
        let now = Instant::now();
        let mut last_seen = self.last_seen.lock();
        if let Some(last) = last_seen.get(key)
            && now.duration_since(*last) < min_interval
        {
            return false;
        }
        last_seen.insert(key.to_string(), now);
        true
    }

    /// Drop keys that have not acted within `horizon`.
    pub fn purge_stale(&self, horizon: Duration) -> usize {
        let mut last_seen = self.last_seen.lock();
        let before = last_seen.len();
        last_seen.retain(|_, last| last.elapsed() < horizon);
        before - last_seen.len()
    }

    pub fn len(&self) -> usize {
        self.last_seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_attempt_inside_window_is_rejected() {
        let guard = DebounceGuard::new();
        let window = Duration::from_secs(60);
        assert!(guard.try_act("session:draw", window));
        assert!(!guard.try_act("session:draw", window));
        // other keys are independent
        assert!(guard.try_act("session:start", window));
    }

    #[test]
    fn test_rejection_does_not_refresh_timestamp() {
        let guard = DebounceGuard::new();
        assert!(guard.try_act("k", Duration::from_secs(60)));
        assert!(!guard.try_act("k", Duration::from_secs(60)));
        // a zero window always passes
        assert!(guard.try_act("k", Duration::ZERO));
    }

    #[test]
    fn test_purge_stale() {
        let guard = DebounceGuard::new();
        guard.try_act("a", Duration::ZERO);
        guard.try_act("b", Duration::ZERO);
        assert_eq!(guard.purge_stale(Duration::from_secs(3600)), 0);
        assert_eq!(guard.purge_stale(Duration::ZERO), 2);
        assert!(guard.is_empty());
    }
}
