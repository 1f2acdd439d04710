//! Values that expire a fixed window after they were written.
//!
//! Unlike `TtlCache`, the window is chosen by the writer, so a reader can
//! never resurrect a value that should already be gone.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct Expiring<V> {
    value: V,
    written_at: Instant,
    window: Duration,
}

impl<V> Expiring<V> {
    fn is_live(&self) -> bool {
        self.written_at.elapsed() < self.window
    }
}

pub struct ExpiringStore<V> {
    entries: Mutex<HashMap<String, Expiring<V>>>,
}

impl<V> Default for ExpiringStore<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> ExpiringStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: V, window: Duration) {
        self.entries.lock().insert(
            key.into(),
            Expiring {
                value,
                written_at: Instant::now(),
                window,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries
            .lock()
            .remove(key)
            .filter(Expiring::is_live)
            .map(|entry| entry.value)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Evict every expired entry in one pass.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live());
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
