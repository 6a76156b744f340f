use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Per-key async mutexes used to serialize writers inside one process.
///
/// This does not coordinate separate processes sharing the same store.
#[derive(Clone, Default)]
pub struct WriteLocks {
    entries: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl WriteLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let map = self.entries.read().await;
            map.get(key).cloned()
        };

        let entry = match entry {
            Some(entry) => entry,
            None => {
                let mut map = self.entries.write().await;
                map.entry(key.to_string()).or_default().clone()
            }
        };

        entry.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
