use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::RequestConfig;

use super::key::RequestKey;

/// Tracks one cancellation token per logical request key.
///
/// At most one token is live per key. Registering a key that is already
/// present cancels the earlier request's token before the new one takes its
/// place, so the transport aborts the superseded request while the new one
/// proceeds. Canceling a token whose request already completed is a no-op.
#[derive(Debug, Default)]
pub struct AbortRegistry {
    entries: Mutex<HashMap<RequestKey, CancellationToken>>,
}

impl AbortRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a fresh cancellation token to `config` and records it under
    /// `key`, canceling and replacing any token already held for that key.
    pub fn create(&self, key: &RequestKey, config: &mut RequestConfig) {
        let token = CancellationToken::new();
        config.cancel = Some(token.clone());

        let mut entries = self.lock();
        if let Some(previous) = entries.remove(key) {
            debug!(key = %key, "canceling superseded request");
            previous.cancel();
        }
        entries.insert(key.clone(), token);
    }

    /// Drops the entry for `key`. Absent keys are silently ignored.
    pub fn remove(&self, key: &RequestKey) {
        self.lock().remove(key);
    }

    /// Whether a token is currently held for `key`.
    #[must_use]
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestKey, CancellationToken>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
