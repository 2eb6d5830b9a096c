//! Tracking of in-flight forwarded calls.
//!
//! Each forward owns a [`PendingRequest`] guard holding a cancellation
//! token. When the originating client disconnects, axum drops the handler
//! future, the guard drops with it, and the cancellation signal aborts the
//! outbound call — no response is written and nothing downstream completes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

/// Registry of in-flight forwards, keyed by an id per originating
/// connection.
#[derive(Default)]
pub struct PendingRequests {
    inner: Mutex<HashMap<u64, CancellationToken>>,
    next_id: AtomicU64,
}

impl PendingRequests {
    /// Track a new forward. The returned guard deregisters the entry and
    /// fires its cancellation signal when dropped.
    pub fn register(self: &Arc<Self>) -> PendingRequest {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.inner.lock().unwrap().insert(id, token.clone());
        PendingRequest {
            registry: Arc::clone(self),
            id,
            token,
        }
    }

    /// Number of forwards currently in flight.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn deregister(&self, id: u64) {
        self.inner.lock().unwrap().remove(&id);
    }
}

/// Guard for one tracked forward.
pub struct PendingRequest {
    registry: Arc<PendingRequests>,
    id: u64,
    token: CancellationToken,
}

impl PendingRequest {
    /// Signal the outbound call listens on.
    pub fn cancellation(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
        // A no-op when the forward already completed normally.
        self.token.cancel();
    }
}
