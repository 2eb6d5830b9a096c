//! Periodic refresh of the displayed root.
//!
//! The poller drives realtime mode: an immediate load on start, then a
//! fixed-interval repeat for as long as the session stays realtime. Offline
//! mode is sticky — once a load demotes the session, the loop stops for
//! good and only explicit user navigation fetches again.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use treebase_core::ViewMode;

use crate::session::Session;

/// Handle to the polling loop of one session.
///
/// Dropping the handle detaches the loop; call [`Poller::stop`] on teardown
/// to cancel the timer and wait for the loop to exit.
pub struct Poller {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Start polling: one immediate realtime load, then interval ticks.
    pub fn spawn(session: Arc<Session>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(session, shutdown_rx));
        Self {
            shutdown: shutdown_tx,
            handle,
        }
    }

    /// Stop polling and wait for the loop to finish. No fetches occur after
    /// this returns.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

async fn run(session: Arc<Session>, mut shutdown: watch::Receiver<bool>) {
    if let Err(e) = session.refresh_root(true).await {
        warn!("initial load at {} failed: {e}", session.root());
    }

    let mut interval = tokio::time::interval(session.config().refresh_interval);
    // Skip the first immediate tick
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if session.mode() != ViewMode::Realtime {
                    debug!("session at {} is offline, polling stopped", session.root());
                    break;
                }
                if let Err(e) = session.refresh_root(true).await {
                    warn!("periodic refresh at {} failed: {e}", session.root());
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("poller shutting down");
                    break;
                }
            }
        }
    }
}
