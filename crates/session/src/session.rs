//! Session state: the partial tree, its mode, and user mutations.
//!
//! The [`Session`] is the only owner of the partial tree. Renderers receive
//! immutable [`Snapshot`]s through a watch channel and never mutate tree
//! state directly — edits and deletes come back in as intents through
//! [`Session::set_value`] and [`Session::delete_value`].

use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

use treebase_core::{Node, ParseError, TreePath, ViewMode, parse_edit_input};
use treebase_store_client::{StoreClient, StoreError};

use crate::coordinator::{Fetched, load};

/// Tuning knobs for a session, defaults matching the remote store's
/// interactive limits.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Period between realtime refreshes of the root.
    pub refresh_interval: Duration,
    /// Budget for the deep fetch before demoting to offline mode.
    pub realtime_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(10_000),
            realtime_delay: Duration::from_millis(1_000),
        }
    }
}

/// Immutable view of the session state, published after every applied load.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tree: Node,
    pub mode: ViewMode,
}

/// A user-visible failure of a session operation.
///
/// Every variant is surfaced (the UI alerts); nothing is retried here.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

struct State {
    tree: Node,
    mode: ViewMode,
}

/// One browsing session rooted at a path of the remote store.
pub struct Session {
    store: StoreClient,
    root: TreePath,
    config: SessionConfig,
    state: Mutex<State>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl Session {
    pub fn new(store: StoreClient, root: TreePath, config: SessionConfig) -> Self {
        let initial = Snapshot {
            tree: Node::empty(),
            mode: ViewMode::Realtime,
        };
        let (snapshot_tx, _) = watch::channel(initial);
        Self {
            store,
            root,
            config,
            state: Mutex::new(State {
                tree: Node::empty(),
                mode: ViewMode::Realtime,
            }),
            snapshot_tx,
        }
    }

    pub fn root(&self) -> &TreePath {
        &self.root
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Receiver of state snapshots; one is published after every applied
    /// load.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().unwrap();
        Snapshot {
            tree: state.tree.clone(),
            mode: state.mode,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.state.lock().unwrap().mode
    }

    /// Load the session root and replace the tree with the result.
    pub async fn refresh_root(&self, realtime: bool) -> Result<(), SessionError> {
        let fetched = load(&self.store, &self.root, realtime, self.config.realtime_delay).await?;
        self.apply(&self.root, fetched);
        Ok(())
    }

    /// Materialize a lazy placeholder: fetch the child path (shallow only,
    /// placeholders exist only offline) and splice it in at that path.
    pub async fn expand(&self, path: &TreePath) -> Result<(), SessionError> {
        let fetched = load(&self.store, path, false, self.config.realtime_delay).await?;
        self.apply(path, fetched);
        Ok(())
    }

    /// Write a user-entered value at `path`, then refresh.
    ///
    /// The raw input is interpreted per [`parse_edit_input`]; an unparsable
    /// input is surfaced without any write being issued. In realtime mode
    /// the refresh reloads the whole root; offline it reloads only the
    /// parent of the edited node.
    pub async fn set_value(&self, path: &TreePath, raw: &str) -> Result<(), SessionError> {
        let value = parse_edit_input(raw)?;
        let mode = self.mode();
        self.store.put(path, &value).await?;
        self.refresh_after_mutation(mode, path).await
    }

    /// Delete the value at `path`, then refresh like [`Session::set_value`].
    pub async fn delete_value(&self, path: &TreePath) -> Result<(), SessionError> {
        let mode = self.mode();
        self.store.delete(path).await?;
        self.refresh_after_mutation(mode, path).await
    }

    async fn refresh_after_mutation(
        &self,
        mode: ViewMode,
        path: &TreePath,
    ) -> Result<(), SessionError> {
        match mode {
            ViewMode::Realtime => self.refresh_root(true).await,
            ViewMode::Offline => {
                // Cheap refresh: only the mutated node's parent, clamped to
                // the displayed root when the node is the root itself.
                let parent = path.parent();
                let target = if parent.relative_to(&self.root).is_some() {
                    parent
                } else {
                    self.root.clone()
                };
                let fetched =
                    load(&self.store, &target, false, self.config.realtime_delay).await?;
                self.apply(&target, fetched);
                Ok(())
            }
        }
    }

    /// Merge an applied load into the tree and publish a snapshot.
    ///
    /// Merges are keyed by absolute path, so a slow lazy-expand result that
    /// lands after a newer poll still applies at the right place (or is
    /// dropped if the view no longer covers it).
    fn apply(&self, target: &TreePath, fetched: Fetched) {
        let mut state = self.state.lock().unwrap();
        if let Err(e) = state.tree.merge(&self.root, target, fetched.node) {
            warn!("dropping fetch result: {e}");
            return;
        }
        state.mode = fetched.mode;
        self.snapshot_tx.send_replace(Snapshot {
            tree: state.tree.clone(),
            mode: state.mode,
        });
    }
}
