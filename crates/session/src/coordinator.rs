//! Shallow/deep fetch coordination.
//!
//! Every load issues a cheap shallow fetch. A realtime load additionally
//! races an expensive deep fetch against a timeout: the deep result is used
//! when it arrives in time, otherwise the view is demoted to offline and
//! built from the shallow result, with unexpanded children left as lazy
//! placeholders. Hitting the timeout is an expected demotion, not an error.

use std::time::Duration;

use tracing::{debug, warn};

use treebase_core::{Node, TreePath, ViewMode};
use treebase_store_client::{StoreClient, StoreError};

/// Outcome of one coordinated load.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub mode: ViewMode,
    pub node: Node,
}

/// Load the subtree at `path`.
///
/// The shallow fetch and (when `realtime`) the deep fetch run concurrently;
/// both are awaited before a result is picked, and the deep result strictly
/// wins when available. Elapsing the `realtime_delay` timeout drops the deep
/// call, aborting it in flight. A deep failure other than the timeout is
/// logged and demoted the same way; a shallow failure fails the whole load.
pub async fn load(
    store: &StoreClient,
    path: &TreePath,
    realtime: bool,
    realtime_delay: Duration,
) -> Result<Fetched, StoreError> {
    let deep = async {
        if !realtime {
            return None;
        }
        match tokio::time::timeout(realtime_delay, store.get_deep(path)).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("deep fetch at {path} failed, falling back to shallow: {e}");
                None
            }
            Err(_) => {
                debug!("deep fetch at {path} exceeded {realtime_delay:?}, going offline");
                None
            }
        }
    };

    let (shallow, deep) = tokio::join!(store.get_shallow(path), deep);
    let shallow = shallow?;

    Ok(match deep {
        Some(value) => Fetched {
            mode: ViewMode::Realtime,
            node: Node::from_deep(value),
        },
        None => Fetched {
            mode: ViewMode::Offline,
            node: Node::from_shallow(shallow),
        },
    })
}
