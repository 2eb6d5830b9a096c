pub mod edit;
pub mod path;
pub mod tree;

pub use edit::{ParseError, parse_edit_input};
pub use path::TreePath;
pub use tree::{MergeError, Node};

/// How the currently displayed tree is being kept up to date.
///
/// `Realtime` means full periodic deep fetches are active. `Offline` means
/// only shallow data is trusted; it is entered when a deep fetch times out
/// (or was never requested) and is sticky for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Realtime,
    Offline,
}
