pub mod coordinator;
pub mod poller;
pub mod session;

pub use coordinator::{Fetched, load};
pub use poller::Poller;
pub use session::{Session, SessionConfig, SessionError, Snapshot};
