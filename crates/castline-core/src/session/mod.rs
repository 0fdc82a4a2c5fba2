//! Session lifecycle tracking.
//!
//! The host's session manager reports lifecycle callbacks; the
//! [`SessionLifecycleTracker`] reduces them to a single current session and
//! opens or closes the message channel accordingly.

mod event;
mod state;
mod tracker;

pub use event::{SessionEvent, SessionManagerListener, SessionSource};
pub use state::{Session, SessionId};
pub use tracker::SessionLifecycleTracker;
