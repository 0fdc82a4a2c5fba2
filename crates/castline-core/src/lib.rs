//! # castline-core
//!
//! Core logic for Castline: send short text messages to a connected cast
//! receiver over a named message channel.
//!
//! This crate is framework-agnostic. It never touches a vendor SDK; hosts
//! implement [`transport::SessionTransport`] around whatever session object
//! they have and feed lifecycle callbacks in.
//!
//! ## Key Concepts
//!
//! - **Session**: an established connection to a receiver, identified by id
//! - **Channel**: a named sub-stream on a session, at most one open at a time
//! - **Fallback**: local presentation of a message when no channel is open

pub mod channel;
pub mod config;
pub mod context;
pub mod event_bus;
pub mod fallback;
pub mod input;
pub mod logging;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use channel::{ChannelNamespace, ChannelState, MessageChannelManager, SendOutcome};
pub use config::CastConfig;
pub use context::CastContext;
pub use session::{Session, SessionEvent, SessionId, SessionLifecycleTracker};
