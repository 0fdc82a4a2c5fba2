//! Session transport seam.
//!
//! The core never talks to a vendor SDK directly. A host wraps whatever
//! session object its SDK hands out in a [`SessionTransport`] and passes it
//! along with the lifecycle callbacks.

mod loopback;

pub use loopback::{LoopbackTransport, SentMessage};

use crate::channel::ChannelNamespace;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Session is not connected")]
    Disconnected,

    #[error("Namespace {0} is already registered")]
    AlreadyRegistered(ChannelNamespace),

    #[error("Namespace {0} is not registered")]
    NotRegistered(ChannelNamespace),

    #[error("Transport I/O error: {0}")]
    Io(String),
}

/// Callback invoked by a transport when a message arrives on a registered namespace.
pub trait MessageReceiver: Send + Sync {
    fn on_message_received(&self, namespace: &ChannelNamespace, message: &str);
}

/// Send/receive primitives a connected session exposes for named channels.
pub trait SessionTransport: Send + Sync {
    /// Route inbound messages for `namespace` to `receiver`.
    fn register_channel(
        &self,
        namespace: &ChannelNamespace,
        receiver: Arc<dyn MessageReceiver>,
    ) -> Result<(), TransportError>;

    /// Stop routing inbound messages for `namespace`.
    fn unregister_channel(&self, namespace: &ChannelNamespace) -> Result<(), TransportError>;

    /// Queue `message` for delivery. Delivery itself is asynchronous and
    /// never acknowledged to the caller.
    fn send(&self, namespace: &ChannelNamespace, message: &str) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool {
        true
    }
}
