//! Message channels scoped to a session.
//!
//! A [`MessageChannelManager`] keeps at most one [`MessageChannel`] open, and
//! only while a session is current. Sends are attempted only through an open
//! channel; otherwise the caller gets [`SendOutcome::Unsendable`] and is
//! expected to show the text locally.

mod manager;
mod message_channel;
mod namespace;

pub use manager::MessageChannelManager;
pub use message_channel::MessageChannel;
pub use namespace::{ChannelNamespace, NamespaceError, HELLO_WORLD_NAMESPACE, MAX_NAMESPACE_LEN};

use crate::transport::TransportError;
use serde::Serialize;
use thiserror::Error;

/// Where the manager stands with respect to sessions and channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChannelState {
    NoSession,
    SessionNoChannel,
    SessionWithChannel,
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSession => write!(f, "no session"),
            Self::SessionNoChannel => write!(f, "session without channel"),
            Self::SessionWithChannel => write!(f, "session with channel"),
        }
    }
}

/// Result of handing a message to the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SendOutcome {
    /// Passed to the transport. Delivery is not acknowledged.
    Delivered,
    /// No open channel; the caller should present the text locally.
    Unsendable,
}

impl SendOutcome {
    pub fn is_delivered(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Successful outcome of [`MessageChannelManager::open_channel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOpen {
    Opened,
    /// A channel was already open; nothing was registered.
    AlreadyOpen,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("No current session to open a channel on")]
    NoSession,

    #[error("Failed to open channel {namespace}: {source}")]
    OpenFailed {
        namespace: ChannelNamespace,
        source: TransportError,
    },

    #[error("Failed to close channel {namespace}: {source}")]
    CloseFailed {
        namespace: ChannelNamespace,
        source: TransportError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_outcome_is_delivered() {
        assert!(SendOutcome::Delivered.is_delivered());
        assert!(!SendOutcome::Unsendable.is_delivered());
    }

    #[test]
    fn channel_state_display() {
        assert_eq!(ChannelState::NoSession.to_string(), "no session");
        assert_eq!(
            ChannelState::SessionWithChannel.to_string(),
            "session with channel"
        );
    }

    #[test]
    fn open_failed_displays_namespace_and_cause() {
        let error = ChannelError::OpenFailed {
            namespace: ChannelNamespace::new("cast_namespace").unwrap(),
            source: TransportError::Io("boom".to_string()),
        };
        let text = error.to_string();
        assert!(text.contains("cast_namespace"));
        assert!(text.contains("boom"));
    }
}
