//! Broadcasting of session and channel signals to host-side observers.
//!
//! The core reports what happened (connected, channel opened, message
//! received, message shown locally) on an [`EventBus`]. Hosts subscribe to
//! refresh their UI affordances or to log.
//!
//! # Example
//!
//! ```rust
//! use castline_core::event_bus::{CastEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(&CastEvent::Connected { session_id: "s1".into() });
//!
//! let event = rx.try_recv().unwrap();
//! assert_eq!(event.event_type, "session:connected");
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity for the event bus.
/// Slow subscribers miss events (lag) beyond this many.
pub const DEFAULT_CAPACITY: usize = 1024;

pub const SESSION_CONNECTED: &str = "session:connected";
pub const SESSION_DISCONNECTED: &str = "session:disconnected";
pub const CHANNEL_OPENED: &str = "channel:opened";
pub const CHANNEL_CLOSED: &str = "channel:closed";
pub const CHANNEL_MESSAGE: &str = "channel:message";
pub const MESSAGE_FALLBACK: &str = "message:fallback";

/// Signals emitted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CastEvent {
    /// A session became current (fresh start or resume).
    Connected { session_id: String },

    /// The current session ended.
    Disconnected { session_id: String },

    ChannelOpened { namespace: String },

    ChannelClosed { namespace: String },

    /// The receiver application sent a message on an open channel.
    MessageReceived { namespace: String, text: String },

    /// No channel was open; the text was presented locally instead.
    Fallback { text: String },
}

impl CastEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Connected { .. } => SESSION_CONNECTED,
            Self::Disconnected { .. } => SESSION_DISCONNECTED,
            Self::ChannelOpened { .. } => CHANNEL_OPENED,
            Self::ChannelClosed { .. } => CHANNEL_CLOSED,
            Self::MessageReceived { .. } => CHANNEL_MESSAGE,
            Self::Fallback { .. } => MESSAGE_FALLBACK,
        }
    }
}

/// A broadcast event containing an event type and JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastEvent {
    /// Event type identifier (e.g., "session:connected").
    pub event_type: String,

    pub payload: serde_json::Value,
}

impl BroadcastEvent {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    /// Decode the payload back into the signal that produced it.
    pub fn decode(&self) -> Option<CastEvent> {
        serde_json::from_value(self.payload.clone()).ok()
    }
}

/// Fan-out of [`BroadcastEvent`]s over a tokio broadcast channel.
///
/// Emitting never blocks, which keeps it safe to call from lifecycle
/// callbacks.
pub struct EventBus {
    sender: broadcast::Sender<BroadcastEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new EventBus with specified capacity.
    ///
    /// The capacity determines how many events can be buffered before slow
    /// subscribers start missing events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Emit an arbitrary payload to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// If there are no subscribers, the event is dropped and 0 is returned.
    pub fn emit<T: Serialize>(&self, event_type: &str, payload: &T) -> usize {
        let json_payload = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Failed to serialize event payload: {}", e);
                return 0;
            }
        };

        let event = BroadcastEvent::new(event_type, json_payload);
        self.sender.send(event).unwrap_or(0)
    }

    /// Emit a core signal under its own event type.
    pub fn publish(&self, event: &CastEvent) -> usize {
        self.emit(event.event_type(), event)
    }

    /// Subscribe to all future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
