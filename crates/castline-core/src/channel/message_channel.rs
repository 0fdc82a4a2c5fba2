//! A single open channel on a session.

use super::ChannelNamespace;
use crate::event_bus::{CastEvent, EventBus};
use crate::logging::{self, log_line, LogHandle};
use crate::session::Session;
use crate::transport::{MessageReceiver, TransportError};
use std::sync::Arc;

/// Sends on one namespace and observes what the receiver sends back.
///
/// Registered with the session transport as the inbound callback for its
/// namespace, so it is shared (`Arc`) between the manager and the transport.
pub struct MessageChannel {
    namespace: ChannelNamespace,
    event_bus: Option<Arc<EventBus>>,
    transcript: LogHandle,
}

impl MessageChannel {
    pub fn new(namespace: ChannelNamespace) -> Self {
        Self {
            namespace,
            event_bus: None,
            transcript: logging::disabled(),
        }
    }

    /// Publish inbound messages on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn with_transcript(mut self, transcript: LogHandle) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn namespace(&self) -> &ChannelNamespace {
        &self.namespace
    }

    /// Forward `text` verbatim to the receiver over `session`.
    ///
    /// The SEND line is written first: a transport may deliver the reply
    /// before `send` returns.
    pub fn send(&self, session: &Session, text: &str) -> Result<(), TransportError> {
        log_line(&self.transcript, logging::SEND, text);
        session.transport().send(&self.namespace, text).map_err(|e| {
            log_line(&self.transcript, logging::SEND_FAILED, &e.to_string());
            e
        })
    }
}

impl MessageReceiver for MessageChannel {
    fn on_message_received(&self, namespace: &ChannelNamespace, message: &str) {
        log::debug!("onMessageReceived [{}]: {}", namespace, message);
        log_line(&self.transcript, logging::RECV, message);
        if let Some(bus) = &self.event_bus {
            bus.publish(&CastEvent::MessageReceived {
                namespace: namespace.to_string(),
                text: message.to_string(),
            });
        }
    }
}

impl std::fmt::Debug for MessageChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageChannel")
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::CHANNEL_MESSAGE;
    use crate::transport::{LoopbackTransport, SessionTransport};
    use tempfile::tempdir;

    fn ns() -> ChannelNamespace {
        ChannelNamespace::new("cast_namespace").unwrap()
    }

    #[test]
    fn send_uses_channel_namespace() {
        let transport = Arc::new(LoopbackTransport::new());
        let session = Session::new("s1", transport.clone());
        let channel = MessageChannel::new(ns());

        channel.send(&session, "hello").unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].namespace, ns());
        assert_eq!(sent[0].text, "hello");
    }

    #[test]
    fn send_surfaces_transport_error() {
        let transport = Arc::new(LoopbackTransport::new());
        transport.set_fail_send(true);
        let session = Session::new("s1", transport);
        let channel = MessageChannel::new(ns());

        assert!(channel.send(&session, "hello").is_err());
    }

    #[test]
    fn inbound_message_is_published() {
        let bus = Arc::new(EventBus::new());
        let mut rx = bus.subscribe();
        let channel = MessageChannel::new(ns()).with_event_bus(bus);

        channel.on_message_received(&ns(), "from receiver");

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event_type, CHANNEL_MESSAGE);
        assert_eq!(event.payload["text"], "from receiver");
        assert_eq!(event.payload["namespace"], "cast_namespace");
    }

    #[test]
    fn inbound_without_bus_is_harmless() {
        let channel = MessageChannel::new(ns());
        channel.on_message_received(&ns(), "ignored");
    }

    #[test]
    fn transcript_records_both_directions() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(LoopbackTransport::new().with_echo());
        let session = Session::new("s1", transport.clone());
        let channel = Arc::new(
            MessageChannel::new(ns())
                .with_transcript(logging::open_log_file(Some(dir.path()), "s1")),
        );
        transport.register_channel(&ns(), channel.clone()).unwrap();

        channel.send(&session, "ping").unwrap();

        let contents = std::fs::read_to_string(dir.path().join("s1.log")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("SEND: ping"));
        assert!(lines[1].ends_with("RECV: ping"));
    }

    #[test]
    fn transcript_records_refused_send() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(LoopbackTransport::new());
        transport.set_fail_send(true);
        let session = Session::new("s1", transport);
        let channel = MessageChannel::new(ns())
            .with_transcript(logging::open_log_file(Some(dir.path()), "s1"));

        assert!(channel.send(&session, "lost").is_err());

        let contents = std::fs::read_to_string(dir.path().join("s1.log")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("SEND: lost"));
        assert!(lines[1].contains("SEND FAILED: "));
    }
}
