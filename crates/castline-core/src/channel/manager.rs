//! MessageChannelManager - one channel per current session.

use super::{ChannelError, ChannelNamespace, ChannelOpen, ChannelState, MessageChannel, SendOutcome};
use crate::event_bus::{CastEvent, EventBus};
use crate::logging::{self, open_log_file, LogHandle};
use crate::session::{Session, SessionId};
use std::path::PathBuf;
use std::sync::Arc;

/// Owns the current session reference and the single channel opened on it.
///
/// Invariant: `channel` is `Some` only while `session` is `Some` and the
/// channel was registered on that session's transport.
pub struct MessageChannelManager {
    namespace: ChannelNamespace,
    session: Option<Session>,
    channel: Option<Arc<MessageChannel>>,
    event_bus: Option<Arc<EventBus>>,
    log_dir: Option<PathBuf>,
    transcript: LogHandle,
}

impl MessageChannelManager {
    pub fn new(namespace: ChannelNamespace) -> Self {
        Self {
            namespace,
            session: None,
            channel: None,
            event_bus: None,
            log_dir: None,
            transcript: logging::disabled(),
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Keep a transcript per session under `dir`.
    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = Some(dir);
        self
    }

    pub fn state(&self) -> ChannelState {
        match (&self.session, &self.channel) {
            (None, _) => ChannelState::NoSession,
            (Some(_), None) => ChannelState::SessionNoChannel,
            (Some(_), Some(_)) => ChannelState::SessionWithChannel,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Namespace new channels are opened on.
    pub fn namespace(&self) -> &ChannelNamespace {
        &self.namespace
    }

    /// Namespace of the open channel, if any.
    pub fn channel_namespace(&self) -> Option<&ChannelNamespace> {
        self.channel.as_deref().map(MessageChannel::namespace)
    }

    /// Make `session` current and open the channel on it.
    ///
    /// A different session that was current is released first.
    pub fn start_session(&mut self, session: Session) -> Result<ChannelOpen, ChannelError> {
        self.adopt(session);
        self.open_channel()
    }

    /// Make a resumed `session` current without opening a channel.
    ///
    /// The open channel survives only if the session id is unchanged. A
    /// channel open on a rebuilt handle with its own transport is registered
    /// again on that transport.
    pub fn resume_session(&mut self, session: Session) {
        if self.adopt(session) {
            // open_channel logs the failure; the session is left without a channel.
            let _ = self.open_channel();
        }
    }

    /// Release the session with `id` if it is the current one.
    ///
    /// Returns false for an ended event about any other session.
    pub fn end_session(&mut self, id: &SessionId) -> bool {
        if self.session.as_ref().is_some_and(|current| current.id == *id) {
            self.teardown();
            true
        } else {
            false
        }
    }

    /// Close the channel and forget the session, whatever it is.
    pub fn teardown(&mut self) {
        if let Err(e) = self.close_channel() {
            log::warn!("{}", e);
        }
        self.session = None;
        self.transcript = logging::disabled();
    }

    /// Register a channel on the current session.
    ///
    /// No-op when a channel is already open. On transport failure the channel
    /// stays unset and later sends take the fallback path; nothing retries.
    pub fn open_channel(&mut self) -> Result<ChannelOpen, ChannelError> {
        let session = self.session.as_ref().ok_or(ChannelError::NoSession)?;
        if self.channel.is_some() {
            log::debug!("Message channel already open on session {}", session.id);
            return Ok(ChannelOpen::AlreadyOpen);
        }

        let mut channel =
            MessageChannel::new(self.namespace.clone()).with_transcript(self.transcript.clone());
        if let Some(bus) = &self.event_bus {
            channel = channel.with_event_bus(Arc::clone(bus));
        }
        let channel = Arc::new(channel);

        if let Err(source) = session
            .transport()
            .register_channel(channel.namespace(), channel.clone())
        {
            log::warn!("Error starting message channel on {}: {}", session.id, source);
            return Err(ChannelError::OpenFailed {
                namespace: self.namespace.clone(),
                source,
            });
        }

        log::debug!("Message channel started on session {}", session.id);
        self.channel = Some(channel);
        self.publish(CastEvent::ChannelOpened {
            namespace: self.namespace.to_string(),
        });
        Ok(ChannelOpen::Opened)
    }

    /// Unregister and drop the open channel. Safe to call repeatedly.
    ///
    /// The channel reference is cleared even when the transport refuses to
    /// unregister; the error is still returned for logging.
    pub fn close_channel(&mut self) -> Result<(), ChannelError> {
        let Some(channel) = self.channel.take() else {
            return Ok(());
        };
        let namespace = channel.namespace().clone();
        self.publish(CastEvent::ChannelClosed {
            namespace: namespace.to_string(),
        });

        let Some(session) = &self.session else {
            return Ok(());
        };
        match session.transport().unregister_channel(&namespace) {
            Ok(()) => {
                log::debug!("Message channel closed on session {}", session.id);
                Ok(())
            }
            Err(source) => Err(ChannelError::CloseFailed { namespace, source }),
        }
    }

    /// Forward `text` over the open channel.
    ///
    /// Fire-and-forget. Returns [`SendOutcome::Unsendable`] without touching
    /// the transport when no channel is open or `text` is empty, and when the
    /// transport refuses the message outright.
    pub fn send_message(&self, text: &str) -> SendOutcome {
        if text.is_empty() {
            log::warn!("Refusing to send an empty message");
            return SendOutcome::Unsendable;
        }
        let (Some(session), Some(channel)) = (&self.session, &self.channel) else {
            return SendOutcome::Unsendable;
        };
        match channel.send(session, text) {
            Ok(()) => SendOutcome::Delivered,
            Err(e) => {
                log::warn!("Send on {} failed: {}", channel.namespace(), e);
                SendOutcome::Unsendable
            }
        }
    }

    /// Make `session` current.
    ///
    /// A new handle for the current id keeps the open channel, unless the
    /// handle carries a different transport: then the channel is closed on
    /// the old one and true is returned so the caller opens it again.
    fn adopt(&mut self, session: Session) -> bool {
        let same_transport = self
            .session
            .as_ref()
            .filter(|current| current.same_as(&session))
            .map(|current| current.shares_transport(&session));
        let Some(same_transport) = same_transport else {
            self.replace_session(session);
            return false;
        };
        if same_transport || self.channel.is_none() {
            self.session = Some(session);
            return false;
        }

        log::debug!("Session {} has a new transport, moving channel", session.id);
        if let Err(e) = self.close_channel() {
            log::warn!("{}", e);
        }
        self.session = Some(session);
        true
    }

    fn replace_session(&mut self, session: Session) {
        if let Err(e) = self.close_channel() {
            log::warn!("{}", e);
        }
        self.bind(session);
    }

    fn bind(&mut self, session: Session) {
        self.transcript = match &self.log_dir {
            Some(dir) => open_log_file(Some(dir.as_path()), &format!("session-{}", session.id)),
            None => logging::disabled(),
        };
        self.session = Some(session);
    }

    fn publish(&self, event: CastEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(&event);
        }
    }
}
