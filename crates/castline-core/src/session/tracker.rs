//! SessionLifecycleTracker - turns lifecycle callbacks into one current session.

use super::event::{SessionEvent, SessionManagerListener, SessionSource};
use super::state::{Session, SessionId};
use crate::channel::{ChannelState, MessageChannelManager, SendOutcome};
use crate::event_bus::{CastEvent, EventBus};
use std::sync::Arc;

/// Tracks the current session and drives channel open/close from lifecycle
/// callbacks.
///
/// Construct one per application scope and hand it to the host's session
/// manager as its listener. While detached (host paused) callbacks are
/// ignored, as if the listener had been unregistered.
pub struct SessionLifecycleTracker {
    channels: MessageChannelManager,
    event_bus: Option<Arc<EventBus>>,
    attached: bool,
}

impl SessionLifecycleTracker {
    pub fn new(channels: MessageChannelManager) -> Self {
        Self {
            channels,
            event_bus: None,
            attached: true,
        }
    }

    /// Publish connected/disconnected signals on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.channels.session()
    }

    pub fn current_session_id(&self) -> Option<&SessionId> {
        self.current_session().map(|s| &s.id)
    }

    pub fn state(&self) -> ChannelState {
        self.channels.state()
    }

    pub fn channels(&self) -> &MessageChannelManager {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut MessageChannelManager {
        &mut self.channels
    }

    pub fn send_message(&self, text: &str) -> SendOutcome {
        self.channels.send_message(text)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Start listening again and adopt the source's connected session if we
    /// have none. An adopted session gets no channel until one is requested.
    pub fn attach(&mut self, source: &dyn SessionSource) {
        self.attached = true;
        if self.current_session().is_some() {
            return;
        }
        if let Some(session) = source.current_session() {
            log::debug!("Adopting current session {}", session.id);
            let session_id = session.id.to_string();
            self.channels.resume_session(session);
            self.publish(CastEvent::Connected { session_id });
        }
    }

    /// Stop listening. The current session and channel are kept.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Close the channel and forget the session.
    pub fn teardown(&mut self) {
        let ended = self.current_session_id().cloned();
        self.channels.teardown();
        if let Some(id) = ended {
            self.publish(CastEvent::Disconnected {
                session_id: id.to_string(),
            });
        }
    }

    /// Feed a queued lifecycle event through the listener callbacks.
    pub fn handle(&mut self, event: SessionEvent) {
        event.deliver_to(self);
    }

    fn listening(&self, callback: &str, session: &Session) -> bool {
        if !self.attached {
            log::debug!("Ignoring {} for {} while detached", callback, session.id);
        }
        self.attached
    }

    fn publish(&self, event: CastEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(&event);
        }
    }
}

impl SessionManagerListener for SessionLifecycleTracker {
    fn on_session_starting(&mut self, session: &Session) {
        log::debug!("Session starting: {}", session.id);
    }

    fn on_session_started(&mut self, session: Session) {
        if !self.listening("started", &session) {
            return;
        }
        log::debug!("Session started: {}", session.id);
        let session_id = session.id.to_string();
        // Open failures are logged by the channel manager.
        let _ = self.channels.start_session(session);
        self.publish(CastEvent::Connected { session_id });
    }

    fn on_session_start_failed(&mut self, session: &Session, error: i32) {
        log::debug!("Session start failed: {} (error {})", session.id, error);
    }

    fn on_session_ending(&mut self, session: &Session) {
        log::debug!("Session ending: {}", session.id);
    }

    fn on_session_ended(&mut self, session: &Session, error: i32) {
        if !self.listening("ended", session) {
            return;
        }
        log::debug!("Session ended: {} (error {})", session.id, error);
        if self.channels.end_session(&session.id) {
            self.publish(CastEvent::Disconnected {
                session_id: session.id.to_string(),
            });
        } else {
            log::debug!("Ignoring end of stale session {}", session.id);
        }
    }

    fn on_session_suspended(&mut self, session: &Session, reason: i32) {
        log::debug!("Session suspended: {} (reason {})", session.id, reason);
    }

    fn on_session_resuming(&mut self, session: &Session) {
        log::debug!("Session resuming: {}", session.id);
    }

    fn on_session_resumed(&mut self, session: Session, was_suspended: bool) {
        if !self.listening("resumed", &session) {
            return;
        }
        log::debug!(
            "Session resumed: {} (was suspended: {})",
            session.id,
            was_suspended
        );
        let session_id = session.id.to_string();
        self.channels.resume_session(session);
        self.publish(CastEvent::Connected { session_id });
    }

    fn on_session_resume_failed(&mut self, session: &Session, error: i32) {
        log::debug!("Session resume failed: {} (error {})", session.id, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelNamespace;
    use crate::event_bus::{SESSION_CONNECTED, SESSION_DISCONNECTED};
    use crate::transport::LoopbackTransport;

    fn tracker() -> SessionLifecycleTracker {
        SessionLifecycleTracker::new(MessageChannelManager::new(
            ChannelNamespace::new("cast_namespace").unwrap(),
        ))
    }

    fn session(id: &str) -> (Session, Arc<LoopbackTransport>) {
        let transport = Arc::new(LoopbackTransport::new());
        (Session::new(id, transport.clone()), transport)
    }

    struct FixedSource(Option<Session>);

    impl SessionSource for FixedSource {
        fn current_session(&self) -> Option<Session> {
            self.0.clone()
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn started_records_session_and_opens_channel() {
            let mut tracker = tracker();
            let (s1, transport) = session("s1");
            tracker.on_session_started(s1);

            assert_eq!(tracker.current_session_id(), Some(&SessionId::from("s1")));
            assert_eq!(tracker.state(), ChannelState::SessionWithChannel);
            assert_eq!(transport.register_count(), 1);
        }

        #[test]
        fn matching_end_clears_session() {
            let mut tracker = tracker();
            let (s1, _transport) = session("s1");
            tracker.on_session_started(s1.clone());
            tracker.on_session_ended(&s1, 0);

            assert!(tracker.current_session().is_none());
            assert_eq!(tracker.state(), ChannelState::NoSession);
        }

        #[test]
        fn end_matches_by_id_not_handle() {
            let mut tracker = tracker();
            let (s1, _transport) = session("s1");
            let (rebuilt, _other) = session("s1");
            tracker.on_session_started(s1);
            tracker.on_session_ended(&rebuilt, 0);

            assert_eq!(tracker.state(), ChannelState::NoSession);
        }

        #[test]
        fn stale_end_is_ignored() {
            let mut tracker = tracker();
            let (s1, _t1) = session("s1");
            let (s2, _t2) = session("s2");
            tracker.on_session_started(s1);
            tracker.on_session_ended(&s2, 0);

            assert_eq!(tracker.current_session_id(), Some(&SessionId::from("s1")));
            assert_eq!(tracker.state(), ChannelState::SessionWithChannel);
            assert_eq!(tracker.send_message("x"), SendOutcome::Delivered);
        }

        #[test]
        fn end_without_session_is_ignored() {
            let mut tracker = tracker();
            let (s1, _transport) = session("s1");
            tracker.on_session_ended(&s1, 0);
            assert_eq!(tracker.state(), ChannelState::NoSession);
        }

        #[test]
        fn resumed_records_session_without_channel() {
            let mut tracker = tracker();
            let (s1, transport) = session("s1");
            tracker.on_session_resumed(s1, true);

            assert_eq!(tracker.current_session_id(), Some(&SessionId::from("s1")));
            assert_eq!(tracker.state(), ChannelState::SessionNoChannel);
            assert_eq!(transport.register_count(), 0);
            assert_eq!(tracker.send_message("x"), SendOutcome::Unsendable);
        }

        #[test]
        fn start_failure_leaves_session_unset() {
            let mut tracker = tracker();
            let (s1, _transport) = session("s1");
            tracker.on_session_start_failed(&s1, 2005);
            assert!(tracker.current_session().is_none());
        }

        #[test]
        fn inert_callbacks_change_nothing() {
            let mut tracker = tracker();
            let (s1, _transport) = session("s1");
            tracker.on_session_started(s1.clone());

            tracker.on_session_starting(&s1);
            tracker.on_session_ending(&s1);
            tracker.on_session_suspended(&s1, 1);
            tracker.on_session_resuming(&s1);
            tracker.on_session_resume_failed(&s1, 1);

            assert_eq!(tracker.state(), ChannelState::SessionWithChannel);
        }

        #[test]
        fn handle_dispatches_events() {
            let mut tracker = tracker();
            let (s1, _transport) = session("s1");
            tracker.handle(SessionEvent::Started(s1.clone()));
            assert_eq!(tracker.state(), ChannelState::SessionWithChannel);

            tracker.handle(SessionEvent::Ended {
                session: s1,
                error: 0,
            });
            assert_eq!(tracker.state(), ChannelState::NoSession);
        }

        #[test]
        fn failed_open_keeps_session() {
            let mut tracker = tracker();
            let (s1, transport) = session("s1");
            transport.set_fail_register(true);
            tracker.on_session_started(s1);

            assert_eq!(tracker.state(), ChannelState::SessionNoChannel);
            assert_eq!(tracker.send_message("x"), SendOutcome::Unsendable);
        }
    }

    mod host_lifecycle {
        use super::*;

        #[test]
        fn detached_tracker_ignores_events() {
            let mut tracker = tracker();
            let (s1, _transport) = session("s1");
            tracker.detach();
            assert!(!tracker.is_attached());

            tracker.on_session_started(s1);
            assert_eq!(tracker.state(), ChannelState::NoSession);
        }

        #[test]
        fn detach_keeps_current_session() {
            let mut tracker = tracker();
            let (s1, _transport) = session("s1");
            tracker.on_session_started(s1.clone());
            tracker.detach();
            tracker.on_session_ended(&s1, 0);

            assert_eq!(tracker.state(), ChannelState::SessionWithChannel);
        }

        #[test]
        fn attach_adopts_connected_session() {
            let mut tracker = tracker();
            let (s1, transport) = session("s1");
            tracker.detach();
            tracker.attach(&FixedSource(Some(s1)));

            assert!(tracker.is_attached());
            assert_eq!(tracker.current_session_id(), Some(&SessionId::from("s1")));
            assert_eq!(tracker.state(), ChannelState::SessionNoChannel);
            assert_eq!(transport.register_count(), 0);
        }

        #[test]
        fn attach_keeps_existing_session() {
            let mut tracker = tracker();
            let (s1, _t1) = session("s1");
            let (s2, _t2) = session("s2");
            tracker.on_session_started(s1);
            tracker.attach(&FixedSource(Some(s2)));

            assert_eq!(tracker.current_session_id(), Some(&SessionId::from("s1")));
            assert_eq!(tracker.state(), ChannelState::SessionWithChannel);
        }

        #[test]
        fn attach_with_nothing_connected() {
            let mut tracker = tracker();
            tracker.attach(&FixedSource(None));
            assert!(tracker.current_session().is_none());
        }

        #[test]
        fn teardown_closes_channel() {
            let mut tracker = tracker();
            let (s1, transport) = session("s1");
            tracker.on_session_started(s1);
            tracker.teardown();

            assert_eq!(tracker.state(), ChannelState::NoSession);
            assert!(!transport.is_registered(&ChannelNamespace::new("cast_namespace").unwrap()));
        }
    }

    mod signals {
        use super::*;

        use crate::event_bus::BroadcastEvent;
        use tokio::sync::broadcast::Receiver;

        fn drain(rx: &mut Receiver<BroadcastEvent>) -> Vec<String> {
            let mut types = Vec::new();
            while let Ok(event) = rx.try_recv() {
                types.push(event.event_type);
            }
            types
        }

        #[test]
        fn start_and_end_emit_connection_signals() {
            let bus = Arc::new(EventBus::new());
            let mut rx = bus.subscribe();
            let mut tracker = tracker().with_event_bus(bus);
            let (s1, _transport) = session("s1");

            tracker.on_session_started(s1.clone());
            tracker.on_session_ended(&s1, 0);

            assert_eq!(drain(&mut rx), vec![SESSION_CONNECTED, SESSION_DISCONNECTED]);
        }

        #[test]
        fn stale_end_emits_nothing() {
            let bus = Arc::new(EventBus::new());
            let mut rx = bus.subscribe();
            let mut tracker = tracker().with_event_bus(bus);
            let (s2, _transport) = session("s2");

            tracker.on_session_ended(&s2, 0);
            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn resume_emits_connected() {
            let bus = Arc::new(EventBus::new());
            let mut rx = bus.subscribe();
            let mut tracker = tracker().with_event_bus(bus);
            let (s1, _transport) = session("s1");

            tracker.on_session_resumed(s1, false);
            assert_eq!(drain(&mut rx), vec![SESSION_CONNECTED]);
        }
    }
}
