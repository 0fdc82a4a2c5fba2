//! CastContext - the shared entry point hosts talk to.
//!
//! Lifecycle callbacks, sends, and host lifecycle hooks may arrive from more
//! than one thread in a real host. `CastContext` serializes all of them
//! through a single lock around the [`SessionLifecycleTracker`], so open,
//! close and send never interleave.
//!
//! ```text
//!   session manager ──events──▶ ┌──────────────────────────┐
//!                               │        CastContext       │
//!   input source ──transcript─▶ │  Mutex<LifecycleTracker> │ ──▶ transport
//!                               │  EventBus · Fallback     │
//!                               └────────────┬─────────────┘
//!                                            ▼
//!                                  subscribers / fallback
//! ```

use crate::channel::{ChannelError, ChannelOpen, ChannelState, MessageChannelManager, SendOutcome};
use crate::config::CastConfig;
use crate::event_bus::{CastEvent, EventBus};
use crate::fallback::{FallbackDisplay, LogFallback};
use crate::input::{select_transcript, TextInputSource};
use crate::logging::{self, log_line, open_log_file, LogHandle};
use crate::session::{SessionEvent, SessionId, SessionLifecycleTracker, SessionSource};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Log id of the transcript that records fallback presentations.
const LOCAL_LOG_ID: &str = "local";

#[derive(Default)]
pub struct CastContextBuilder {
    config: Option<CastConfig>,
    event_bus: Option<Arc<EventBus>>,
    fallback: Option<Arc<dyn FallbackDisplay>>,
}

impl CastContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: CastConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing EventBus (for testing or custom configurations).
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Surface for messages that could not be sent. Defaults to the logger.
    pub fn fallback(mut self, fallback: Arc<dyn FallbackDisplay>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn build(self) -> CastContext {
        let config = self.config.unwrap_or_default();
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| Arc::new(EventBus::with_capacity(config.event_capacity)));
        let fallback = self
            .fallback
            .unwrap_or_else(|| Arc::new(LogFallback) as Arc<dyn FallbackDisplay>);

        let mut channels =
            MessageChannelManager::new(config.namespace.clone()).with_event_bus(Arc::clone(&event_bus));
        if let Some(dir) = &config.log_dir {
            channels = channels.with_log_dir(dir.clone());
        }
        let tracker = SessionLifecycleTracker::new(channels).with_event_bus(Arc::clone(&event_bus));
        let local_log = match &config.log_dir {
            Some(dir) => open_log_file(Some(dir.as_path()), LOCAL_LOG_ID),
            None => logging::disabled(),
        };

        CastContext {
            tracker: Arc::new(Mutex::new(tracker)),
            event_bus,
            fallback,
            local_log,
            config: Arc::new(config),
        }
    }
}

/// Shared handle to the session tracker, channel manager, and their
/// observers. Cloning is cheap and every clone drives the same state.
#[derive(Clone)]
pub struct CastContext {
    tracker: Arc<Mutex<SessionLifecycleTracker>>,
    /// Signals for UI affordances and logging.
    pub event_bus: Arc<EventBus>,
    fallback: Arc<dyn FallbackDisplay>,
    local_log: LogHandle,
    config: Arc<CastConfig>,
}

impl CastContext {
    pub fn builder() -> CastContextBuilder {
        CastContextBuilder::new()
    }

    pub fn config(&self) -> &CastConfig {
        &self.config
    }

    /// Apply a session lifecycle notification.
    pub fn dispatch(&self, event: SessionEvent) {
        log::trace!("Lifecycle event {} for {}", event.name(), event.session_id());
        self.lock().handle(event);
    }

    /// Send `text` to the receiver, or show it locally if no channel is open.
    pub fn send_message(&self, text: &str) -> SendOutcome {
        let outcome = self.lock().send_message(text);
        if outcome == SendOutcome::Unsendable {
            self.show_locally(text);
        }
        outcome
    }

    /// Send the best match of a recognition result.
    ///
    /// Returns `None` when there was nothing to send.
    pub fn send_transcript<S: AsRef<str>>(&self, matches: &[S]) -> Option<SendOutcome> {
        select_transcript(matches).map(|text| self.send_message(text))
    }

    /// Capture one transcript from `source` and send it.
    pub fn capture_and_send(&self, source: &mut dyn TextInputSource) -> Option<SendOutcome> {
        let text = source.capture()?;
        self.send_transcript(&[text])
    }

    /// Ask for a channel on the current session, e.g. after a resume or a
    /// failed open. Never retried on its own.
    pub fn reopen_channel(&self) -> Result<ChannelOpen, ChannelError> {
        self.lock().channels_mut().open_channel()
    }

    pub fn state(&self) -> ChannelState {
        self.lock().state()
    }

    pub fn current_session_id(&self) -> Option<SessionId> {
        self.lock().current_session_id().cloned()
    }

    /// Host came to the foreground: listen again and pick up a connected session.
    pub fn attach(&self, source: &dyn SessionSource) {
        self.lock().attach(source);
    }

    /// Host went to the background: stop listening to lifecycle callbacks.
    pub fn detach(&self) {
        self.lock().detach();
    }

    /// Host is going away: close the channel and drop the session.
    pub fn teardown(&self) {
        self.lock().teardown();
    }

    fn show_locally(&self, text: &str) {
        self.fallback.show(text);
        log_line(&self.local_log, logging::LOCAL, text);
        self.event_bus.publish(&CastEvent::Fallback {
            text: text.to_string(),
        });
    }

    fn lock(&self) -> MutexGuard<'_, SessionLifecycleTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CastContext {
    fn default() -> Self {
        Self::builder().build()
    }
}
