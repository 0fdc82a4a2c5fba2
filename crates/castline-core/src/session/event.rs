//! Session lifecycle notifications.

use super::state::{Session, SessionId};

/// The callbacks a host's session manager invokes as a session progresses.
///
/// Only start, end and resume carry state; the rest default to no-ops.
pub trait SessionManagerListener {
    fn on_session_starting(&mut self, _session: &Session) {}

    fn on_session_started(&mut self, session: Session);

    fn on_session_start_failed(&mut self, _session: &Session, _error: i32) {}

    fn on_session_ending(&mut self, _session: &Session) {}

    fn on_session_ended(&mut self, session: &Session, error: i32);

    fn on_session_suspended(&mut self, _session: &Session, _reason: i32) {}

    fn on_session_resuming(&mut self, _session: &Session) {}

    fn on_session_resumed(&mut self, session: Session, was_suspended: bool);

    fn on_session_resume_failed(&mut self, _session: &Session, _error: i32) {}
}

/// Host-side query for whatever session is already connected.
pub trait SessionSource {
    fn current_session(&self) -> Option<Session>;
}

/// A lifecycle notification as a value, for hosts that queue events.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Starting(Session),
    Started(Session),
    StartFailed { session: Session, error: i32 },
    Ending(Session),
    Ended { session: Session, error: i32 },
    Suspended { session: Session, reason: i32 },
    Resuming(Session),
    Resumed { session: Session, was_suspended: bool },
    ResumeFailed { session: Session, error: i32 },
}

impl SessionEvent {
    pub fn session(&self) -> &Session {
        match self {
            Self::Starting(session)
            | Self::Started(session)
            | Self::Ending(session)
            | Self::Resuming(session) => session,
            Self::StartFailed { session, .. }
            | Self::Ended { session, .. }
            | Self::Suspended { session, .. }
            | Self::Resumed { session, .. }
            | Self::ResumeFailed { session, .. } => session,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session().id
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Starting(_) => "starting",
            Self::Started(_) => "started",
            Self::StartFailed { .. } => "start-failed",
            Self::Ending(_) => "ending",
            Self::Ended { .. } => "ended",
            Self::Suspended { .. } => "suspended",
            Self::Resuming(_) => "resuming",
            Self::Resumed { .. } => "resumed",
            Self::ResumeFailed { .. } => "resume-failed",
        }
    }

    /// Invoke the matching callback on `listener`.
    pub fn deliver_to<L: SessionManagerListener + ?Sized>(self, listener: &mut L) {
        match self {
            Self::Starting(session) => listener.on_session_starting(&session),
            Self::Started(session) => listener.on_session_started(session),
            Self::StartFailed { session, error } => {
                listener.on_session_start_failed(&session, error)
            }
            Self::Ending(session) => listener.on_session_ending(&session),
            Self::Ended { session, error } => listener.on_session_ended(&session, error),
            Self::Suspended { session, reason } => {
                listener.on_session_suspended(&session, reason)
            }
            Self::Resuming(session) => listener.on_session_resuming(&session),
            Self::Resumed {
                session,
                was_suspended,
            } => listener.on_session_resumed(session, was_suspended),
            Self::ResumeFailed { session, error } => {
                listener.on_session_resume_failed(&session, error)
            }
        }
    }
}
