//! Simulated session manager.
//!
//! Stands in for the SDK side of a real host: it owns one loopback
//! transport per session id, remembers which session is connected, and
//! turns console commands into lifecycle callbacks on the [`CastContext`].

use crate::commands::{Command, HELP};
use castline_core::session::SessionSource;
use castline_core::transport::LoopbackTransport;
use castline_core::{CastContext, SendOutcome, Session, SessionEvent};
use std::collections::HashMap;
use std::sync::Arc;

/// Error code reported with simulated start failures.
const SIMULATED_START_ERROR: i32 = 2005;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Host {
    echo: bool,
    transports: HashMap<String, Arc<LoopbackTransport>>,
    connected: Option<Session>,
}

impl Host {
    pub fn new(echo: bool) -> Self {
        Self {
            echo,
            transports: HashMap::new(),
            connected: None,
        }
    }

    pub fn transport(&self, id: &str) -> Option<Arc<LoopbackTransport>> {
        self.transports.get(id).cloned()
    }

    pub fn apply(&mut self, ctx: &CastContext, command: Command) -> Flow {
        match command {
            Command::Start(id) => {
                let session = self.session(&id);
                self.connected = Some(session.clone());
                ctx.dispatch(SessionEvent::Starting(session.clone()));
                ctx.dispatch(SessionEvent::Started(session));
            }
            Command::StartFailed(id) => {
                let session = self.session(&id);
                ctx.dispatch(SessionEvent::StartFailed {
                    session,
                    error: SIMULATED_START_ERROR,
                });
            }
            Command::End(id) => {
                let session = self.session(&id);
                if self.connected.as_ref().is_some_and(|c| c.same_as(&session)) {
                    self.connected = None;
                }
                ctx.dispatch(SessionEvent::Ending(session.clone()));
                ctx.dispatch(SessionEvent::Ended {
                    session,
                    error: 0,
                });
                if let Some(transport) = self.transports.remove(&id) {
                    transport.set_connected(false);
                }
            }
            Command::Suspend(id) => {
                let session = self.session(&id);
                ctx.dispatch(SessionEvent::Suspended { session, reason: 0 });
            }
            Command::Resume(id) => {
                let session = self.session(&id);
                self.connected = Some(session.clone());
                ctx.dispatch(SessionEvent::Resuming(session.clone()));
                ctx.dispatch(SessionEvent::Resumed {
                    session,
                    was_suspended: true,
                });
            }
            Command::Receive(text) => self.receive(ctx, &text),
            Command::Reopen => match ctx.reopen_channel() {
                Ok(open) => println!("channel: {:?}", open),
                Err(e) => println!("channel: {}", e),
            },
            Command::Status => {
                let session = ctx
                    .current_session_id()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("session: {} | {}", session, ctx.state());
            }
            Command::Pause => ctx.detach(),
            Command::Foreground => ctx.attach(&*self),
            Command::Help => println!("{}", HELP),
            Command::Quit => return Flow::Quit,
            Command::Transcript(text) => {
                if ctx.send_message(&text) == SendOutcome::Delivered {
                    log::debug!("Sent to receiver: {}", text);
                }
            }
        }
        Flow::Continue
    }

    fn session(&mut self, id: &str) -> Session {
        let echo = self.echo;
        let transport = self
            .transports
            .entry(id.to_string())
            .or_insert_with(|| {
                let transport = LoopbackTransport::new();
                Arc::new(if echo { transport.with_echo() } else { transport })
            })
            .clone();
        Session::new(id, transport)
    }

    fn receive(&self, ctx: &CastContext, text: &str) {
        let transport = ctx
            .current_session_id()
            .and_then(|id| self.transports.get(&id.0));
        let delivered = transport.is_some_and(|t| t.deliver(&ctx.config().namespace, text));
        if !delivered {
            println!("no channel open to receive on");
        }
    }
}

impl SessionSource for Host {
    fn current_session(&self) -> Option<Session> {
        self.connected.clone()
    }
}
