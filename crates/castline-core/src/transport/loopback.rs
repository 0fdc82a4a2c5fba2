//! In-memory transport.
//!
//! Stands in for a real receiver connection in tests and in the daemon.
//! With echo enabled it behaves like the hello-world receiver, which
//! replies on the same namespace with whatever text it was sent.

use super::{MessageReceiver, SessionTransport, TransportError};
use crate::channel::ChannelNamespace;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A message handed to [`LoopbackTransport::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub namespace: ChannelNamespace,
    pub text: String,
}

#[derive(Default)]
pub struct LoopbackTransport {
    receivers: Mutex<HashMap<ChannelNamespace, Arc<dyn MessageReceiver>>>,
    sent: Mutex<Vec<SentMessage>>,
    register_calls: Mutex<usize>,
    echo: AtomicBool,
    disconnected: AtomicBool,
    fail_register: AtomicBool,
    fail_unregister: AtomicBool,
    fail_send: AtomicBool,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reflect every sent message back to the receiver registered on its namespace.
    pub fn with_echo(self) -> Self {
        self.echo.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_fail_register(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_unregister(&self, fail: bool) {
        self.fail_unregister.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    pub fn set_connected(&self, connected: bool) {
        self.disconnected.store(!connected, Ordering::SeqCst);
    }

    /// Messages passed to `send`, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful `register_channel` calls so far.
    pub fn register_count(&self) -> usize {
        *self
            .register_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_registered(&self, namespace: &ChannelNamespace) -> bool {
        self.receivers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(namespace)
    }

    /// Deliver an inbound message as if the receiver application had sent it.
    ///
    /// Returns false when nothing is registered on `namespace`.
    pub fn deliver(&self, namespace: &ChannelNamespace, message: &str) -> bool {
        // Clone the receiver out so the callback runs without the map locked.
        let receiver = self
            .receivers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .cloned();
        match receiver {
            Some(receiver) => {
                receiver.on_message_received(namespace, message);
                true
            }
            None => false,
        }
    }
}

impl SessionTransport for LoopbackTransport {
    fn register_channel(
        &self,
        namespace: &ChannelNamespace,
        receiver: Arc<dyn MessageReceiver>,
    ) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(TransportError::Io("register rejected".to_string()));
        }
        let mut receivers = self
            .receivers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if receivers.contains_key(namespace) {
            return Err(TransportError::AlreadyRegistered(namespace.clone()));
        }
        receivers.insert(namespace.clone(), receiver);
        *self
            .register_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn unregister_channel(&self, namespace: &ChannelNamespace) -> Result<(), TransportError> {
        if self.fail_unregister.load(Ordering::SeqCst) {
            return Err(TransportError::Io("unregister rejected".to_string()));
        }
        self.receivers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(namespace)
            .map(|_| ())
            .ok_or_else(|| TransportError::NotRegistered(namespace.clone()))
    }

    fn send(&self, namespace: &ChannelNamespace, message: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(TransportError::Io("send rejected".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentMessage {
                namespace: namespace.clone(),
                text: message.to_string(),
            });
        if self.echo.load(Ordering::SeqCst) {
            self.deliver(namespace, message);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::SeqCst)
    }
}
