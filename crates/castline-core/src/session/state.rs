//! Session identity and handle.

use crate::transport::SessionTransport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A connected session as handed over by the host's session manager.
///
/// The transport is owned by the host; this is a shared, non-owning view
/// of it. Two handles denote the same session when their ids match, even if
/// the host rebuilt the underlying object.
#[derive(Clone)]
pub struct Session {
    pub id: SessionId,
    transport: Arc<dyn SessionTransport>,
}

impl Session {
    pub fn new(id: impl Into<SessionId>, transport: Arc<dyn SessionTransport>) -> Self {
        Self {
            id: id.into(),
            transport,
        }
    }

    pub fn transport(&self) -> &dyn SessionTransport {
        self.transport.as_ref()
    }

    pub fn same_as(&self, other: &Session) -> bool {
        self.id == other.id
    }

    /// Whether both handles talk to the same transport object.
    pub fn shares_transport(&self, other: &Session) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.transport), Arc::as_ptr(&other.transport))
    }

    pub fn is_live(&self) -> bool {
        self.transport.is_connected()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish()
    }
}
