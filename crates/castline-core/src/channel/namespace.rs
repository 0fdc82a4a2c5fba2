//! Channel namespaces.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Longest namespace a receiver accepts for a custom channel.
pub const MAX_NAMESPACE_LEN: usize = 128;

/// Namespace used by the hello-world receiver application.
pub const HELLO_WORLD_NAMESPACE: &str = "urn:x-cast:com.google.cast.sample.helloworld";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("Channel namespace cannot be empty")]
    Empty,

    #[error("Channel namespace is {len} characters, limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Stable name of a logical message channel on a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChannelNamespace(String);

impl ChannelNamespace {
    pub fn new(name: impl Into<String>) -> Result<Self, NamespaceError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(NamespaceError::Empty);
        }
        let len = name.chars().count();
        if len > MAX_NAMESPACE_LEN {
            return Err(NamespaceError::TooLong {
                len,
                max: MAX_NAMESPACE_LEN,
            });
        }
        Ok(Self(name))
    }

    pub fn hello_world() -> Self {
        Self(HELLO_WORLD_NAMESPACE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChannelNamespace {
    fn default() -> Self {
        Self::hello_world()
    }
}

impl std::fmt::Display for ChannelNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ChannelNamespace {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ChannelNamespace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_name() {
        let ns = ChannelNamespace::new("cast_namespace").unwrap();
        assert_eq!(ns.as_str(), "cast_namespace");
        assert_eq!(ns.to_string(), "cast_namespace");
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(ChannelNamespace::new(""), Err(NamespaceError::Empty));
        assert_eq!(ChannelNamespace::new("   "), Err(NamespaceError::Empty));
    }

    #[test]
    fn rejects_overlong_name() {
        let long = "x".repeat(MAX_NAMESPACE_LEN + 1);
        assert_eq!(
            ChannelNamespace::new(long),
            Err(NamespaceError::TooLong {
                len: MAX_NAMESPACE_LEN + 1,
                max: MAX_NAMESPACE_LEN
            })
        );
        assert!(ChannelNamespace::new("x".repeat(MAX_NAMESPACE_LEN)).is_ok());
    }

    #[test]
    fn default_is_hello_world() {
        assert_eq!(ChannelNamespace::default().as_str(), HELLO_WORLD_NAMESPACE);
    }

    #[test]
    fn deserialize_validates() {
        let ns: ChannelNamespace = serde_json::from_str("\"urn:x-cast:demo\"").unwrap();
        assert_eq!(ns.as_str(), "urn:x-cast:demo");
        assert!(serde_json::from_str::<ChannelNamespace>("\"\"").is_err());
    }
}
