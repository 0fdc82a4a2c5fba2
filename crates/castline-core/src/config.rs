//! Castline configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! default.
//!
//! ```json
//! {
//!   "namespace": "urn:x-cast:com.google.cast.sample.helloworld",
//!   "log_dir": "/tmp/castline",
//!   "event_capacity": 256
//! }
//! ```

use crate::channel::ChannelNamespace;
use crate::event_bus::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastConfig {
    /// Namespace the message channel is opened on.
    pub namespace: ChannelNamespace,

    /// Directory for per-session transcripts. No transcripts when unset.
    pub log_dir: Option<PathBuf>,

    /// Buffered events per subscriber before it starts lagging.
    pub event_capacity: usize,
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            namespace: ChannelNamespace::hello_world(),
            log_dir: None,
            event_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CastConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_namespace(mut self, namespace: ChannelNamespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}
