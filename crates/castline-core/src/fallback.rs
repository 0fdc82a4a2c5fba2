//! Local presentation of messages that could not be sent.

use std::sync::{Mutex, PoisonError};

/// A transient, local-only surface (a toast, a status line) for text that
/// had no open channel to go to.
pub trait FallbackDisplay: Send + Sync {
    fn show(&self, text: &str);
}

/// Shows fallback text through the logger.
#[derive(Debug, Default)]
pub struct LogFallback;

impl FallbackDisplay for LogFallback {
    fn show(&self, text: &str) {
        log::info!("Not connected, showing locally: {}", text);
    }
}

/// Keeps every shown text; useful for previews and host tests.
#[derive(Debug, Default)]
pub struct RecordingFallback {
    shown: Mutex<Vec<String>>,
}

impl RecordingFallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FallbackDisplay for RecordingFallback {
    fn show(&self, text: &str) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_fallback_keeps_order() {
        let fallback = RecordingFallback::new();
        fallback.show("one");
        fallback.show("two");
        assert_eq!(fallback.shown(), vec!["one", "two"]);
    }

    #[test]
    fn log_fallback_does_not_panic() {
        LogFallback.show("hello");
    }
}
