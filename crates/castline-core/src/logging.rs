//! Per-session transcript files.
//!
//! Every message sent, received, or shown locally can be appended to a
//! `{log_dir}/{log_id}.log` file with a UTC timestamp. Without a log
//! directory the handle is empty and writes are dropped.
//!
//! Log ids come from the host (session ids) and are reduced to a safe file
//! stem first, so a file never lands outside `log_dir`.

use chrono::{SecondsFormat, Utc};
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

/// Outbound message handed to the transport.
pub const SEND: &str = "SEND";
/// Inbound message from the receiver application.
pub const RECV: &str = "RECV";
/// Message presented on the fallback display.
pub const LOCAL: &str = "LOCAL";
/// Outbound message the transport refused.
pub const SEND_FAILED: &str = "SEND FAILED";

/// Thread-safe handle to an append-only log file.
pub type LogHandle = Arc<Mutex<Option<File>>>;

/// A handle that discards every line.
pub fn disabled() -> LogHandle {
    Arc::new(Mutex::new(None))
}

/// Write a timestamped line to the log file (if present).
pub fn log_line(handle: &LogHandle, direction: &str, data: &str) {
    if let Ok(mut guard) = handle.lock() {
        if let Some(ref mut file) = *guard {
            let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            if let Err(e) = writeln!(file, "[{}] {}: {}", ts, direction, data) {
                log::warn!("Failed to write transcript line: {}", e);
                return;
            }
            let _ = file.flush();
        }
    }
}

/// File stem for `log_id`: ASCII alphanumerics, `-` and `_` are kept, every
/// other character (path separators and dots included) becomes `_`.
pub fn log_file_stem(log_id: &str) -> String {
    let stem: String = log_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}

/// Open (or create) a log file at `{log_dir}/{stem}.log` and return a shared
/// handle, where `stem` is [`log_file_stem`] of `log_id`.
pub fn open_log_file(log_dir: Option<&Path>, log_id: &str) -> LogHandle {
    let file = log_dir.and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            log::warn!("Cannot create log dir {}: {}", dir.display(), e);
            return None;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{}.log", log_file_stem(log_id))))
            .map_err(|e| log::warn!("Cannot open transcript for {}: {}", log_id, e))
            .ok()
    });
    Arc::new(Mutex::new(file))
}
