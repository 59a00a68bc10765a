// User-facing status and diagnostics collaborators
// The notifier is a nullable injection point; the error log keeps a bounded
// in-memory trail of recent failures for debugging

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

// Sink for user-visible status messages (a toast layer, a status bar, ...)
pub trait Notify: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

// Default collaborator: forwards notifications to the log stream
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success | Severity::Info => info!("{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Error => error!("{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEntry {
    pub context: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

// Bounded diagnostics log, newest entries first
#[derive(Debug)]
pub struct ErrorLog {
    entries: Mutex<VecDeque<ErrorEntry>>,
    capacity: usize,
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::with_capacity(10)
    }
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, context: &str, message: &str) {
        let mut entries = self.entries.lock();
        entries.push_front(ErrorEntry {
            context: context.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        });
        entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
