//! Completion notifications.
//!
//! The application reports the end of every export through a [`Notifier`].
//! [`LogNotifier`] writes to the log; other transports plug in by
//! implementing the trait.

use std::path::PathBuf;
#[cfg(test)]
use std::sync::Mutex;

/// Outcome of an export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Rows were exported.
    Success {
        /// Number of rows written
        file_count: usize,
        /// Export destination
        output: PathBuf,
    },
    /// The run failed.
    Failure {
        /// Human-readable reason
        message: String,
    },
}

impl Notification {
    /// One-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Notification::Success { file_count, output } => {
                format!("Exported {} files to {}", file_count, output.display())
            }
            Notification::Failure { message } => format!("Export failed: {message}"),
        }
    }
}

/// Receives run outcomes.
pub trait Notifier: Send + Sync {
    /// Deliver `notification`. Delivery problems are the notifier's to log.
    fn notify(&self, notification: &Notification);
}

/// Notifier that writes to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::Success { .. } => log::info!("{}", notification.summary()),
            Notification::Failure { .. } => log::error!("{}", notification.summary()),
        }
    }
}

/// Notifier that keeps every notification, for inspection.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

#[cfg(test)]
impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far.
    #[must_use]
    pub fn received(&self) -> Vec<Notification> {
        self.received.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.received.lock().unwrap().push(notification.clone());
    }
}
