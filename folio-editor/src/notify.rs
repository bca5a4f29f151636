//! User-facing notifications.
//!
//! Fire-and-forget: a sink never blocks the controller and never reports
//! back whether the notification was shown.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational ("Changes saved")
    Success,
    /// Destructive ("Error saving changes")
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn saved() -> Self {
        Self::success("Changes saved", "Your content has been saved successfully.")
    }

    pub fn save_failed() -> Self {
        Self::error("Error saving changes", "There was a problem saving your content.")
    }

    pub fn deleted() -> Self {
        Self::success("Block deleted", "The block has been removed successfully.")
    }

    pub fn delete_failed() -> Self {
        Self::error("Error deleting block", "There was a problem deleting the block.")
    }

    pub fn load_failed() -> Self {
        Self::error("Error loading content", "There was a problem loading your content.")
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => {
                log::info!("{}: {}", notification.title, notification.description)
            }
            Severity::Error => {
                log::error!("{}: {}", notification.title, notification.description)
            }
        }
    }
}

/// Forwards notifications to a channel, typically drained by the UI thread.
///
/// When the channel is full or the receiver is gone the notification is
/// dropped.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver the UI drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            log::debug!("Dropped notification: {e}");
        }
    }
}
