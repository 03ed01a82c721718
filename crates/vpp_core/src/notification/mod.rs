//! Run notifications.
//!
//! [`error_notification`] turns a failure into a request; delivery goes
//! through a [`Notifier`](crate::collaborators::Notifier), which never
//! fails the run.

mod email;

use serde::{Deserialize, Serialize};

pub use email::{EmailNotifier, NotifyError};

/// A request to tell someone the pipeline failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotification {
    pub subject: String,
    pub message: String,
    pub stage: String,
}

/// Build the failure notification for `message` attributed to `stage`.
pub fn error_notification(message: &str, stage: &str) -> ErrorNotification {
    ErrorNotification {
        subject: format!("Video Pipeline Failed at {}", stage),
        message: message.to_string(),
        stage: stage.to_string(),
    }
}

/// Subject line of the success notification.
pub fn success_subject(title: &str) -> String {
    let title = if title.trim().is_empty() {
        "Untitled"
    } else {
        title
    };
    format!("Video Published: {}", title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_notification_names_stage() {
        let notification = error_notification("disk full", "audio_production");
        assert_eq!(notification.subject, "Video Pipeline Failed at audio_production");
        assert_eq!(notification.message, "disk full");
        assert_eq!(notification.stage, "audio_production");
    }

    #[test]
    fn error_notification_is_deterministic() {
        assert_eq!(
            error_notification("boom", "unknown"),
            error_notification("boom", "unknown")
        );
    }

    #[test]
    fn success_subject_uses_title() {
        assert_eq!(success_subject("Rust 101"), "Video Published: Rust 101");
        assert_eq!(success_subject(""), "Video Published: Untitled");
    }
}
