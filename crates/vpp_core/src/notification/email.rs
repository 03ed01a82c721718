//! SMTP delivery with `lettre`.

use chrono::Local;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use super::{success_subject, ErrorNotification};
use crate::collaborators::Notifier;
use crate::config::EmailSettings;
use crate::models::{MetadataPayload, PublishResult};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Email configuration incomplete: set {0}")]
    MissingCredential(String),

    #[error("Invalid address {address}: {message}")]
    Address { address: String, message: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

pub struct EmailNotifier {
    smtp_server: String,
    smtp_port: u16,
    sender: String,
    password: String,
    recipient: String,
    channel_name: String,
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl EmailNotifier {
    /// Resolve sender, password and recipient from the configured
    /// variables. The recipient defaults to the sender.
    pub fn from_settings(settings: &EmailSettings, channel_name: &str) -> Result<Self, NotifyError> {
        let sender = read_env(&settings.sender_env)
            .ok_or_else(|| NotifyError::MissingCredential(settings.sender_env.clone()))?;
        let password = read_env(&settings.password_env)
            .ok_or_else(|| NotifyError::MissingCredential(settings.password_env.clone()))?;
        let recipient = read_env(&settings.recipient_env).unwrap_or_else(|| sender.clone());

        Ok(Self {
            smtp_server: settings.smtp_server.clone(),
            smtp_port: settings.smtp_port,
            sender,
            password,
            recipient,
            channel_name: channel_name.to_string(),
        })
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
        address.parse().map_err(|e: lettre::address::AddressError| NotifyError::Address {
            address: address.to_string(),
            message: e.to_string(),
        })
    }

    fn send(&self, subject: &str, html: String) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(Self::mailbox(&self.sender)?)
            .to(Self::mailbox(&self.recipient)?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        let mailer = SmtpTransport::starttls_relay(&self.smtp_server)
            .map_err(|e| NotifyError::Smtp(e.to_string()))?
            .port(self.smtp_port)
            .credentials(Credentials::new(self.sender.clone(), self.password.clone()))
            .build();

        mailer
            .send(&message)
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;
        Ok(())
    }

    /// Send and report delivery as a bool, logging the reason on failure.
    fn deliver(&self, subject: &str, html: String) -> bool {
        match self.send(subject, html) {
            Ok(()) => {
                tracing::info!("Notification sent to {}", self.recipient);
                true
            }
            Err(e) => {
                tracing::warn!("Notification failed: {}", e);
                false
            }
        }
    }

    pub fn success_html(&self, result: &PublishResult, metadata: &MetadataPayload) -> String {
        let description: String = metadata.description.chars().take(200).collect();
        let tags = metadata
            .tags
            .iter()
            .take(10)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "<html><body>\
             <h1>Video Published Successfully</h1>\
             <p><b>Title:</b> {title}</p>\
             <p><b>Video ID:</b> {id}</p>\
             <p><b>Description:</b> {description}...</p>\
             <p><b>Tags:</b> {tags}</p>\
             <p><b>Hashtags:</b> {hashtags}</p>\
             <p><a href=\"{url}\">Watch on YouTube</a></p>\
             <p><b>Published:</b> {time}</p>\
             <hr><p>Automated notification from the {channel} video pipeline</p>\
             </body></html>",
            title = escape_html(&metadata.title),
            id = escape_html(&result.video_id),
            description = escape_html(&description),
            tags = escape_html(&tags),
            hashtags = escape_html(&metadata.hashtags.join(" ")),
            url = escape_html(&result.video_url),
            time = Local::now().format("%Y-%m-%d %H:%M:%S"),
            channel = escape_html(&self.channel_name),
        )
    }

    pub fn error_html(&self, notification: &ErrorNotification) -> String {
        format!(
            "<html><body>\
             <h1>Pipeline Error</h1>\
             <p><b>Failed stage:</b> {stage}</p>\
             <p><b>Error:</b> {message}</p>\
             <p><b>Time:</b> {time}</p>\
             <p>Check the run log and the pipeline_results file in the output folder.</p>\
             <hr><p>Automated notification from the {channel} video pipeline</p>\
             </body></html>",
            stage = escape_html(&notification.stage),
            message = escape_html(&notification.message),
            time = Local::now().format("%Y-%m-%d %H:%M:%S"),
            channel = escape_html(&self.channel_name),
        )
    }
}

impl Notifier for EmailNotifier {
    fn notify_success(&self, result: &PublishResult, metadata: &MetadataPayload) -> bool {
        let subject = success_subject(&metadata.title);
        self.deliver(&subject, self.success_html(result, metadata))
    }

    fn notify_error(&self, notification: &ErrorNotification) -> bool {
        self.deliver(&notification.subject, self.error_html(notification))
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::error_notification;

    fn notifier(recipient: &str) -> EmailNotifier {
        EmailNotifier {
            smtp_server: "localhost".to_string(),
            smtp_port: 1,
            sender: "pipeline@example.com".to_string(),
            password: "secret".to_string(),
            recipient: recipient.to_string(),
            channel_name: "Tech Master".to_string(),
        }
    }

    #[test]
    fn missing_password_is_reported() {
        let settings = EmailSettings {
            sender_env: "VPP_TEST_UNSET_SENDER".to_string(),
            password_env: "VPP_TEST_UNSET_PASSWORD".to_string(),
            ..Default::default()
        };
        let err = EmailNotifier::from_settings(&settings, "Tech Master").err().unwrap();
        assert!(err.to_string().contains("VPP_TEST_UNSET_SENDER"));
    }

    #[test]
    fn success_html_escapes_metadata() {
        let result = PublishResult {
            video_id: "abc".to_string(),
            video_url: "https://www.youtube.com/watch?v=abc".to_string(),
            title: "t".to_string(),
        };
        let metadata = MetadataPayload {
            title: "<Rust> & you".to_string(),
            ..Default::default()
        };
        let html = notifier("ops@example.com").success_html(&result, &metadata);
        assert!(html.contains("&lt;Rust&gt; &amp; you"));
        assert!(html.contains("watch?v=abc"));
    }

    #[test]
    fn error_html_names_stage() {
        let html = notifier("ops@example.com")
            .error_html(&error_notification("disk full", "audio_production"));
        assert!(html.contains("audio_production"));
        assert!(html.contains("disk full"));
    }

    #[test]
    fn bad_recipient_is_not_delivered() {
        let notification = error_notification("boom", "unknown");
        assert!(!notifier("not an address").notify_error(&notification));
    }
}
