/// Notification collaborator
///
/// Creation flows hand an [`Email`] to a [`Notifier`] after the record is
/// stored. Delivery is best effort: a failed send never undoes the write,
/// it is logged and reported back as [`NotificationStatus::Failed`].
///
/// Sinks:
///
/// - [`LogNotifier`]: writes the message to the log (development default)
/// - [`HttpRelayNotifier`]: POSTs the message as JSON to a mail relay

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Outgoing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub subject: String,
    pub message: String,
    pub from: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Relay request failed: {0}")]
    Transport(String),

    #[error("Relay rejected message: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("No recipients")]
    NoRecipients,
}

/// Delivery outcome attached to a creation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Sent,
    Failed,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sink name for logs
    fn name(&self) -> &str;

    async fn send(&self, email: &Email) -> Result<(), NotifyError>;
}

/// Sender and fixed recipients of lead notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// `from` address of lead notifications
    pub sender: String,

    /// Who hears about every new lead
    pub lead_recipients: Vec<String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sender: "noreply@leadcrm.local".to_string(),
            lead_recipients: vec!["sales@leadcrm.local".to_string()],
        }
    }
}

/// Logs each message instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        if email.recipients.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        info!(
            subject = %email.subject,
            from = %email.from,
            recipients = ?email.recipients,
            "{}",
            email.message
        );
        Ok(())
    }
}

/// Delivers messages through an HTTP mail relay
///
/// Sends `POST {base_url}/messages` with the [`Email`] as JSON; any 2xx
/// counts as delivered.
#[derive(Debug, Clone)]
pub struct HttpRelayNotifier {
    client: Client,
    base_url: String,
}

/// Upper bound on one relay request, connect included
pub const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

impl HttpRelayNotifier {
    pub fn new(base_url: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_timeout(base_url, RELAY_TIMEOUT)
    }

    /// Relay client whose requests give up after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("Failed to build relay client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Notifier for HttpRelayNotifier {
    fn name(&self) -> &str {
        "http-relay"
    }

    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        if email.recipients.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .json(email)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(recipients: Vec<String>) -> Email {
        Email {
            subject: "A lead has been created".to_string(),
            message: "Go to the site to see the new lead".to_string(),
            from: "noreply@example.com".to_string(),
            recipients,
        }
    }

    #[tokio::test]
    async fn test_log_notifier_requires_recipients() {
        let notifier = LogNotifier;
        assert!(notifier
            .send(&email(vec!["sales@example.com".to_string()]))
            .await
            .is_ok());
        assert!(matches!(
            notifier.send(&email(vec![])).await,
            Err(NotifyError::NoRecipients)
        ));
    }

    #[test]
    fn test_relay_base_url_trailing_slash() {
        let notifier = HttpRelayNotifier::new("http://relay.local/").unwrap();
        assert_eq!(notifier.base_url, "http://relay.local");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(NotificationStatus::Failed).unwrap(),
            "failed"
        );
    }
}
