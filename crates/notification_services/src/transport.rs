use std::env;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;
use uuid::Uuid;

use crate::types::{DispatchResult, Envelope, NotificationError};

/// Owns actual delivery of a rendered message. Retry policy belongs to the
/// implementation, not to the scheduler.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Attempts to deliver one envelope
    async fn send(&self, envelope: &Envelope) -> Result<DispatchResult, NotificationError>;
}

/// AWS SES email transport
pub struct SesEmailTransport {
    #[allow(dead_code)]
    client: Client,
    from_email: String,
    #[allow(dead_code)]
    aws_region: String,
}

impl SesEmailTransport {
    /// Builds the transport from environment configuration
    pub fn from_env() -> Result<Self, NotificationError> {
        let from_email = env::var("FROM_EMAIL").map_err(|_| {
            NotificationError::Transport("FROM_EMAIL environment variable not set".to_string())
        })?;

        let aws_region = env::var("AWS_REGION").map_err(|_| {
            NotificationError::Transport("AWS_REGION environment variable not set".to_string())
        })?;

        Ok(Self {
            client: Client::new(),
            from_email,
            aws_region,
        })
    }
}

#[async_trait]
impl EmailTransport for SesEmailTransport {
    async fn send(&self, envelope: &Envelope) -> Result<DispatchResult, NotificationError> {
        info!(
            "Sending email from {} to {} with subject: {}",
            self.from_email, envelope.to, envelope.subject
        );

        // For now, just log the email and return a mock ID
        // In production, you would implement actual SES integration
        info!(
            "Email content:\nTo: {}\nSubject: {}\nBody: {}",
            envelope.to, envelope.subject, envelope.text
        );

        Ok(DispatchResult {
            message_id: format!("ses-{}", Uuid::new_v4()),
        })
    }
}

/// Mock transport for development and testing
pub struct MockEmailTransport;

#[async_trait]
impl EmailTransport for MockEmailTransport {
    async fn send(&self, envelope: &Envelope) -> Result<DispatchResult, NotificationError> {
        info!("[MOCK EMAIL] To: {}", envelope.to);
        info!("[MOCK EMAIL] Subject: {}", envelope.subject);
        info!("[MOCK EMAIL] Body:\n{}", envelope.text);

        Ok(DispatchResult {
            message_id: format!("mock-email-{}", Uuid::new_v4()),
        })
    }
}
