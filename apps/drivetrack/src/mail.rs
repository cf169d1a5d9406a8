//! # Mail Dispatcher
//!
//! Sends formatted progress reports via an external email provider's HTTP
//! API.
//!
//! ## Configuration (Environment Variables)
//!
//! - `DRIVETRACK_MAIL_URL`: provider endpoint receiving a JSON message
//! - `DRIVETRACK_MAIL_KEY`: bearer token for the provider
//! - `DRIVETRACK_MAIL_FROM`: sender address
//!
//! Provider failures surface as `DrivetrackError::Mail`; the API layer
//! maps those to 502.

use async_trait::async_trait;
use drivetrack_core::DrivetrackError;
use serde::Serialize;

// =============================================================================
// MESSAGE
// =============================================================================

/// An outbound report email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl MailMessage {
    /// Build a message, rejecting empty recipient or subject.
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Result<Self, DrivetrackError> {
        let message = Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        };
        if message.to.trim().is_empty() {
            return Err(DrivetrackError::Validation("to is required".to_string()));
        }
        if message.subject.trim().is_empty() {
            return Err(DrivetrackError::Validation(
                "subject is required".to_string(),
            ));
        }
        Ok(message)
    }
}

// =============================================================================
// MAILER TRAIT
// =============================================================================

/// The seam between report dispatch and the external email provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message. Errors are provider-side failures.
    async fn send(&self, message: &MailMessage) -> Result<(), DrivetrackError>;
}

// =============================================================================
// HTTP MAILER
// =============================================================================

/// Provider payload: the message plus the configured sender.
#[derive(Debug, Serialize)]
struct ProviderPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Mailer backed by an HTTP email provider.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl std::fmt::Debug for HttpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMailer")
            .field("endpoint", &self.endpoint)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl HttpMailer {
    /// Build a mailer from explicit provider settings.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }

    /// Build a mailer from `DRIVETRACK_MAIL_*` environment variables.
    ///
    /// All three variables must be set and non-empty.
    pub fn from_env() -> Result<Self, DrivetrackError> {
        let endpoint = mail_env("DRIVETRACK_MAIL_URL")?;
        let api_key = mail_env("DRIVETRACK_MAIL_KEY")?;
        let from = mail_env("DRIVETRACK_MAIL_FROM")?;
        Ok(Self::new(endpoint, api_key, from))
    }
}

fn mail_env(name: &str) -> Result<String, DrivetrackError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DrivetrackError::Mail(format!("{} is not configured", name)))
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), DrivetrackError> {
        let payload = ProviderPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DrivetrackError::Mail(format!("provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DrivetrackError::Mail(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        tracing::info!(to = %message.to, subject = %message.subject, "report dispatched");
        Ok(())
    }
}

// =============================================================================
// TEST DOUBLES
// =============================================================================

/// Mailer that records every message instead of sending it.
///
/// Used by the API integration tests to observe dispatches.
#[derive(Debug, Default)]
pub struct CaptureMailer {
    sent: std::sync::Mutex<Vec<MailMessage>>,
}

impl CaptureMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages captured so far.
    #[must_use]
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for CaptureMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), DrivetrackError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }
}

/// Mailer standing in when no provider is configured (or, in tests, when a
/// down provider is simulated). Every dispatch fails with the stored reason.
#[derive(Debug)]
pub struct UnconfiguredMailer {
    reason: String,
}

impl UnconfiguredMailer {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for UnconfiguredMailer {
    fn default() -> Self {
        Self::new("mail provider is not configured")
    }
}

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send(&self, _message: &MailMessage) -> Result<(), DrivetrackError> {
        Err(DrivetrackError::Mail(self.reason.clone()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
