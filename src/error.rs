//! Error types returned by the notifier and its collaborators.

use thiserror::Error;

/// Failures building a `DoorayConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not find url property in settings")]
    MissingUrl,

    #[error("invalid webhook url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("timeout_seconds must be greater than zero")]
    ZeroTimeout,

    #[error("failed to parse settings: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Failures reported by a `WebhookSender`.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook response status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("invalid HTTP header {0:?}")]
    InvalidHeader(String),
}

/// Failures returned by `Notifier::notify`.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to encode Dooray payload: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("failed to send notification to Dooray: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("notification cancelled")]
    Cancelled,
}
