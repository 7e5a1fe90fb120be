/// Dooray Notifier - delivers grouped alert batches to a Dooray incoming webhook
///
/// This library renders a notification message from a batch of firing and
/// resolved alerts, wraps it in the Dooray webhook payload and posts it.
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod message;
pub mod notifier;
pub mod payload;
pub mod sender;
pub mod template;

// Re-export core types for convenience
pub use crate::core::*;
pub use error::{ConfigError, DeliveryError, NotifyError};
pub use notifier::{DoorayNotifier, Notifier};
