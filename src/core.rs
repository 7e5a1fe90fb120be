//! Core domain types and service traits for the Dooray notifier
//!
//! This module defines the alert model handed to us by the dispatcher and the
//! per-call context that travels with every notification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::watch;

/// A set of name/value pairs, iterated in sorted key order.
pub type LabelSet = BTreeMap<String, String>;

/// The label naming an alert. Listed ahead of every other label.
pub const ALERT_NAME_LABEL: &str = "alertname";

/// Iterates `labels` with `alertname` first, then the remaining keys in order.
pub fn sorted_pairs(labels: &LabelSet) -> impl Iterator<Item = (&String, &String)> {
    labels.get_key_value(ALERT_NAME_LABEL).into_iter().chain(
        labels
            .iter()
            .filter(|(k, _)| k.as_str() != ALERT_NAME_LABEL),
    )
}

/// Keys wrapped in `__` on both sides are internal and never shown.
pub fn is_private(key: &str) -> bool {
    key.starts_with("__") && key.ends_with("__")
}

/// Whether an alert is currently firing or has been resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Firing,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Firing => "firing",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single firing or resolved condition, as grouped by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Identifying labels of the alert.
    #[serde(default)]
    pub labels: LabelSet,
    /// Free-form annotations. Keys of the form `__name__` are internal.
    #[serde(default)]
    pub annotations: LabelSet,
    /// Current state of the alert.
    #[serde(default)]
    pub status: AlertStatus,
    /// Link back to the rule that produced the alert.
    #[serde(default)]
    pub generator_url: String,
}

impl Alert {
    /// Creates a firing alert from label and annotation pairs.
    pub fn firing(labels: &[(&str, &str)], annotations: &[(&str, &str)]) -> Self {
        Self {
            labels: to_label_set(labels),
            annotations: to_label_set(annotations),
            status: AlertStatus::Firing,
            generator_url: String::new(),
        }
    }

    /// Returns a copy of this alert marked as resolved.
    pub fn resolved(mut self) -> Self {
        self.status = AlertStatus::Resolved;
        self
    }

    pub fn is_firing(&self) -> bool {
        self.status == AlertStatus::Firing
    }
}

fn to_label_set(pairs: &[(&str, &str)]) -> LabelSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Per-call information supplied by the dispatcher alongside an alert batch.
#[derive(Debug, Clone, Default)]
pub struct NotifyContext {
    /// Labels the batch was grouped by.
    pub group_labels: LabelSet,
    /// Name of the contact point receiving the batch.
    pub receiver: String,
    /// Cancellation signal. A `true` value abandons any pending send.
    pub cancel: Option<watch::Receiver<bool>>,
}

impl NotifyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group_labels<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.group_labels = labels.into_iter().collect();
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = receiver.into();
        self
    }

    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Returns true if the cancellation signal has already fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once the context is cancelled. Never resolves without a signal,
    /// or after the sending half is dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.cancel else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
