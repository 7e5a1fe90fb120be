//! Template rendering for notification text.
//!
//! A renderer turns a template string and the data derived from an alert batch
//! into text. Rendering never aborts: problems are reported alongside the
//! best-effort output so that a broken template degrades the message instead
//! of blocking delivery.

pub mod defaults;
pub mod engine;

use crate::core::{Alert, AlertStatus, LabelSet, NotifyContext};
use thiserror::Error;

pub use defaults::{DEFAULT_MESSAGE, DEFAULT_TITLE};
pub use engine::BuiltinRenderer;

/// A non-fatal problem encountered while rendering a template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template: parse error: {0}")]
    Parse(String),

    #[error("template: function \"{0}\" not defined")]
    UnknownFunction(String),

    #[error("template: no such template \"{0}\"")]
    UnknownTemplate(String),

    #[error("template: can't evaluate field {0}")]
    MissingField(String),

    #[error("template: can't print {0}")]
    NotPrintable(String),
}

/// The output of a render: the text produced so far and the first error hit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub text: String,
    pub error: Option<TemplateError>,
}

/// Renders template strings against an alert batch.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, data: &TemplateData<'_>) -> Rendered;
}

/// The view of an alert batch that templates are evaluated against.
#[derive(Debug, Clone)]
pub struct TemplateData<'a> {
    pub receiver: &'a str,
    pub status: AlertStatus,
    pub alerts: &'a [Alert],
    pub group_labels: &'a LabelSet,
    pub common_labels: LabelSet,
    pub common_annotations: LabelSet,
    pub external_url: &'a str,
}

impl<'a> TemplateData<'a> {
    pub fn new(ctx: &'a NotifyContext, alerts: &'a [Alert], external_url: &'a str) -> Self {
        let status = if alerts.iter().any(Alert::is_firing) {
            AlertStatus::Firing
        } else {
            AlertStatus::Resolved
        };

        Self {
            receiver: &ctx.receiver,
            status,
            alerts,
            group_labels: &ctx.group_labels,
            common_labels: common_pairs(alerts.iter().map(|a| &a.labels)),
            common_annotations: common_pairs(alerts.iter().map(|a| &a.annotations)),
            external_url,
        }
    }

    pub fn firing(&self) -> impl Iterator<Item = &'a Alert> {
        let alerts: &'a [Alert] = self.alerts;
        alerts.iter().filter(|a| a.is_firing())
    }

    pub fn resolved(&self) -> impl Iterator<Item = &'a Alert> {
        let alerts: &'a [Alert] = self.alerts;
        alerts.iter().filter(|a| !a.is_firing())
    }
}

/// Returns the pairs shared, with identical values, by every set.
fn common_pairs<'s>(mut sets: impl Iterator<Item = &'s LabelSet>) -> LabelSet {
    let Some(first) = sets.next() else {
        return LabelSet::new();
    };
    let mut common = first.clone();
    for set in sets {
        common.retain(|k, v| set.get(k) == Some(v));
    }
    common
}
