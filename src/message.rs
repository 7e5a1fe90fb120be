//! Builds the plain-text body of a Dooray notification.

use crate::config::DoorayConfig;
use crate::core::{Alert, NotifyContext};
use crate::template::{TemplateData, TemplateRenderer};
use std::sync::Arc;
use tracing::warn;

const RULE_LIST_PATH: &str = "/alerting/list";

/// Renders the configured title and description around a link to the rule list.
#[derive(Clone)]
pub struct MessageBuilder {
    renderer: Arc<dyn TemplateRenderer>,
    external_url: String,
}

impl MessageBuilder {
    pub fn new(renderer: Arc<dyn TemplateRenderer>, external_url: impl Into<String>) -> Self {
        Self {
            renderer,
            external_url: external_url.into(),
        }
    }

    /// The link to the alert rule list, shown under the title.
    pub fn rule_list_url(&self) -> String {
        format!(
            "{}{}",
            self.external_url.trim_end_matches('/'),
            RULE_LIST_PATH
        )
    }

    /// Builds `"<title>\n<rule list url>\n\n<description>"`.
    ///
    /// Template errors are logged and the partially rendered text is used.
    pub fn build(&self, config: &DoorayConfig, ctx: &NotifyContext, alerts: &[Alert]) -> String {
        let data = TemplateData::new(ctx, alerts, &self.external_url);
        let title = self.renderer.render(&config.title, &data);
        let description = self.renderer.render(&config.description, &data);

        if let Some(err) = title.error.as_ref().or(description.error.as_ref()) {
            warn!(error = %err, "failed to template Dooray message");
        }

        format!(
            "{}\n{}\n\n{}",
            title.text,
            self.rule_list_url(),
            description.text
        )
    }
}
