//! The Dooray notifier: builds, encodes and delivers one message per batch.

use crate::config::DoorayConfig;
use crate::core::{Alert, NotifyContext};
use crate::error::NotifyError;
use crate::message::MessageBuilder;
use crate::payload;
use crate::sender::{WebhookRequest, WebhookSender};
use crate::template::TemplateRenderer;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

const CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// A channel that can deliver alert batches.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `alerts`, returning `Ok(true)` once the destination accepted them.
    async fn notify(&self, ctx: &NotifyContext, alerts: &[Alert]) -> Result<bool, NotifyError>;

    /// Whether the dispatcher should also notify when alerts resolve.
    fn send_resolved(&self) -> bool;
}

/// Sends alert notifications to a Dooray incoming webhook.
pub struct DoorayNotifier<S: WebhookSender> {
    name: String,
    config: DoorayConfig,
    builder: MessageBuilder,
    sender: Arc<S>,
}

impl<S: WebhookSender> DoorayNotifier<S> {
    pub fn new(
        name: impl Into<String>,
        config: DoorayConfig,
        renderer: Arc<dyn TemplateRenderer>,
        external_url: impl Into<String>,
        sender: Arc<S>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            builder: MessageBuilder::new(renderer, external_url),
            sender,
        }
    }

    pub fn config(&self) -> &DoorayConfig {
        &self.config
    }

    /// Renders the message text for `alerts` without sending it.
    pub fn build_message(&self, ctx: &NotifyContext, alerts: &[Alert]) -> String {
        self.builder.build(&self.config, ctx, alerts)
    }

    fn request(&self, body: Vec<u8>) -> WebhookRequest {
        let mut http_headers = BTreeMap::new();
        http_headers.insert("Content-Type".to_string(), CONTENT_TYPE.to_string());
        WebhookRequest {
            url: self.config.url.clone(),
            http_method: "POST".to_string(),
            http_headers,
            body,
        }
    }
}

#[async_trait]
impl<S: WebhookSender> Notifier for DoorayNotifier<S> {
    #[instrument(skip_all, fields(count = alerts.len()))]
    async fn notify(&self, ctx: &NotifyContext, alerts: &[Alert]) -> Result<bool, NotifyError> {
        debug!(notification = %self.name, "executing Dooray notification");

        let body = self.build_message(ctx, alerts);
        let request = self.request(payload::encode(&self.config, &body)?);

        if ctx.is_cancelled() {
            return Err(NotifyError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                info!("Dooray notification cancelled before delivery completed");
                return Err(NotifyError::Cancelled);
            }
            result = self.sender.send_webhook(&request) => result,
        };

        match result {
            Ok(_) => {
                info!("Successfully sent notification to Dooray.");
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, body = %body, "failed to send notification to Dooray");
                Err(NotifyError::Delivery(e))
            }
        }
    }

    fn send_resolved(&self) -> bool {
        !self.config.disable_resolve_message
    }
}
