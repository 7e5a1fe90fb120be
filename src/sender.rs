//! Outbound webhook delivery.

use crate::error::DeliveryError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// A single HTTP request to a webhook endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookRequest {
    pub url: Url,
    pub http_method: String,
    pub http_headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// A transport that delivers webhook requests.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// Sends the request, returning the response body on a 2xx status.
    async fn send_webhook(&self, request: &WebhookRequest) -> Result<String, DeliveryError>;
}

/// Sends webhook requests over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpWebhookSender {
    client: reqwest::Client,
}

impl HttpWebhookSender {
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, DeliveryError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| DeliveryError::InvalidHeader(name.clone()))?;
        let value =
            HeaderValue::from_str(value).map_err(|_| DeliveryError::InvalidHeader(value.clone()))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    #[instrument(skip_all, fields(url = %request.url, method = %request.http_method))]
    async fn send_webhook(&self, request: &WebhookRequest) -> Result<String, DeliveryError> {
        let method = Method::from_bytes(request.http_method.as_bytes())
            .map_err(|_| DeliveryError::InvalidMethod(request.http_method.clone()))?;
        let headers = header_map(&request.http_headers)?;

        let response = self
            .client
            .request(method, request.url.clone())
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request to webhook failed");
                DeliveryError::Request(e)
            })?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status = %status, error = %e, "Failed to read webhook response body");
                String::new()
            }
        };
        if !status.is_success() {
            error!(status = %status, body = %body, "Webhook returned an error status");
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = %status, "Webhook request succeeded");
        Ok(body)
    }
}
