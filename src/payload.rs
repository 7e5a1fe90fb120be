//! The JSON body accepted by a Dooray incoming webhook.

use crate::config::DoorayConfig;
use crate::error::NotifyError;
use serde::{Deserialize, Serialize};

/// A message posted to a Dooray incoming webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DoorayMessage {
    pub bot_name: String,
    pub bot_icon_image: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// A rich block shown under the message text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub title: String,
    pub title_link: String,
    pub text: String,
    pub color: String,
}

impl DoorayMessage {
    pub fn new(config: &DoorayConfig, text: String) -> Self {
        Self {
            bot_name: config.bot_name().to_string(),
            bot_icon_image: config.icon_url.clone(),
            text,
            attachments: Vec::new(),
        }
    }
}

/// Encodes the message body and branding of `config` as JSON bytes.
pub fn encode(config: &DoorayConfig, body: &str) -> Result<Vec<u8>, NotifyError> {
    let message = DoorayMessage::new(config, body.to_string());
    Ok(serde_json::to_vec(&message)?)
}
