//! Configuration management for the Dooray notifier
//!
//! `Config` holds the process-level settings and the raw Dooray contact point
//! settings. It uses the `figment` crate to layer defaults, a TOML file,
//! `DOORAY_`-prefixed environment variables and command-line overrides.
//! `DoorayConfig` is the validated, immutable form handed to the notifier.

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::template::{DEFAULT_MESSAGE, DEFAULT_TITLE};
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Bot name used when the title is itself a template.
pub const DEFAULT_BOT_NAME: &str = "Grafana";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Base URL of the alerting UI, used for links in the message.
    pub external_url: String,
    /// Name of the contact point, available to templates as `.Receiver`.
    pub receiver: String,
    /// Timeout for the webhook request in seconds.
    pub timeout_seconds: u64,
    /// Settings of the Dooray contact point.
    pub dooray: DooraySettings,
}

/// Raw Dooray settings as stored by the contact point.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DooraySettings {
    /// The Dooray incoming webhook URL.
    pub url: String,
    /// Title template. Empty means the default title.
    pub title: String,
    /// Description template. Empty means the default message.
    pub description: String,
    /// URL of the bot avatar.
    #[serde(alias = "iconUrl")]
    pub icon_url: String,
    /// Display name of the bot. Derived from the title when unset.
    #[serde(alias = "botName", skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
    /// Skip notifications for resolved alerts.
    #[serde(alias = "disableResolveMessage")]
    pub disable_resolve_message: bool,
}

impl Config {
    /// Loads the application configuration by layering defaults, the optional
    /// TOML file named on the command line, the environment and CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config: Self = Self::figment(cli.config.as_deref())
            .merge(cli.clone())
            .extract()?;
        Ok(config.validate()?)
    }

    /// Loads the configuration from a TOML file and the environment only.
    pub fn load_from_file(config_path: &Path) -> Result<Self> {
        let config: Self = Self::figment(Some(config_path)).extract()?;
        Ok(config.validate()?)
    }

    /// Rejects settings the notifier cannot run with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(self)
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        // e.g. DOORAY_LOG_LEVEL=debug or DOORAY_DOORAY__URL=https://...
        figment.merge(Env::prefixed("DOORAY_").split("__"))
    }

    /// Validates the Dooray settings into a `DoorayConfig`.
    pub fn dooray_config(&self) -> Result<DoorayConfig, ConfigError> {
        DoorayConfig::from_settings(self.dooray.clone(), &BTreeMap::new())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            external_url: "http://localhost:3000".to_string(),
            receiver: String::new(),
            timeout_seconds: 10,
            dooray: DooraySettings::default(),
        }
    }
}

/// Validated settings of a Dooray contact point.
#[derive(Debug, Clone, PartialEq)]
pub struct DoorayConfig {
    pub url: Url,
    pub title: String,
    pub description: String,
    pub icon_url: String,
    pub bot_name: Option<String>,
    pub disable_resolve_message: bool,
}

impl DoorayConfig {
    /// Creates a config for `url` with the default templates and no icon.
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        Self::from_settings(
            DooraySettings {
                url: url.to_string(),
                ..Default::default()
            },
            &BTreeMap::new(),
        )
    }

    /// Builds a config from raw settings. A `url` entry in `secure` takes
    /// precedence over the plain setting.
    pub fn from_settings(
        settings: DooraySettings,
        secure: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let raw_url = secure
            .get("url")
            .filter(|u| !u.is_empty())
            .cloned()
            .unwrap_or(settings.url);
        if raw_url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
            url: raw_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            url,
            title: non_empty_or(settings.title, DEFAULT_TITLE),
            description: non_empty_or(settings.description, DEFAULT_MESSAGE),
            icon_url: settings.icon_url,
            bot_name: settings.bot_name.filter(|n| !n.is_empty()),
            disable_resolve_message: settings.disable_resolve_message,
        })
    }

    /// Builds a config from contact point settings stored as JSON.
    pub fn from_json(raw: &[u8], secure: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let settings: DooraySettings = serde_json::from_slice(raw)?;
        Self::from_settings(settings, secure)
    }

    /// The display name of the bot posting the message.
    ///
    /// An explicit bot name wins; otherwise a literal title is used, and a
    /// templated title falls back to [`DEFAULT_BOT_NAME`].
    pub fn bot_name(&self) -> &str {
        match &self.bot_name {
            Some(name) => name.as_str(),
            None if !self.title.contains("{{") => self.title.as_str(),
            None => DEFAULT_BOT_NAME,
        }
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
