//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged with
//! the configuration from the TOML file and environment variables.

use clap::Parser;
use figment::{
    providers::Serialized,
    value::{Dict, Map},
    Error, Metadata, Profile, Provider,
};
use serde::Serialize;
use std::path::PathBuf;

/// Sends a batch of alerts to a Dooray incoming webhook.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to a JSON file holding the array of alerts to send.
    #[arg(short, long, value_name = "FILE")]
    pub alerts: PathBuf,

    /// Dooray incoming webhook URL.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Base URL of the alerting UI used in message links.
    #[arg(long, value_name = "URL")]
    pub external_url: Option<String>,

    /// Name of the contact point.
    #[arg(long)]
    pub receiver: Option<String>,

    /// Logging level (e.g. "debug").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// A label the batch was grouped by, as `name=value`. May be repeated.
    #[arg(long = "group-label", value_name = "NAME=VALUE", value_parser = parse_label)]
    pub group_labels: Vec<(String, String)>,
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", s))
}

#[derive(Serialize, Default)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dooray: Option<DoorayOverrides>,
}

#[derive(Serialize)]
struct DoorayOverrides {
    url: String,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let overrides = Overrides {
            log_level: self.log_level.clone(),
            external_url: self.external_url.clone(),
            receiver: self.receiver.clone(),
            dooray: self.url.clone().map(|url| DoorayOverrides { url }),
        };
        Serialized::defaults(overrides).data()
    }
}
