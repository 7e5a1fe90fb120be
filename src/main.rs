//! dooray-notify - send a batch of alerts to a Dooray incoming webhook
//!
//! Loads the contact point configuration, reads an alert batch from a JSON
//! file and delivers it as a single notification.

use anyhow::{Context, Result};
use clap::Parser;
use dooray_notifier::{
    cli::Cli,
    config::Config,
    core::{Alert, NotifyContext},
    notifier::{DoorayNotifier, Notifier},
    sender::HttpWebhookSender,
    template::BuiltinRenderer,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        tracing_subscriber::fmt().init();
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("External URL: {}", config.external_url);
    info!("Receiver: {}", config.receiver);
    info!("Timeout: {}s", config.timeout_seconds);
    info!("Alerts File: {}", cli.alerts.display());
    info!("-------------------------------------------------------");

    let dooray = config.dooray_config()?;
    let raw = std::fs::read(&cli.alerts)
        .with_context(|| format!("failed to read alerts from {}", cli.alerts.display()))?;
    let alerts: Vec<Alert> =
        serde_json::from_slice(&raw).context("alerts file is not a JSON array of alerts")?;

    let all_resolved = !alerts.is_empty() && alerts.iter().all(|a| !a.is_firing());

    let sender = Arc::new(HttpWebhookSender::new(Duration::from_secs(
        config.timeout_seconds,
    ))?);
    let notifier = DoorayNotifier::new(
        config.receiver.clone(),
        dooray,
        Arc::new(BuiltinRenderer),
        config.external_url.clone(),
        sender,
    );

    if all_resolved && !notifier.send_resolved() {
        info!("All alerts are resolved and resolve messages are disabled; nothing to send.");
        return Ok(());
    }

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling notification.");
            let _ = cancel_tx.send(true);
        }
    });

    let ctx = NotifyContext::new()
        .with_receiver(config.receiver.clone())
        .with_group_labels(cli.group_labels.clone())
        .with_cancel(cancel_rx);

    notifier.notify(&ctx, &alerts).await?;
    info!("Delivered {} alerts to Dooray.", alerts.len());
    Ok(())
}
