//! Integration tests for the Dooray notifier using a recording sender.

#[path = "../helpers/mod.rs"]
mod helpers;

use dooray_notifier::config::{DoorayConfig, DooraySettings};
use dooray_notifier::core::{Alert, NotifyContext};
use dooray_notifier::error::{DeliveryError, NotifyError};
use dooray_notifier::notifier::Notifier;
use dooray_notifier::payload::DoorayMessage;
use helpers::{grouped_context, notifier_for_tests, single_firing_alert, WEBHOOK_URL};
use std::collections::BTreeMap;

#[tokio::test]
async fn test_message_is_sent() {
    // Arrange
    let (notifier, sender) = notifier_for_tests(DoorayConfig::new(WEBHOOK_URL).unwrap());

    // Act
    let delivered = notifier
        .notify(&grouped_context(), &single_firing_alert())
        .await
        .unwrap();

    // Assert
    assert!(delivered);
    let requests = sender.requests();
    assert_eq!(requests.len(), 1, "expected exactly one webhook request");

    let request = &requests[0];
    assert_eq!(request.url.as_str(), WEBHOOK_URL);
    assert_eq!(request.http_method, "POST");
    assert_eq!(
        request.http_headers.get("Content-Type").map(String::as_str),
        Some("application/json;charset=UTF-8")
    );

    let message: DoorayMessage = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(message.bot_name, "Grafana");
    assert_eq!(message.bot_icon_image, "");
    assert!(message.attachments.is_empty());
    let expected_text = "[FIRING:1]  (val1)\nhttp://localhost/alerting/list\n\n**Firing**\n\nValue: [no value]\nLabels:\n - alertname = alert1\n - lbl1 = val1\nAnnotations:\n - ann1 = annv1\nSilence: http://localhost/alerting/silence/new?alertmanager=grafana&matcher=alertname%3Dalert1&matcher=lbl1%3Dval1\n";
    assert_eq!(message.text, expected_text);
}

#[tokio::test]
async fn test_body_text_matches_built_message() {
    let (notifier, sender) = notifier_for_tests(DoorayConfig::new(WEBHOOK_URL).unwrap());
    let alerts = vec![
        Alert::firing(&[("alertname", "cpu"), ("host", "a")], &[]),
        Alert::firing(&[("alertname", "cpu"), ("host", "b")], &[]).resolved(),
    ];
    let ctx = NotifyContext::new();

    notifier.notify(&ctx, &alerts).await.unwrap();

    let message: DoorayMessage = serde_json::from_slice(&sender.requests()[0].body).unwrap();
    assert_eq!(message.text, notifier.build_message(&ctx, &alerts));
}

#[tokio::test]
async fn test_custom_branding_and_icon() {
    let raw = br#"{"url":"https://example.com/hooks/yyyy","title":"Night Watch","description":"{{ .Alerts.Firing | len }} firing","iconUrl":"https://example.com/bot.png"}"#;
    let config = DoorayConfig::from_json(raw, &BTreeMap::new()).unwrap();
    let (notifier, sender) = notifier_for_tests(config);

    notifier
        .notify(&NotifyContext::new(), &single_firing_alert())
        .await
        .unwrap();

    let request = &sender.requests()[0];
    assert_eq!(request.url.as_str(), "https://example.com/hooks/yyyy");
    let message: DoorayMessage = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(message.bot_name, "Night Watch");
    assert_eq!(message.bot_icon_image, "https://example.com/bot.png");
    assert_eq!(
        message.text,
        "Night Watch\nhttp://localhost/alerting/list\n\n1 firing"
    );
}

#[tokio::test]
async fn test_broken_template_still_delivers() {
    let settings = DooraySettings {
        url: WEBHOOK_URL.to_string(),
        title: "{{ .CommonLabels.missing }}Alert".to_string(),
        description: "{{ template \"nope\" . }}".to_string(),
        ..Default::default()
    };
    let config = DoorayConfig::from_settings(settings, &BTreeMap::new()).unwrap();
    let (notifier, sender) = notifier_for_tests(config);

    let delivered = notifier
        .notify(&NotifyContext::new(), &single_firing_alert())
        .await
        .unwrap();

    assert!(delivered);
    let message: DoorayMessage = serde_json::from_slice(&sender.requests()[0].body).unwrap();
    assert_eq!(message.text, "Alert\nhttp://localhost/alerting/list\n\n");
}

#[tokio::test]
async fn test_delivery_error_is_returned_once() {
    let (notifier, sender) = notifier_for_tests(DoorayConfig::new(WEBHOOK_URL).unwrap());
    sender.fail_with("connection refused");

    let result = notifier
        .notify(&grouped_context(), &single_firing_alert())
        .await;

    match result {
        Err(NotifyError::Delivery(DeliveryError::Status { body, .. })) => {
            assert_eq!(body, "connection refused")
        }
        other => panic!("expected a delivery error, got {:?}", other),
    }
    assert_eq!(sender.requests().len(), 1, "no retry should be attempted");
}

#[tokio::test]
async fn test_send_resolved_follows_config() {
    let settings = DooraySettings {
        url: WEBHOOK_URL.to_string(),
        disable_resolve_message: true,
        ..Default::default()
    };
    let (disabled, _) =
        notifier_for_tests(DoorayConfig::from_settings(settings, &BTreeMap::new()).unwrap());
    let (enabled, _) = notifier_for_tests(DoorayConfig::new(WEBHOOK_URL).unwrap());

    assert!(!disabled.send_resolved());
    assert!(enabled.send_resolved());
}

#[tokio::test]
async fn test_empty_batch_is_still_sent() {
    let (notifier, sender) = notifier_for_tests(DoorayConfig::new(WEBHOOK_URL).unwrap());

    let delivered = notifier.notify(&NotifyContext::new(), &[]).await.unwrap();

    assert!(delivered);
    let message: DoorayMessage = serde_json::from_slice(&sender.requests()[0].body).unwrap();
    assert!(message
        .text
        .ends_with("\nhttp://localhost/alerting/list\n\n"));
}
