//! Built-in named templates.
//!
//! `default.title` and `default.message` produce the standard alert summary
//! and per-alert body used when a contact point does not override them.

use super::TemplateData;
use crate::core::{is_private, sorted_pairs, Alert, AlertStatus, LabelSet};
use reqwest::Url;
use std::fmt::Write;

/// Title template used when none is configured.
pub const DEFAULT_TITLE: &str = r#"{{ template "default.title" . }}"#;
/// Description template used when none is configured.
pub const DEFAULT_MESSAGE: &str = r#"{{ template "default.message" . }}"#;

const VALUE_ANNOTATION: &str = "__value_string__";
const DASHBOARD_ANNOTATION: &str = "__dashboardUid__";
const PANEL_ANNOTATION: &str = "__panelId__";

/// Renders a built-in template by name, or `None` if no such template exists.
pub(crate) fn render_named(name: &str, data: &TemplateData<'_>) -> Option<String> {
    match name {
        "default.title" => Some(default_title(data)),
        "default.message" => Some(default_message(data)),
        _ => None,
    }
}

fn default_title(data: &TemplateData<'_>) -> String {
    let firing = data.firing().count();
    let resolved = data.resolved().count();

    let mut title = format!("[{}", data.status.as_str().to_uppercase());
    if data.status == AlertStatus::Firing {
        let _ = write!(title, ":{}", firing);
        if resolved > 0 {
            let _ = write!(title, ", RESOLVED:{}", resolved);
        }
    }
    title.push_str("] ");

    let group_values: Vec<&str> = sorted_pairs(data.group_labels)
        .map(|(_, v)| v.as_str())
        .collect();
    title.push_str(&group_values.join(" "));
    title.push(' ');

    if data.common_labels.len() > data.group_labels.len() {
        let extra: Vec<&str> = sorted_pairs(&data.common_labels)
            .filter(|(k, _)| !data.group_labels.contains_key(*k))
            .map(|(_, v)| v.as_str())
            .collect();
        let _ = write!(title, "({})", extra.join(" "));
    }
    title
}

fn default_message(data: &TemplateData<'_>) -> String {
    let firing: Vec<&Alert> = data.firing().collect();
    let resolved: Vec<&Alert> = data.resolved().collect();
    let mut out = String::new();

    if !firing.is_empty() {
        out.push_str("**Firing**\n");
        alert_list(&mut out, &firing, data.external_url);
        if !resolved.is_empty() {
            out.push_str("\n\n");
        }
    }
    if !resolved.is_empty() {
        out.push_str("**Resolved**\n");
        alert_list(&mut out, &resolved, data.external_url);
    }
    out
}

fn alert_list(out: &mut String, alerts: &[&Alert], external_url: &str) {
    let base = external_url.trim_end_matches('/');

    for alert in alerts {
        let value = alert
            .annotations
            .get(VALUE_ANNOTATION)
            .map(String::as_str)
            .unwrap_or("[no value]");
        let _ = writeln!(out, "\nValue: {}", value);

        out.push_str("Labels:\n");
        for (k, v) in sorted_pairs(&alert.labels) {
            let _ = writeln!(out, " - {} = {}", k, v);
        }

        out.push_str("Annotations:\n");
        for (k, v) in visible(&alert.annotations) {
            let _ = writeln!(out, " - {} = {}", k, v);
        }

        if !alert.generator_url.is_empty() {
            let _ = writeln!(out, "Source: {}", alert.generator_url);
        }
        if let Some(url) = silence_url(base, &alert.labels) {
            let _ = writeln!(out, "Silence: {}", url);
        }
        if let Some(uid) = alert.annotations.get(DASHBOARD_ANNOTATION) {
            let _ = writeln!(out, "Dashboard: {}/d/{}", base, uid);
            if let Some(panel) = alert.annotations.get(PANEL_ANNOTATION) {
                let _ = writeln!(out, "Panel: {}/d/{}?viewPanel={}", base, uid, panel);
            }
        }
    }
}

fn visible(annotations: &LabelSet) -> impl Iterator<Item = (&String, &String)> {
    sorted_pairs(annotations).filter(|(k, _)| !is_private(k))
}

/// Builds a link that pre-fills a silence matching every public label.
/// Returns `None` when the external URL is not absolute.
fn silence_url(base: &str, labels: &LabelSet) -> Option<Url> {
    let mut url = Url::parse(&format!("{}/alerting/silence/new", base)).ok()?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("alertmanager", "grafana");
        for (k, v) in sorted_pairs(labels).filter(|(k, _)| !is_private(k)) {
            query.append_pair("matcher", &format!("{}={}", k, v));
        }
    }
    Some(url)
}
