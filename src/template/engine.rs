//! The built-in template renderer.
//!
//! Supports literal text with `{{ action }}` blocks, where an action is either
//! a field path with an optional pipeline (`.Alerts.Firing | len`) or a call to
//! a named template (`template "default.title" .`). `{{-` and `-}}` trim the
//! whitespace next to the block.

use super::{defaults, Rendered, TemplateData, TemplateError, TemplateRenderer};
use crate::core::{sorted_pairs, Alert, LabelSet};

/// Renders templates with the built-in action language.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRenderer;

impl TemplateRenderer for BuiltinRenderer {
    fn render(&self, template: &str, data: &TemplateData<'_>) -> Rendered {
        let mut out = String::with_capacity(template.len());
        let mut error = None;
        let mut rest = template;

        loop {
            let Some(start) = rest.find("{{") else {
                out.push_str(rest);
                break;
            };
            let mut literal = &rest[..start];
            let mut after = &rest[start + 2..];
            // `{{-` trims only the literal text before it, never earlier output.
            if let Some(trimmed) = after.strip_prefix('-') {
                literal = literal.trim_end();
                after = trimmed;
            }
            out.push_str(literal);

            let Some(end) = after.find("}}") else {
                error.get_or_insert(TemplateError::Parse("unclosed action".to_string()));
                break;
            };

            let mut action = &after[..end];
            let mut next = &after[end + 2..];
            if let Some(trimmed) = action.strip_suffix('-') {
                next = next.trim_start();
                action = trimmed;
            }

            match evaluate(action.trim(), data) {
                Ok(text) => out.push_str(&text),
                Err(e) => {
                    error.get_or_insert(e);
                }
            }
            rest = next;
        }

        Rendered { text: out, error }
    }
}

/// An intermediate value flowing through a pipeline.
enum Value<'a> {
    Text(String),
    Labels(&'a LabelSet),
    OwnedLabels(LabelSet),
    Alerts(Vec<&'a Alert>),
}

impl Value<'_> {
    fn labels(&self) -> Option<&LabelSet> {
        match self {
            Value::Labels(l) => Some(*l),
            Value::OwnedLabels(l) => Some(l),
            _ => None,
        }
    }

    fn print(self, what: &str) -> Result<String, TemplateError> {
        match self {
            Value::Text(s) => Ok(s),
            Value::Labels(l) => Ok(format_label_set(l)),
            Value::OwnedLabels(l) => Ok(format_label_set(&l)),
            Value::Alerts(_) => Err(TemplateError::NotPrintable(what.to_string())),
        }
    }
}

fn format_label_set(labels: &LabelSet) -> String {
    let pairs: Vec<String> = sorted_pairs(labels)
        .map(|(k, v)| format!("{}={:?}", k, v))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

fn evaluate(action: &str, data: &TemplateData<'_>) -> Result<String, TemplateError> {
    if action.is_empty() {
        return Err(TemplateError::Parse("missing value for command".to_string()));
    }
    if let Some(call) = action.strip_prefix("template ") {
        return call_template(call.trim(), data);
    }

    let mut stages = split_pipeline(action)?.into_iter();
    let head = stages.next().unwrap_or_default();
    let mut value = lookup(head, data)?;
    for stage in stages {
        value = apply(stage, value)?;
    }
    value.print(action)
}

fn call_template(call: &str, data: &TemplateData<'_>) -> Result<String, TemplateError> {
    let (name, arg) = parse_quoted(call)?;
    let arg = arg.trim();
    if !arg.is_empty() && arg != "." {
        return Err(TemplateError::Parse(format!(
            "unsupported template argument {:?}",
            arg
        )));
    }
    defaults::render_named(&name, data).ok_or(TemplateError::UnknownTemplate(name))
}

/// Parses a leading double-quoted string, returning it and the remaining input.
fn parse_quoted(input: &str) -> Result<(String, &str), TemplateError> {
    let body = input
        .strip_prefix('"')
        .ok_or_else(|| TemplateError::Parse(format!("expected quoted string in {:?}", input)))?;
    let end = body
        .find('"')
        .ok_or_else(|| TemplateError::Parse("unterminated quoted string".to_string()))?;
    Ok((body[..end].to_string(), &body[end + 1..]))
}

/// Splits an action on `|`, ignoring separators inside quoted strings.
fn split_pipeline(action: &str) -> Result<Vec<&str>, TemplateError> {
    let mut stages = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in action.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '|' if !in_quotes => {
                stages.push(action[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(TemplateError::Parse("unterminated quoted string".to_string()));
    }
    stages.push(action[start..].trim());

    if stages.iter().any(|s| s.is_empty()) {
        return Err(TemplateError::Parse("missing command in pipeline".to_string()));
    }
    Ok(stages)
}

fn lookup<'a>(path: &str, data: &TemplateData<'a>) -> Result<Value<'a>, TemplateError> {
    let missing = || TemplateError::MissingField(path.to_string());
    let rest = path.strip_prefix('.').ok_or_else(missing)?;
    let mut segments = rest.split('.');
    let root = segments.next().unwrap_or_default();
    let key = segments.next();
    if segments.next().is_some() {
        return Err(missing());
    }

    let alerts: &'a [Alert] = data.alerts;
    let labels = |set: LabelSet| -> Result<Value<'a>, TemplateError> {
        match key {
            None => Ok(Value::OwnedLabels(set)),
            Some(k) => set.get(k).cloned().map(Value::Text).ok_or_else(missing),
        }
    };

    match (root, key) {
        ("Status", None) => Ok(Value::Text(data.status.to_string())),
        ("Receiver", None) => Ok(Value::Text(data.receiver.to_string())),
        ("ExternalURL", None) => Ok(Value::Text(data.external_url.to_string())),
        ("Alerts", None) => Ok(Value::Alerts(alerts.iter().collect())),
        ("Alerts", Some("Firing")) => Ok(Value::Alerts(data.firing().collect())),
        ("Alerts", Some("Resolved")) => Ok(Value::Alerts(data.resolved().collect())),
        ("GroupLabels", None) => Ok(Value::Labels(data.group_labels)),
        ("GroupLabels", Some(k)) => data
            .group_labels
            .get(k)
            .cloned()
            .map(Value::Text)
            .ok_or_else(missing),
        ("CommonLabels", _) => labels(data.common_labels.clone()),
        ("CommonAnnotations", _) => labels(data.common_annotations.clone()),
        _ => Err(missing()),
    }
}

fn apply<'a>(stage: &str, value: Value<'a>) -> Result<Value<'a>, TemplateError> {
    let (func, arg) = match stage.split_once(char::is_whitespace) {
        Some((func, arg)) => (func, Some(arg.trim())),
        None => (stage, None),
    };

    match (func, value) {
        ("len", Value::Alerts(alerts)) => Ok(Value::Text(alerts.len().to_string())),
        ("len", Value::Text(s)) => Ok(Value::Text(s.chars().count().to_string())),
        ("len", v) => {
            let n = v.labels().map(LabelSet::len).unwrap_or_default();
            Ok(Value::Text(n.to_string()))
        }
        ("toUpper", Value::Text(s)) => Ok(Value::Text(s.to_uppercase())),
        ("toLower", Value::Text(s)) => Ok(Value::Text(s.to_lowercase())),
        ("join", v) => {
            let (sep, _) = parse_quoted(arg.unwrap_or_default())?;
            let labels = v.labels().ok_or_else(|| {
                TemplateError::Parse(format!("join expects a label set in {:?}", stage))
            })?;
            let values: Vec<&str> = sorted_pairs(labels).map(|(_, v)| v.as_str()).collect();
            Ok(Value::Text(values.join(sep.as_str())))
        }
        ("toUpper" | "toLower", _) => Err(TemplateError::Parse(format!(
            "{} expects a string",
            func
        ))),
        _ => Err(TemplateError::UnknownFunction(func.to_string())),
    }
}
