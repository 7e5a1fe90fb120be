use clap::Parser;
use dooray_notifier::cli::Cli;
use dooray_notifier::config::Config;
use dooray_notifier::error::ConfigError;
use dooray_notifier::template::{DEFAULT_MESSAGE, DEFAULT_TITLE};
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// A helper function to run a test with a temporary config file.
fn with_config_file<F>(toml_content: &str, test_fn: F)
where
    F: FnOnce(PathBuf),
{
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let path = file.path().to_path_buf();
    test_fn(path);
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let toml_content = r#"
        log_level = "debug"
        external_url = "https://grafana.example.com/"
        receiver = "ops-dooray"
        timeout_seconds = 3
        [dooray]
        url = "https://hook.dooray.com/services/1/2/3"
        title = "Ops"
        description = "{{ .Alerts.Firing | len }} firing"
        icon_url = "https://example.com/icon.png"
        disable_resolve_message = true
    "#;

    with_config_file(toml_content, |path| {
        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.external_url, "https://grafana.example.com/");
        assert_eq!(config.receiver, "ops-dooray");
        assert_eq!(config.timeout_seconds, 3);

        let dooray = config.dooray_config().unwrap();
        assert_eq!(dooray.url.as_str(), "https://hook.dooray.com/services/1/2/3");
        assert_eq!(dooray.bot_name(), "Ops");
        assert_eq!(dooray.icon_url, "https://example.com/icon.png");
        assert!(dooray.disable_resolve_message);
    });
}

#[test]
#[serial]
fn test_minimal_config_uses_defaults() {
    let toml_content = r#"
        [dooray]
        url = "https://hook.dooray.com/services/1/2/3"
    "#;

    with_config_file(toml_content, |path| {
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.timeout_seconds, 10);

        let dooray = config.dooray_config().unwrap();
        assert_eq!(dooray.title, DEFAULT_TITLE);
        assert_eq!(dooray.description, DEFAULT_MESSAGE);
        assert_eq!(dooray.icon_url, "");
        assert!(!dooray.disable_resolve_message);
    });
}

#[test]
#[serial]
fn test_missing_url_is_rejected() {
    with_config_file("log_level = \"warn\"\n", |path| {
        let config = Config::load_from_file(&path).unwrap();
        assert!(matches!(config.dooray_config(), Err(ConfigError::MissingUrl)));
    });
}

#[test]
#[serial]
fn test_zero_timeout_is_rejected() {
    with_config_file("timeout_seconds = 0\n", |path| {
        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ZeroTimeout)
        ));
    });
}

#[test]
#[serial]
fn test_cli_overrides_file() {
    let toml_content = r#"
        log_level = "info"
        [dooray]
        url = "https://hook.dooray.com/services/file"
        title = "From File"
    "#;

    with_config_file(toml_content, |path| {
        let cli = Cli::try_parse_from([
            "dooray-notify",
            "--config",
            path.to_str().unwrap(),
            "--alerts",
            "alerts.json",
            "--url",
            "https://hook.dooray.com/services/cli",
            "--log-level",
            "trace",
        ])
        .unwrap();
        let config = Config::load(&cli).unwrap();

        assert_eq!(config.log_level, "trace");
        let dooray = config.dooray_config().unwrap();
        assert_eq!(dooray.url.as_str(), "https://hook.dooray.com/services/cli");
        assert_eq!(dooray.title, "From File");
    });
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let toml_content = r#"
        [dooray]
        url = "https://hook.dooray.com/services/file"
    "#;

    with_config_file(toml_content, |path| {
        std::env::set_var("DOORAY_DOORAY__ICON_URL", "https://example.com/env.png");
        let result = Config::load_from_file(&path);
        std::env::remove_var("DOORAY_DOORAY__ICON_URL");

        let dooray = result.unwrap().dooray_config().unwrap();
        assert_eq!(dooray.icon_url, "https://example.com/env.png");
    });
}
