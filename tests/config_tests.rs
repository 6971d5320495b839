//! Tests for configuration loading.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use courier::config::CourierConfig;
use courier::error::CourierError;
use courier::executor::ConnectorSelection;
use courier::provider::create_provider;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 9] = [
    "PICA_SECRET",
    "PICA_SERVER_URL",
    "PICA_CONNECTORS",
    "PICA_EXCLUDED_CONNECTORS",
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "COURIER_MODEL",
    "COURIER_TASK_TIMEOUT_SECS",
    "COURIER_HISTORY_RESPONSES",
];

/// Restores the captured variables on drop.
struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_env() -> EnvGuard {
    let guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    guard
}

#[test]
fn from_env_requires_secret() {
    let _lock = env_lock_guard();
    let _env = clear_env();

    let err = CourierConfig::from_env().unwrap_err();
    assert!(matches!(err, CourierError::Configuration(_)));
    assert!(err.is_fatal());
}

#[test]
fn from_env_reads_process_environment() {
    let _lock = env_lock_guard();
    let _env = clear_env();
    std::env::set_var("PICA_SECRET", "sk_live_test");
    std::env::set_var("PICA_EXCLUDED_CONNECTORS", "slack,notion");
    std::env::set_var("COURIER_TASK_TIMEOUT_SECS", "45");

    let config = CourierConfig::from_env().unwrap();
    assert_eq!(config.secret(), "sk_live_test");
    assert_eq!(config.task_timeout(), Duration::from_secs(45));
    assert!(config.connectors().permits("gmail"));
    assert!(!config.connectors().permits("notion"));
}

#[test]
fn invalid_timeout_is_a_configuration_error() {
    let _lock = env_lock_guard();
    let _env = clear_env();
    std::env::set_var("PICA_SECRET", "sk_live_test");
    std::env::set_var("COURIER_TASK_TIMEOUT_SECS", "two minutes");

    let err = CourierConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("COURIER_TASK_TIMEOUT_SECS"));
}

#[test]
fn debug_output_redacts_secrets() {
    let config = CourierConfig::new("sk_live_very_secret").with_openai_api_key("sk-openai-secret");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("very_secret"));
    assert!(!rendered.contains("openai-secret"));
    assert!(rendered.contains("development-api.picaos.com"));
}

#[test]
fn builders_override_defaults() {
    let config = CourierConfig::new("sk")
        .with_server_url("http://localhost:8080")
        .with_connectors(ConnectorSelection::only(["gmail"]))
        .with_model("gpt-4o-mini")
        .with_task_timeout(Duration::from_secs(5))
        .with_history_responses(1);

    assert_eq!(config.server_url(), "http://localhost:8080");
    assert!(config.connectors().permits("gmail"));
    assert!(!config.connectors().permits("github"));
    assert_eq!(config.model(), "gpt-4o-mini");
    assert_eq!(config.task_timeout(), Duration::from_secs(5));
    assert_eq!(config.history_responses(), 1);
}

#[test]
fn provider_needs_an_openai_key() {
    let without = CourierConfig::new("sk");
    assert!(matches!(
        create_provider(&without),
        Err(CourierError::Configuration(_))
    ));

    let with = CourierConfig::new("sk")
        .with_openai_api_key("sk-openai")
        .with_model("gpt-4o-mini");
    let provider = create_provider(&with).unwrap();
    assert_eq!(provider.provider_name(), "openai");
    assert_eq!(provider.model_id(), "gpt-4o-mini");
}
