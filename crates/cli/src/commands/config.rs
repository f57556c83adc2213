use std::env;
use std::fs;
use std::path::Path;

use quoteflow_core::config::{resolve_config_path, AppConfig};
use serde::Serialize;
use toml::Value;

use crate::commands::{CommandResult, EXIT_OK};

#[derive(Debug, Serialize)]
struct ConfigField {
    key: &'static str,
    value: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct ConfigReport {
    command: &'static str,
    status: &'static str,
    precedence: &'static str,
    config_file: Option<String>,
    fields: Vec<ConfigField>,
}

pub fn run(config: &AppConfig, explicit_path: Option<&Path>) -> CommandResult {
    let config_file_path = resolve_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let attribute = |key: &'static str, value: String, env_keys: &[&str]| ConfigField {
        key,
        value,
        source: field_source(
            key,
            env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    };

    let fields = vec![
        attribute(
            "logging.level",
            config.logging.level.clone(),
            &["QUOTEFLOW_LOGGING_LEVEL", "QUOTEFLOW_LOG_LEVEL"],
        ),
        attribute(
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["QUOTEFLOW_LOGGING_FORMAT", "QUOTEFLOW_LOG_FORMAT"],
        ),
        attribute("audit.actor", config.audit.actor.clone(), &["QUOTEFLOW_AUDIT_ACTOR"]),
    ];

    CommandResult::report(
        EXIT_OK,
        &ConfigReport {
            command: "config",
            status: "ok",
            precedence: "env > file > default",
            config_file: config_file_path.map(|path| path.display().to_string()),
            fields,
        },
    )
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) =
        env_keys.iter().find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()))
    {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
