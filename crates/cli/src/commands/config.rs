use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use jarvis_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::CommandResult;

/// One reported setting: dotted key, rendered value, env vars that can set it
/// (highest precedence first).
struct Entry {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl Entry {
    fn new(key: &'static str, value: impl Into<String>, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.into(), env_keys }
    }
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let file_path = detect_config_path();
    let file_doc = file_path.as_deref().and_then(load_config_file_doc);
    CommandResult::text(render(&config, file_doc.as_ref(), file_path.as_deref()))
}

pub fn render(config: &AppConfig, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for entry in entries(config) {
        let source = field_source(entry.key, entry.env_keys, file_doc, file_path);
        lines.push(format!("- {} = {} (source: {source})", entry.key, entry.value));
    }
    lines.join("\n")
}

fn entries(config: &AppConfig) -> Vec<Entry> {
    let telegram = &config.telegram;
    let google = &config.google;
    let assistant = &config.assistant;
    let offsets = assistant
        .reminder_offsets_minutes
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");

    vec![
        Entry::new("database.url", &config.database.url, &["JARVIS_DATABASE_URL"]),
        Entry::new(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["JARVIS_DATABASE_MAX_CONNECTIONS"],
        ),
        Entry::new(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["JARVIS_DATABASE_TIMEOUT_SECS"],
        ),
        Entry::new(
            "telegram.bot_token",
            redact_bot_token(telegram.bot_token.expose_secret()),
            &["JARVIS_TELEGRAM_BOT_TOKEN", "TELEGRAM_BOT_TOKEN"],
        ),
        Entry::new(
            "telegram.webhook_secret",
            if telegram.webhook_secret.is_some() { "<redacted>" } else { "<unset>" },
            &["JARVIS_TELEGRAM_WEBHOOK_SECRET"],
        ),
        Entry::new(
            "telegram.api_base_url",
            &telegram.api_base_url,
            &["JARVIS_TELEGRAM_API_BASE_URL"],
        ),
        Entry::new("google.client_id", &google.client_id, &["JARVIS_GOOGLE_CLIENT_ID"]),
        Entry::new(
            "google.client_secret",
            if google.client_secret.expose_secret().is_empty() { "<empty>" } else { "<redacted>" },
            &["JARVIS_GOOGLE_CLIENT_SECRET"],
        ),
        Entry::new("google.redirect_url", &google.redirect_url, &["JARVIS_GOOGLE_REDIRECT_URL"]),
        Entry::new("google.calendar_id", &google.calendar_id, &["JARVIS_GOOGLE_CALENDAR_ID"]),
        Entry::new("google.task_list_id", &google.task_list_id, &["JARVIS_GOOGLE_TASK_LIST_ID"]),
        Entry::new(
            "assistant.timezone",
            assistant.timezone.name(),
            &["JARVIS_ASSISTANT_TIMEZONE"],
        ),
        Entry::new(
            "assistant.pending_ttl_minutes",
            assistant.pending_ttl_minutes.to_string(),
            &["JARVIS_ASSISTANT_PENDING_TTL_MINUTES"],
        ),
        Entry::new(
            "assistant.meeting_duration_minutes",
            assistant.meeting_duration_minutes.to_string(),
            &["JARVIS_ASSISTANT_MEETING_DURATION_MINUTES"],
        ),
        Entry::new(
            "assistant.reminder_offsets_minutes",
            offsets,
            &["JARVIS_ASSISTANT_REMINDER_OFFSETS_MINUTES"],
        ),
        Entry::new(
            "assistant.undated_task_limit",
            assistant.undated_task_limit.to_string(),
            &["JARVIS_ASSISTANT_UNDATED_TASK_LIMIT"],
        ),
        Entry::new(
            "server.bind_address",
            &config.server.bind_address,
            &["JARVIS_SERVER_BIND_ADDRESS"],
        ),
        Entry::new("server.port", config.server.port.to_string(), &["JARVIS_SERVER_PORT", "PORT"]),
        Entry::new(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["JARVIS_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        Entry::new(
            "server.request_timeout_secs",
            config.server.request_timeout_secs.to_string(),
            &["JARVIS_SERVER_REQUEST_TIMEOUT_SECS"],
        ),
        Entry::new(
            "logging.level",
            &config.logging.level,
            &["JARVIS_LOGGING_LEVEL", "JARVIS_LOG_LEVEL"],
        ),
        Entry::new(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["JARVIS_LOGGING_FORMAT", "JARVIS_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    ["jarvis.toml", "config/jarvis.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    file_doc: Option<&Value>,
    file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = file_doc {
        if contains_path(doc, key_path) {
            let file_path = file_path
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

/// Keeps the public bot id, hides the secret half.
fn redact_bot_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.split_once(':') {
        Some((bot_id, _)) => format!("{bot_id}:***"),
        None => "<redacted>".to_string(),
    }
}
