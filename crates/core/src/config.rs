use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::calendar::{MeetingPolicy, DEFAULT_MEETING_MINUTES, DEFAULT_REMINDER_OFFSETS};

const MAX_REMINDER_MINUTES: u32 = 40_320;
const MAX_REMINDERS: usize = 5;
const MAX_PENDING_TTL_MINUTES: u64 = 525_600;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub google: GoogleConfig,
    pub assistant: AssistantConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    pub webhook_secret: Option<SecretString>,
    pub api_base_url: String,
}

#[derive(Clone, Debug)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_url: String,
    pub calendar_id: String,
    pub task_list_id: String,
}

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub timezone: Tz,
    /// Zero keeps pending meetings until they are completed or cancelled.
    pub pending_ttl_minutes: u64,
    pub meeting_duration_minutes: u32,
    pub reminder_offsets_minutes: Vec<u32>,
    pub undated_task_limit: usize,
}

impl AssistantConfig {
    pub fn meeting_policy(&self) -> MeetingPolicy {
        MeetingPolicy {
            duration_minutes: self.meeting_duration_minutes,
            reminder_offsets_minutes: self.reminder_offsets_minutes.clone(),
        }
    }

    pub fn pending_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.pending_ttl_minutes.min(MAX_PENDING_TTL_MINUTES) as i64)
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_url: Option<String>,
    pub timezone: Option<String>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://jarvis.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            telegram: TelegramConfig {
                bot_token: String::new().into(),
                webhook_secret: None,
                api_base_url: "https://api.telegram.org".to_string(),
            },
            google: GoogleConfig {
                client_id: String::new(),
                client_secret: String::new().into(),
                redirect_url: "http://localhost:8080/oauth/google/callback".to_string(),
                calendar_id: "primary".to_string(),
                task_list_id: "@default".to_string(),
            },
            assistant: AssistantConfig {
                timezone: chrono_tz::America::Santiago,
                pending_ttl_minutes: 60,
                meeting_duration_minutes: DEFAULT_MEETING_MINUTES,
                reminder_offsets_minutes: DEFAULT_REMINDER_OFFSETS.to_vec(),
                undated_task_limit: 5,
            },
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
                request_timeout_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("jarvis.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(telegram) = patch.telegram {
            if let Some(bot_token) = telegram.bot_token {
                self.telegram.bot_token = secret_value(bot_token);
            }
            if let Some(webhook_secret) = telegram.webhook_secret {
                self.telegram.webhook_secret = Some(secret_value(webhook_secret));
            }
            if let Some(api_base_url) = telegram.api_base_url {
                self.telegram.api_base_url = api_base_url;
            }
        }

        if let Some(google) = patch.google {
            if let Some(client_id) = google.client_id {
                self.google.client_id = client_id;
            }
            if let Some(client_secret) = google.client_secret {
                self.google.client_secret = secret_value(client_secret);
            }
            if let Some(redirect_url) = google.redirect_url {
                self.google.redirect_url = redirect_url;
            }
            if let Some(calendar_id) = google.calendar_id {
                self.google.calendar_id = calendar_id;
            }
            if let Some(task_list_id) = google.task_list_id {
                self.google.task_list_id = task_list_id;
            }
        }

        if let Some(assistant) = patch.assistant {
            if let Some(timezone) = assistant.timezone {
                self.assistant.timezone = parse_timezone("assistant.timezone", &timezone)?;
            }
            if let Some(pending_ttl_minutes) = assistant.pending_ttl_minutes {
                self.assistant.pending_ttl_minutes = pending_ttl_minutes;
            }
            if let Some(meeting_duration_minutes) = assistant.meeting_duration_minutes {
                self.assistant.meeting_duration_minutes = meeting_duration_minutes;
            }
            if let Some(reminder_offsets_minutes) = assistant.reminder_offsets_minutes {
                self.assistant.reminder_offsets_minutes = reminder_offsets_minutes;
            }
            if let Some(undated_task_limit) = assistant.undated_task_limit {
                self.assistant.undated_task_limit = undated_task_limit;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(request_timeout_secs) = server.request_timeout_secs {
                self.server.request_timeout_secs = request_timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("JARVIS_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("JARVIS_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("JARVIS_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("JARVIS_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("JARVIS_DATABASE_TIMEOUT_SECS", &value)?;
        }

        let bot_token =
            read_env("JARVIS_TELEGRAM_BOT_TOKEN").or_else(|| read_env("TELEGRAM_BOT_TOKEN"));
        if let Some(value) = bot_token {
            self.telegram.bot_token = secret_value(value);
        }
        if let Some(value) = read_env("JARVIS_TELEGRAM_WEBHOOK_SECRET") {
            self.telegram.webhook_secret = Some(secret_value(value));
        }
        if let Some(value) = read_env("JARVIS_TELEGRAM_API_BASE_URL") {
            self.telegram.api_base_url = value;
        }

        if let Some(value) = read_env("JARVIS_GOOGLE_CLIENT_ID") {
            self.google.client_id = value;
        }
        if let Some(value) = read_env("JARVIS_GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = secret_value(value);
        }
        if let Some(value) = read_env("JARVIS_GOOGLE_REDIRECT_URL") {
            self.google.redirect_url = value;
        }
        if let Some(value) = read_env("JARVIS_GOOGLE_CALENDAR_ID") {
            self.google.calendar_id = value;
        }
        if let Some(value) = read_env("JARVIS_GOOGLE_TASK_LIST_ID") {
            self.google.task_list_id = value;
        }

        if let Some(value) = read_env("JARVIS_ASSISTANT_TIMEZONE") {
            self.assistant.timezone = parse_timezone("JARVIS_ASSISTANT_TIMEZONE", &value)?;
        }
        if let Some(value) = read_env("JARVIS_ASSISTANT_PENDING_TTL_MINUTES") {
            self.assistant.pending_ttl_minutes =
                parse_u64("JARVIS_ASSISTANT_PENDING_TTL_MINUTES", &value)?;
        }
        if let Some(value) = read_env("JARVIS_ASSISTANT_MEETING_DURATION_MINUTES") {
            self.assistant.meeting_duration_minutes =
                parse_u32("JARVIS_ASSISTANT_MEETING_DURATION_MINUTES", &value)?;
        }
        if let Some(value) = read_env("JARVIS_ASSISTANT_REMINDER_OFFSETS_MINUTES") {
            self.assistant.reminder_offsets_minutes =
                parse_u32_list("JARVIS_ASSISTANT_REMINDER_OFFSETS_MINUTES", &value)?;
        }
        if let Some(value) = read_env("JARVIS_ASSISTANT_UNDATED_TASK_LIMIT") {
            self.assistant.undated_task_limit =
                parse_u32("JARVIS_ASSISTANT_UNDATED_TASK_LIMIT", &value)? as usize;
        }

        if let Some(value) = read_env("JARVIS_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        let port = read_env("JARVIS_SERVER_PORT").map(|value| ("JARVIS_SERVER_PORT", value));
        if let Some((key, value)) = port.or_else(|| read_env("PORT").map(|value| ("PORT", value)))
        {
            self.server.port = parse_u16(key, &value)?;
        }
        if let Some(value) = read_env("JARVIS_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("JARVIS_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("JARVIS_SERVER_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs =
                parse_u64("JARVIS_SERVER_REQUEST_TIMEOUT_SECS", &value)?;
        }

        let log_level = read_env("JARVIS_LOGGING_LEVEL").or_else(|| read_env("JARVIS_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("JARVIS_LOGGING_FORMAT").or_else(|| read_env("JARVIS_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(bot_token) = overrides.telegram_bot_token {
            self.telegram.bot_token = secret_value(bot_token);
        }
        if let Some(client_id) = overrides.google_client_id {
            self.google.client_id = client_id;
        }
        if let Some(client_secret) = overrides.google_client_secret {
            self.google.client_secret = secret_value(client_secret);
        }
        if let Some(redirect_url) = overrides.google_redirect_url {
            self.google.redirect_url = redirect_url;
        }
        if let Some(timezone) = overrides.timezone {
            self.assistant.timezone = parse_timezone("timezone", &timezone)?;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_telegram(&self.telegram)?;
        validate_google(&self.google)?;
        validate_assistant(&self.assistant)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("jarvis.toml"), PathBuf::from("config/jarvis.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_telegram(telegram: &TelegramConfig) -> Result<(), ConfigError> {
    let bot_token = telegram.bot_token.expose_secret();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "telegram.bot_token is required. Create a bot with @BotFather and set TELEGRAM_BOT_TOKEN"
                .to_string(),
        ));
    }

    let well_formed = bot_token
        .split_once(':')
        .map(|(id, secret)| {
            !id.is_empty() && id.chars().all(|ch| ch.is_ascii_digit()) && !secret.is_empty()
        })
        .unwrap_or(false);
    if !well_formed {
        return Err(ConfigError::Validation(
            "telegram.bot_token must look like `<bot id>:<secret>` as issued by @BotFather"
                .to_string(),
        ));
    }

    if let Some(secret) = &telegram.webhook_secret {
        let secret = secret.expose_secret();
        let allowed = secret.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if secret.is_empty() || secret.len() > 256 || !allowed {
            return Err(ConfigError::Validation(
                "telegram.webhook_secret must be 1-256 characters of A-Z, a-z, 0-9, `_` or `-`"
                    .to_string(),
            ));
        }
    }

    if !is_http_url(&telegram.api_base_url) {
        return Err(ConfigError::Validation(
            "telegram.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_google(google: &GoogleConfig) -> Result<(), ConfigError> {
    if google.client_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "google.client_id is required. Create an OAuth client at https://console.cloud.google.com/apis/credentials".to_string(),
        ));
    }
    if google.client_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "google.client_secret is required for the OAuth code exchange".to_string(),
        ));
    }
    if !is_http_url(&google.redirect_url) {
        return Err(ConfigError::Validation(
            "google.redirect_url must start with http:// or https://".to_string(),
        ));
    }
    if google.calendar_id.trim().is_empty() || google.task_list_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "google.calendar_id and google.task_list_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_assistant(assistant: &AssistantConfig) -> Result<(), ConfigError> {
    if assistant.meeting_duration_minutes == 0 || assistant.meeting_duration_minutes > 1440 {
        return Err(ConfigError::Validation(
            "assistant.meeting_duration_minutes must be in range 1..=1440".to_string(),
        ));
    }

    if assistant.reminder_offsets_minutes.len() > MAX_REMINDERS {
        return Err(ConfigError::Validation(format!(
            "assistant.reminder_offsets_minutes accepts at most {MAX_REMINDERS} entries"
        )));
    }
    if assistant.reminder_offsets_minutes.iter().any(|offset| *offset > MAX_REMINDER_MINUTES) {
        return Err(ConfigError::Validation(format!(
            "assistant.reminder_offsets_minutes must each be at most {MAX_REMINDER_MINUTES}"
        )));
    }

    if assistant.pending_ttl_minutes > MAX_PENDING_TTL_MINUTES {
        return Err(ConfigError::Validation(format!(
            "assistant.pending_ttl_minutes must be at most {MAX_PENDING_TTL_MINUTES} (0 disables expiry)"
        )));
    }

    if assistant.undated_task_limit > 50 {
        return Err(ConfigError::Validation(
            "assistant.undated_task_limit must be in range 0..=50".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    if server.request_timeout_secs == 0 || server.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "server.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_u32_list(key: &str, value: &str) -> Result<Vec<u32>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<u32>().map_err(|_| invalid_override(key, value)))
        .collect()
}

fn parse_timezone(key: &str, value: &str) -> Result<Tz, ConfigError> {
    value.trim().parse::<Tz>().map_err(|_| {
        ConfigError::Validation(format!(
            "{key} must be an IANA timezone name such as `America/Santiago`, got `{value}`"
        ))
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    telegram: Option<TelegramPatch>,
    google: Option<GooglePatch>,
    assistant: Option<AssistantPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramPatch {
    bot_token: Option<String>,
    webhook_secret: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GooglePatch {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_url: Option<String>,
    calendar_id: Option<String>,
    task_list_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantPatch {
    timezone: Option<String>,
    pending_ttl_minutes: Option<u64>,
    meeting_duration_minutes: Option<u32>,
    reminder_offsets_minutes: Option<Vec<u32>>,
    undated_task_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
