use std::env;
use std::sync::{Mutex, OnceLock};

use jarvis_cli::commands::resolve::ResolveArgs;
use jarvis_cli::commands::{config, migrate, resolve};
use serde_json::Value;

const VALID_ENV: &[(&str, &str)] = &[
    ("JARVIS_TELEGRAM_BOT_TOKEN", "123456:test-secret"),
    ("JARVIS_GOOGLE_CLIENT_ID", "client-id.apps.googleusercontent.com"),
    ("JARVIS_GOOGLE_CLIENT_SECRET", "client-secret"),
    ("JARVIS_DATABASE_URL", "sqlite::memory:"),
];

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(VALID_ENV, || {
        let result = migrate::run(None);
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        assert!(payload["message"].as_str().unwrap_or_default().starts_with("applied 1"));
    });
}

#[test]
fn migrate_returns_config_failure_without_tokens() {
    with_env(&[], || {
        let result = migrate::run(Some("sqlite::memory:".to_string()));
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_reports_env_sources_and_redacts_secrets() {
    with_env(VALID_ENV, || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        assert!(result
            .output
            .contains("- telegram.bot_token = 123456:*** (source: env (JARVIS_TELEGRAM_BOT_TOKEN))"));
        assert!(result.output.contains("- google.client_secret = <redacted>"));
        assert!(result.output.contains("- server.port = 8080 (source: default)"));
        assert!(!result.output.contains("test-secret"));
    });
}

#[test]
fn config_honors_legacy_aliases() {
    with_env(
        &[
            ("TELEGRAM_BOT_TOKEN", "987654:legacy-secret"),
            ("PORT", "9090"),
            ("JARVIS_GOOGLE_CLIENT_ID", "client-id.apps.googleusercontent.com"),
            ("JARVIS_GOOGLE_CLIENT_SECRET", "client-secret"),
        ],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0);
            assert!(result.output.contains("- server.port = 9090 (source: env (PORT))"));
            assert!(result.output.contains("(source: env (TELEGRAM_BOT_TOKEN))"));
        },
    );
}

#[test]
fn resolve_reports_date_time_and_meeting_intent() {
    with_env(&[], || {
        let result = resolve::run(ResolveArgs {
            text: "Reunión con Ana mañana a las 15:00".to_string(),
            now: Some("2026-03-04T09:15".to_string()),
            timezone: Some("America/Santiago".to_string()),
            awaiting: None,
        });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["resolution"]["kind"], "date_time");
        assert_eq!(payload["resolution"]["value"], "2026-03-05T15:00:00");
        assert_eq!(payload["time"], "15:00");
        assert_eq!(payload["intent"], "meeting");
    });
}

#[test]
fn resolve_treats_bare_time_as_continuation_when_awaiting() {
    with_env(&[], || {
        let result = resolve::run(ResolveArgs {
            text: "a las 10".to_string(),
            now: Some("2026-03-04T09:15".to_string()),
            timezone: Some("America/Santiago".to_string()),
            awaiting: Some("time".to_string()),
        });

        let payload = parse_payload(&result.output);
        assert_eq!(payload["resolution"]["kind"], "not_found");
        assert_eq!(payload["awaiting"], "time");
        assert_eq!(payload["intent"], "pending_continuation");
    });
}

#[test]
fn resolve_rejects_bad_arguments() {
    with_env(&[], || {
        let bad_zone = resolve::run(ResolveArgs {
            text: "hoy".to_string(),
            timezone: Some("Mars/Olympus".to_string()),
            ..ResolveArgs::default()
        });
        assert_eq!(bad_zone.exit_code, 2);
        assert_eq!(parse_payload(&bad_zone.output)["error_class"], "invalid_argument");

        let bad_now = resolve::run(ResolveArgs {
            text: "hoy".to_string(),
            now: Some("yesterday".to_string()),
            timezone: Some("America/Santiago".to_string()),
            ..ResolveArgs::default()
        });
        assert_eq!(bad_now.exit_code, 2);
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "JARVIS_DATABASE_URL",
        "JARVIS_DATABASE_MAX_CONNECTIONS",
        "JARVIS_DATABASE_TIMEOUT_SECS",
        "JARVIS_TELEGRAM_BOT_TOKEN",
        "JARVIS_TELEGRAM_WEBHOOK_SECRET",
        "JARVIS_TELEGRAM_API_BASE_URL",
        "JARVIS_GOOGLE_CLIENT_ID",
        "JARVIS_GOOGLE_CLIENT_SECRET",
        "JARVIS_GOOGLE_REDIRECT_URL",
        "JARVIS_ASSISTANT_TIMEZONE",
        "JARVIS_SERVER_PORT",
        "JARVIS_LOGGING_LEVEL",
        "JARVIS_LOGGING_FORMAT",
        "JARVIS_LOG_LEVEL",
        "JARVIS_LOG_FORMAT",
        "TELEGRAM_BOT_TOKEN",
        "PORT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
