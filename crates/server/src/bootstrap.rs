use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tracing::info;

use jarvis_agent::{AssistantRuntime, LoginFlow, RuntimeSettings};
use jarvis_core::config::{AppConfig, ConfigError, LoadOptions};
use jarvis_core::datetime::{Clock, SystemClock};
use jarvis_db::repositories::{SqlConversationStateStore, SqlCredentialStore, SqlOAuthStateStore};
use jarvis_db::{connect_with_settings, migrations, DbPool};
use jarvis_google::{http_client, GoogleCalendarClient, GoogleOAuthClient, GoogleTasksClient};
use jarvis_telegram::{assistant_dispatcher, BotApi, TelegramClient, UpdateProcessor};

use crate::health::{self, HealthState};
use crate::oauth::{self, OAuthCallbackState};
use crate::services::{AssistantCommands, AssistantMessages};
use crate::webhook::{self, InFlight, WebhookState};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub login: Arc<LoginFlow>,
    pub bot: Arc<dyn BotApi>,
    pub processor: Arc<UpdateProcessor>,
    pub in_flight: InFlight,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("assistant patterns failed to compile: {0}")]
    Patterns(#[source] regex::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let http = http_client(Duration::from_secs(config.server.request_timeout_secs))
        .map_err(BootstrapError::HttpClient)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let google = &config.google;
    let oauth = GoogleOAuthClient::new(
        http.clone(),
        google.client_id.clone(),
        google.client_secret.clone(),
        google.redirect_url.clone(),
    );
    let login = Arc::new(LoginFlow::new(
        Arc::new(oauth),
        Arc::new(SqlCredentialStore::new(db_pool.clone())),
        Arc::new(SqlOAuthStateStore::new(db_pool.clone())),
        clock.clone(),
    ));

    let assistant = &config.assistant;
    let settings = RuntimeSettings {
        timezone: assistant.timezone,
        pending_ttl: assistant.pending_ttl(),
        meeting_policy: assistant.meeting_policy(),
        undated_task_limit: assistant.undated_task_limit,
    };
    let runtime = AssistantRuntime::new(
        Arc::new(SqlConversationStateStore::new(db_pool.clone())),
        login.clone(),
        Arc::new(GoogleCalendarClient::new(
            http.clone(),
            google.calendar_id.clone(),
            assistant.timezone,
        )),
        Arc::new(GoogleTasksClient::new(http.clone(), google.task_list_id.clone())),
        settings,
    )
    .map_err(BootstrapError::Patterns)?
    .with_clock(clock);
    let runtime = Arc::new(runtime);

    let bot: Arc<dyn BotApi> = Arc::new(TelegramClient::new(
        http,
        config.telegram.api_base_url.clone(),
        config.telegram.bot_token.clone(),
    ));
    let dispatcher = assistant_dispatcher(
        AssistantCommands::new(runtime.clone()),
        AssistantMessages::new(runtime.clone()),
    );
    let processor = Arc::new(UpdateProcessor::new(dispatcher, bot.clone()));
    info!(
        event_name = "system.bootstrap.assistant_ready",
        correlation_id = "bootstrap",
        timezone = %assistant.timezone,
        "assistant runtime wired"
    );

    Ok(Application {
        config,
        db_pool,
        login,
        bot,
        processor,
        in_flight: InFlight::default(),
    })
}

impl Application {
    pub fn router(&self) -> Router {
        Router::new()
            .merge(health::router(HealthState::new(self.db_pool.clone(), self.in_flight.clone())))
            .merge(webhook::router(WebhookState::new(
                self.processor.clone(),
                self.config.telegram.webhook_secret.clone(),
                self.in_flight.clone(),
            )))
            .merge(oauth::router(OAuthCallbackState::new(self.login.clone(), self.bot.clone())))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use jarvis_core::config::{ConfigOverrides, LoadOptions};
    use tower::ServiceExt;

    use crate::bootstrap::bootstrap;

    fn overrides(database_url: &str, bot_token: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                telegram_bot_token: Some(bot_token.to_string()),
                google_client_id: Some("client-id.apps.googleusercontent.com".to_string()),
                google_client_secret: Some("client-secret".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_malformed_bot_token() {
        let result = bootstrap(overrides("sqlite::memory:", "not-a-token")).await;

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("telegram.bot_token"));
    }

    #[tokio::test]
    async fn bootstrap_applies_migrations_and_serves_routes() {
        let app = bootstrap(overrides("sqlite::memory:?cache=shared", "123456:test-secret"))
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('conversation_state', 'credential', 'oauth_state')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("schema query");
        assert_eq!(table_count, 3);

        let health = app
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(health.status(), StatusCode::OK);

        let callback = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/oauth/google/callback?code=abc&state=unknown")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(callback.status(), StatusCode::BAD_REQUEST);

        app.db_pool.close().await;
    }
}
