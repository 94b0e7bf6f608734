use jarvis_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use jarvis_db::{connect_with_settings, migrations, DbPool};

use crate::commands::CommandResult;

pub fn run(database_url: Option<String>) -> CommandResult {
    let options = LoadOptions {
        overrides: ConfigOverrides { database_url, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "migrate",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "migrate",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let before = applied_versions(&pool).await;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        let after = applied_versions(&pool).await;
        pool.close().await;
        Ok::<(i64, i64), (&'static str, String, u8)>((before, after))
    });

    match result {
        Ok((before, after)) => CommandResult::success(
            "migrate",
            format!(
                "applied {} pending migration(s); schema at {after} migration(s)",
                after - before
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}

/// Zero before the bookkeeping table exists.
async fn applied_versions(pool: &DbPool) -> i64 {
    let table: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_optional(pool)
    .await
    .ok()
    .flatten();
    if table.is_none() {
        return 0;
    }
    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}
