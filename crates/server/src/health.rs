use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use jarvis_db::DbPool;
use serde::Serialize;

use crate::webhook::InFlight;

pub const LIVENESS_TEXT: &str = "Jarvis is alive";

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    in_flight: InFlight,
}

impl HealthState {
    pub fn new(db_pool: DbPool, in_flight: InFlight) -> Self {
        Self { db_pool, in_flight }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatabaseProbe {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: DatabaseProbe,
    pub updates_in_flight: usize,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/", get(liveness)).route("/health", get(health)).with_state(state)
}

pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthReport>) {
    let database = probe_database(&state.db_pool).await;
    let ready = database.status == "ready";

    let report = HealthReport {
        status: if ready { "ready" } else { "degraded" },
        database,
        updates_in_flight: state.in_flight.current(),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(report))
}

async fn probe_database(pool: &DbPool) -> DatabaseProbe {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM conversation_state")
        .fetch_one(pool)
        .await
    {
        Ok(pending) => {
            DatabaseProbe { status: "ready", detail: format!("{pending} pending conversations") }
        }
        Err(error) => {
            DatabaseProbe { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}
