use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Notify;
use tracing::{info, warn};

use jarvis_telegram::{Update, UpdateProcessor};

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Counts spawned update tasks so shutdown can wait for them.
#[derive(Clone, Default)]
pub struct InFlight {
    count: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

pub struct InFlightGuard {
    tracker: InFlight,
}

impl InFlight {
    pub fn enter(&self) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard { tracker: self.clone() }
    }

    pub fn current(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub async fn drained(&self) {
        loop {
            let notified = self.idle.notified();
            if self.current() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.tracker.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.idle.notify_waiters();
        }
    }
}

#[derive(Clone)]
pub struct WebhookState {
    processor: Arc<UpdateProcessor>,
    secret: Option<SecretString>,
    in_flight: InFlight,
}

impl WebhookState {
    pub fn new(
        processor: Arc<UpdateProcessor>,
        secret: Option<SecretString>,
        in_flight: InFlight,
    ) -> Self {
        Self { processor, secret, in_flight }
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new().route("/webhook", post(receive_update)).with_state(state)
}

fn secret_matches(headers: &HeaderMap, expected: &SecretString) -> bool {
    headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|provided| provided == expected.expose_secret())
}

/// Acknowledges immediately; the update is processed on its own task.
pub async fn receive_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = &state.secret {
        if !secret_matches(&headers, secret) {
            warn!(event_name = "ingress.telegram.secret_rejected", "webhook secret mismatch");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let update = match serde_json::from_slice::<Update>(&body) {
        Ok(update) => update,
        Err(error) => {
            warn!(
                event_name = "ingress.telegram.payload_rejected",
                error = %error,
                bytes = body.len(),
                "dropping undecodable update"
            );
            return StatusCode::OK;
        }
    };

    let guard = state.in_flight.enter();
    let processor = state.processor.clone();
    tokio::spawn(async move {
        let _guard = guard;
        let result = processor.process(update).await;
        info!(event_name = "ingress.telegram.update_processed", result = ?result, "update done");
    });

    StatusCode::OK
}
