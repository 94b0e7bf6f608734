//! Google OAuth redirect target. Completes a login started with `/login` and
//! tells the originating chat about it.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use jarvis_agent::LoginFlow;
use jarvis_core::errors::ApplicationError;
use jarvis_telegram::BotApi;

pub const CALLBACK_PATH: &str = "/oauth/google/callback";

const CONNECTED_PAGE: &str = "Cuenta de Google conectada. Ya puedes volver a Telegram.";
const CONNECTED_CHAT: &str =
    "Tu cuenta de Google quedó conectada. Ya puedes pedirme reuniones, tareas o tu agenda.";
const STALE_STATE: &str = "El enlace de inicio de sesión expiró o ya fue usado. \
     Escribe /login en Telegram para pedir otro.";
const DENIED: &str =
    "No se concedió acceso a Google. Escribe /login en Telegram para intentarlo de nuevo.";
const EXCHANGE_FAILED: &str =
    "No pude completar el inicio de sesión con Google. Inténtalo más tarde.";

#[derive(Clone)]
pub struct OAuthCallbackState {
    login: Arc<LoginFlow>,
    bot: Arc<dyn BotApi>,
}

impl OAuthCallbackState {
    pub fn new(login: Arc<LoginFlow>, bot: Arc<dyn BotApi>) -> Self {
        Self { login, bot }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub fn router(state: OAuthCallbackState) -> Router {
    Router::new().route(CALLBACK_PATH, get(callback)).with_state(state)
}

pub async fn callback(
    State(state): State<OAuthCallbackState>,
    Query(query): Query<CallbackQuery>,
) -> (StatusCode, &'static str) {
    if let Some(error) = query.error {
        warn!(event_name = "auth.consent_denied", error = %error, "google returned an error");
        return (StatusCode::BAD_REQUEST, DENIED);
    }
    let (Some(code), Some(token)) = (query.code, query.state) else {
        return (StatusCode::BAD_REQUEST, STALE_STATE);
    };

    let completed = match state.login.complete(&token, &code).await {
        Ok(Some(completed)) => completed,
        Ok(None) => return (StatusCode::BAD_REQUEST, STALE_STATE),
        Err(error @ ApplicationError::Downstream(_)) => {
            warn!(event_name = "auth.exchange_failed", error = %error, "code exchange failed");
            return (StatusCode::BAD_GATEWAY, EXCHANGE_FAILED);
        }
        Err(error) => {
            warn!(event_name = "auth.callback_failed", error = %error, "login completion failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, EXCHANGE_FAILED);
        }
    };

    match completed.conversation_id.0.parse::<i64>() {
        Ok(chat_id) => {
            if let Err(error) = state.bot.send_message(chat_id, CONNECTED_CHAT).await {
                warn!(
                    event_name = "egress.telegram.message_failed",
                    conversation_id = chat_id,
                    error = %error,
                    "could not confirm login in chat"
                );
            }
        }
        Err(_) => warn!(
            event_name = "auth.callback_unroutable",
            conversation_id = %completed.conversation_id,
            "conversation id is not a telegram chat id"
        ),
    }

    info!(
        event_name = "auth.callback_completed",
        user_id = %completed.user_id,
        conversation_id = %completed.conversation_id,
        "google account connected"
    );
    (StatusCode::OK, CONNECTED_PAGE)
}
