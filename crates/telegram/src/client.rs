use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{BotEnvelope, EventContext, EventDispatcher, HandlerResult, Update};

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Platform limit for a single text message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("telegram request failed: {0}")]
    Send(String),
    #[error("telegram rejected message ({status}): {description}")]
    Rejected { status: u16, description: String },
}

#[async_trait]
pub trait BotApi: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    http: reqwest::Client,
    api_base_url: String,
    bot_token: SecretString,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient").field("api_base_url", &self.api_base_url).finish()
    }
}

impl TelegramClient {
    pub fn new(
        http: reqwest::Client,
        api_base_url: impl Into<String>,
        bot_token: SecretString,
    ) -> Self {
        Self { http, api_base_url: api_base_url.into(), bot_token }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base_url.trim_end_matches('/'),
            self.bot_token.expose_secret()
        )
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        let text = truncate_message(text);
        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text: &text })
            .send()
            .await
            // reqwest errors carry the URL, which embeds the token.
            .map_err(|error| TransportError::Send(error.without_url().to_string()))?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|error| TransportError::Send(error.without_url().to_string()))?;
        if !status.is_success() || !body.ok {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                description: body.description.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// Cuts on a character boundary so multi-byte text never splits.
pub fn truncate_message(text: &str) -> String {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((cut, _)) => text[..cut].to_owned(),
        None => text.to_owned(),
    }
}

/// Dispatches one update and delivers the reply, if any, to its chat.
pub struct UpdateProcessor {
    dispatcher: EventDispatcher,
    bot: Arc<dyn BotApi>,
}

impl UpdateProcessor {
    pub fn new(dispatcher: EventDispatcher, bot: Arc<dyn BotApi>) -> Self {
        Self { dispatcher, bot }
    }

    pub async fn process(&self, update: Update) -> HandlerResult {
        let envelope = BotEnvelope::from_update(update);
        let context = EventContext::for_update(envelope.update_id);
        let chat_id = envelope.chat_id();

        info!(
            event_name = "ingress.telegram.update_received",
            update_id = envelope.update_id,
            event_type = ?envelope.event.event_type(),
            correlation_id = %context.correlation_id,
            conversation_id = chat_id.unwrap_or_default(),
            "received telegram update"
        );

        let result = match self.dispatcher.dispatch(&envelope, &context).await {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    correlation_id = %context.correlation_id,
                    error = %error,
                    "update dispatch failed; dropping update"
                );
                return HandlerResult::Ignored;
            }
        };

        if let (HandlerResult::Responded(text), Some(chat_id)) = (&result, chat_id) {
            match self.bot.send_message(chat_id, text).await {
                Ok(()) => debug!(
                    event_name = "egress.telegram.message_sent",
                    correlation_id = %context.correlation_id,
                    conversation_id = chat_id,
                    "reply delivered"
                ),
                Err(error) => warn!(
                    event_name = "egress.telegram.message_failed",
                    correlation_id = %context.correlation_id,
                    conversation_id = chat_id,
                    error = %error,
                    "failed to deliver reply"
                ),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{truncate_message, BotApi, TransportError, UpdateProcessor, MAX_MESSAGE_CHARS};
    use crate::events::{
        EventContext, EventDispatcher, EventHandlerError, HandlerResult, TextMessageEvent,
        TextMessageHandler, TextMessageService, Update,
    };

    #[derive(Default)]
    struct RecordingBot {
        sent: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait]
    impl BotApi for RecordingBot {
        async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
            self.sent.lock().expect("lock").push((chat_id, text.to_owned()));
            Ok(())
        }
    }

    struct Shout;

    #[async_trait]
    impl TextMessageService for Shout {
        async fn handle_text_message(
            &self,
            event: &TextMessageEvent,
            _ctx: &EventContext,
        ) -> Result<Option<String>, EventHandlerError> {
            Ok(Some(event.text.to_uppercase()))
        }
    }

    fn update(json: &str) -> Update {
        serde_json::from_str(json).expect("update json")
    }

    #[test]
    fn truncation_respects_character_limit() {
        let long = "ñ".repeat(MAX_MESSAGE_CHARS + 10);
        let cut = truncate_message(&long);
        assert_eq!(cut.chars().count(), MAX_MESSAGE_CHARS);
        assert_eq!(truncate_message("hola"), "hola");
    }

    #[tokio::test]
    async fn processor_sends_reply_to_originating_chat() {
        let bot = Arc::new(RecordingBot::default());
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(TextMessageHandler::new(Shout));
        let processor = UpdateProcessor::new(dispatcher, bot.clone());

        let result = processor
            .process(update(
                r#"{"update_id": 1, "message": {"message_id": 1, "chat": {"id": 55}, "text": "hola"}}"#,
            ))
            .await;

        assert_eq!(result, HandlerResult::Responded("HOLA".to_owned()));
        assert_eq!(*bot.sent.lock().expect("lock"), vec![(55, "HOLA".to_owned())]);
    }

    #[tokio::test]
    async fn processor_stays_silent_for_unsupported_updates() {
        let bot = Arc::new(RecordingBot::default());
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(TextMessageHandler::new(Shout));
        let processor = UpdateProcessor::new(dispatcher, bot.clone());

        let result = processor.process(update(r#"{"update_id": 2}"#)).await;

        assert_eq!(result, HandlerResult::Ignored);
        assert!(bot.sent.lock().expect("lock").is_empty());
    }
}
