//! Telegram-facing adapters over the assistant runtime.

use std::sync::Arc;

use async_trait::async_trait;

use jarvis_agent::{AssistantRuntime, IncomingMessage};
use jarvis_core::domain::conversation::{ConversationId, UserId};
use jarvis_core::errors::ApplicationError;
use jarvis_telegram::{
    CommandPayload, CommandRouteError, CommandService, EventContext, EventHandlerError,
    TextMessageEvent, TextMessageService,
};

const LOGIN_LINK_PREFIX: &str = "Abre este enlace para conectar tu cuenta de Google:";
const LOGGED_OUT: &str = "Listo, desconecté tu cuenta de Google.";
const NOT_LOGGED_IN: &str = "No tenías una cuenta de Google conectada.";

#[derive(Clone)]
pub struct AssistantCommands {
    runtime: Arc<AssistantRuntime>,
}

impl AssistantCommands {
    pub fn new(runtime: Arc<AssistantRuntime>) -> Self {
        Self { runtime }
    }
}

fn apology(error: ApplicationError, ctx: &EventContext) -> String {
    tracing::warn!(
        event_name = "assistant.command_failed",
        correlation_id = %ctx.correlation_id,
        error = %error,
        "command failed"
    );
    error.into_interface(ctx.correlation_id.clone()).user_message().to_owned()
}

#[async_trait]
impl CommandService for AssistantCommands {
    async fn login(
        &self,
        payload: &CommandPayload,
        ctx: &EventContext,
    ) -> Result<String, CommandRouteError> {
        let user_id = UserId::from(payload.user_id);
        let conversation_id = ConversationId::from(payload.chat_id);
        Ok(match self.runtime.login().begin(&user_id, &conversation_id).await {
            Ok(url) => format!("{LOGIN_LINK_PREFIX}\n{url}"),
            Err(error) => apology(error, ctx),
        })
    }

    async fn logout(
        &self,
        payload: &CommandPayload,
        ctx: &EventContext,
    ) -> Result<String, CommandRouteError> {
        Ok(match self.runtime.login().logout(&UserId::from(payload.user_id)).await {
            Ok(true) => LOGGED_OUT.to_owned(),
            Ok(false) => NOT_LOGGED_IN.to_owned(),
            Err(error) => apology(error, ctx),
        })
    }

    async fn cancel(
        &self,
        payload: &CommandPayload,
        ctx: &EventContext,
    ) -> Result<String, CommandRouteError> {
        Ok(match self.runtime.cancel_pending(&ConversationId::from(payload.chat_id)).await {
            Ok(reply) => reply.render(),
            Err(error) => apology(error, ctx),
        })
    }
}

#[derive(Clone)]
pub struct AssistantMessages {
    runtime: Arc<AssistantRuntime>,
}

impl AssistantMessages {
    pub fn new(runtime: Arc<AssistantRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl TextMessageService for AssistantMessages {
    async fn handle_text_message(
        &self,
        event: &TextMessageEvent,
        ctx: &EventContext,
    ) -> Result<Option<String>, EventHandlerError> {
        let message = IncomingMessage {
            conversation_id: ConversationId::from(event.chat_id),
            user_id: UserId::from(event.user_id),
            text: event.text.clone(),
            correlation_id: ctx.correlation_id.clone(),
        };
        Ok(self.runtime.handle_message(&message).await.map(|reply| reply.render()))
    }
}
