use async_trait::async_trait;
use thiserror::Error;

use crate::events::EventContext;

pub const START_GREETING: &str = "Jarvis operativo. Dime 'hola' para probar.";

pub const HELP_TEXT: &str = "Puedo agendar reuniones, crear tareas y contarte tu agenda.\n\
Ejemplos:\n\
- \"reunión con Ana mañana a las 15:00\"\n\
- \"recuérdame pagar la luz el viernes\"\n\
- \"¿qué tengo hoy?\"\n\
Comandos: /login, /logout, /cancelar, /ayuda";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandPayload {
    pub text: String,
    pub chat_id: i64,
    pub user_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Login,
    Logout,
    Cancel,
    Unknown { name: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("command service failed: {0}")]
    Service(String),
}

/// Parses the leading `/command[@botname]` token; arguments are ignored.
pub fn parse_command(text: &str) -> BotCommand {
    let token = text.split_whitespace().next().unwrap_or_default();
    let name = token.trim_start_matches('/');
    let name = name.split('@').next().unwrap_or_default().to_lowercase();

    match name.as_str() {
        "start" => BotCommand::Start,
        "ayuda" | "help" => BotCommand::Help,
        "login" => BotCommand::Login,
        "logout" => BotCommand::Logout,
        "cancelar" | "cancel" => BotCommand::Cancel,
        _ => BotCommand::Unknown { name },
    }
}

#[async_trait]
pub trait CommandService: Send + Sync {
    async fn login(
        &self,
        payload: &CommandPayload,
        ctx: &EventContext,
    ) -> Result<String, CommandRouteError>;

    async fn logout(
        &self,
        payload: &CommandPayload,
        ctx: &EventContext,
    ) -> Result<String, CommandRouteError>;

    async fn cancel(
        &self,
        payload: &CommandPayload,
        ctx: &EventContext,
    ) -> Result<String, CommandRouteError>;
}

pub struct CommandRouter<S> {
    service: S,
}

impl<S> CommandRouter<S>
where
    S: CommandService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn route(
        &self,
        payload: &CommandPayload,
        ctx: &EventContext,
    ) -> Result<String, CommandRouteError> {
        match parse_command(&payload.text) {
            BotCommand::Start => Ok(START_GREETING.to_owned()),
            BotCommand::Help => Ok(HELP_TEXT.to_owned()),
            BotCommand::Login => self.service.login(payload, ctx).await,
            BotCommand::Logout => self.service.logout(payload, ctx).await,
            BotCommand::Cancel => self.service.cancel(payload, ctx).await,
            BotCommand::Unknown { name } => {
                Ok(format!("No conozco el comando /{name}. Prueba con /ayuda."))
            }
        }
    }
}
