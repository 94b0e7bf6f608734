//! Telegram Bot API interface for Jarvis
//!
//! - **Events** (`events`) - `Update` payloads, envelopes and the handler dispatcher
//! - **Commands** (`commands`) - `/start`, `/ayuda`, `/login`, `/logout`, `/cancelar`
//! - **Client** (`client`) - `sendMessage` transport and the update processor
//!
//! # Architecture
//!
//! ```text
//! Webhook Update → UpdateProcessor → EventDispatcher → Handlers → Assistant runtime
//!                        ↓
//!                 sendMessage ← reply text
//! ```

pub mod client;
pub mod commands;
pub mod events;

pub use client::{BotApi, TelegramClient, TransportError, UpdateProcessor};
pub use commands::{BotCommand, CommandPayload, CommandRouteError, CommandService};
pub use events::{
    assistant_dispatcher, BotEnvelope, BotEvent, EventContext, EventDispatcher,
    EventHandlerError, HandlerResult, TextMessageEvent, TextMessageService, Update,
};
