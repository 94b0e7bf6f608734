//! Assistant runtime: turns one chat message into at most one calendar or
//! task side effect and exactly one reply.
//!
//! The pipeline per message:
//! 1. **Credential lookup** (`auth`) - no Google credential means a login prompt
//! 2. **Fact extraction** - date and time-of-day via the core resolver
//! 3. **Intent classification** (`conversation`) - ordered keyword rules
//! 4. **Dialogue transition** - the core meeting state machine
//! 5. **Side effect and reply** (`runtime`, `replies`)
//!
//! Messages of one conversation are serialized (`locks`); different
//! conversations proceed concurrently.

pub mod agenda;
pub mod auth;
pub mod conversation;
pub mod locks;
pub mod replies;
pub mod runtime;

#[cfg(test)]
mod testing;

pub use agenda::AgendaDigest;
pub use auth::{CompletedLogin, LoginFlow};
pub use conversation::{IntentClassifier, IntentKind, IntentRule};
pub use replies::AssistantReply;
pub use runtime::{AssistantRuntime, IncomingMessage, RuntimeSettings};
