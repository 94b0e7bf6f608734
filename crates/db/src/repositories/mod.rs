use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use jarvis_core::domain::conversation::{ConversationId, PendingMeeting, UserId};
use jarvis_core::domain::credential::{Credential, OAuthStateGrant};

pub mod conversation;
pub mod credential;
pub mod memory;
pub mod oauth_state;

pub use conversation::SqlConversationStateStore;
pub use credential::SqlCredentialStore;
pub use memory::{InMemoryConversationStateStore, InMemoryCredentialStore, InMemoryOAuthStateStore};
pub use oauth_state::SqlOAuthStateStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// At most one pending meeting per conversation.
#[async_trait]
pub trait ConversationStateStore: Send + Sync {
    async fn get(&self, id: &ConversationId) -> Result<Option<PendingMeeting>, RepositoryError>;
    async fn set(&self, id: &ConversationId, pending: PendingMeeting)
        -> Result<(), RepositoryError>;
    /// Returns whether an entry was removed.
    async fn delete(&self, id: &ConversationId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, user_id: &UserId) -> Result<Option<Credential>, RepositoryError>;
    async fn set(&self, user_id: &UserId, credential: Credential) -> Result<(), RepositoryError>;
    async fn delete(&self, user_id: &UserId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait OAuthStateStore: Send + Sync {
    async fn issue(&self, grant: OAuthStateGrant) -> Result<(), RepositoryError>;
    /// Removes the grant and returns it if it has not expired yet.
    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OAuthStateGrant>, RepositoryError>;
}

pub(crate) fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn decode_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("{column}: {error}")))
}

pub(crate) fn decode_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}
