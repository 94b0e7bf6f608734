use chrono::{DateTime, Utc};
use sqlx::Row;

use jarvis_core::domain::conversation::{ConversationId, UserId};
use jarvis_core::domain::credential::OAuthStateGrant;

use super::{decode_error, decode_timestamp, encode_timestamp, OAuthStateStore, RepositoryError};
use crate::DbPool;

pub struct SqlOAuthStateStore {
    pool: DbPool,
}

impl SqlOAuthStateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl OAuthStateStore for SqlOAuthStateStore {
    async fn issue(&self, grant: OAuthStateGrant) -> Result<(), RepositoryError> {
        let now = encode_timestamp(Utc::now());

        sqlx::query("DELETE FROM oauth_state WHERE expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "INSERT INTO oauth_state (token, user_id, conversation_id, expires_at, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&grant.token)
        .bind(&grant.user_id.0)
        .bind(&grant.conversation_id.0)
        .bind(encode_timestamp(grant.expires_at))
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OAuthStateGrant>, RepositoryError> {
        let row = sqlx::query(
            "DELETE FROM oauth_state WHERE token = ?
             RETURNING token, user_id, conversation_id, expires_at",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: String = row.try_get("expires_at").map_err(decode_error)?;
        let grant = OAuthStateGrant {
            token: row.try_get("token").map_err(decode_error)?,
            user_id: UserId(row.try_get("user_id").map_err(decode_error)?),
            conversation_id: ConversationId(row.try_get("conversation_id").map_err(decode_error)?),
            expires_at: decode_timestamp("expires_at", &expires_at)?,
        };

        Ok((grant.expires_at > now).then_some(grant))
    }
}
