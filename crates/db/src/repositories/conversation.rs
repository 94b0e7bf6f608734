use chrono::NaiveDate;
use sqlx::Row;

use jarvis_core::domain::conversation::{Awaiting, ConversationId, PendingMeeting};

use super::{
    decode_error, decode_timestamp, encode_timestamp, ConversationStateStore, RepositoryError,
};
use crate::DbPool;

pub struct SqlConversationStateStore {
    pool: DbPool,
}

impl SqlConversationStateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_pending(row: &sqlx::sqlite::SqliteRow) -> Result<PendingMeeting, RepositoryError> {
    let title: String = row.try_get("title").map_err(decode_error)?;
    let resolved_date: Option<String> = row.try_get("resolved_date").map_err(decode_error)?;
    let awaiting: String = row.try_get("awaiting").map_err(decode_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(decode_error)?;

    let resolved_date = resolved_date
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| RepositoryError::Decode(format!("resolved_date: {e}")))
        })
        .transpose()?;
    let awaiting = Awaiting::parse(&awaiting)
        .ok_or_else(|| RepositoryError::Decode(format!("awaiting: unknown value `{awaiting}`")))?;

    if awaiting == Awaiting::Time && resolved_date.is_none() {
        return Err(RepositoryError::Decode(
            "awaiting time without a resolved date".to_owned(),
        ));
    }

    Ok(PendingMeeting {
        title,
        resolved_date,
        awaiting,
        updated_at: decode_timestamp("updated_at", &updated_at)?,
    })
}

#[async_trait::async_trait]
impl ConversationStateStore for SqlConversationStateStore {
    async fn get(&self, id: &ConversationId) -> Result<Option<PendingMeeting>, RepositoryError> {
        let row = sqlx::query(
            "SELECT title, resolved_date, awaiting, updated_at
             FROM conversation_state WHERE conversation_id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_pending).transpose()
    }

    async fn set(
        &self,
        id: &ConversationId,
        pending: PendingMeeting,
    ) -> Result<(), RepositoryError> {
        let resolved_date = pending.resolved_date.map(|date| date.format("%Y-%m-%d").to_string());

        sqlx::query(
            "INSERT INTO conversation_state (conversation_id, title, resolved_date, awaiting, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(conversation_id) DO UPDATE SET
                 title = excluded.title,
                 resolved_date = excluded.resolved_date,
                 awaiting = excluded.awaiting,
                 updated_at = excluded.updated_at",
        )
        .bind(&id.0)
        .bind(&pending.title)
        .bind(&resolved_date)
        .bind(pending.awaiting.as_str())
        .bind(encode_timestamp(pending.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM conversation_state WHERE conversation_id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
