use secrecy::{ExposeSecret, SecretString};
use sqlx::Row;

use jarvis_core::domain::conversation::UserId;
use jarvis_core::domain::credential::Credential;

use super::{decode_error, decode_timestamp, encode_timestamp, CredentialStore, RepositoryError};
use crate::DbPool;

pub struct SqlCredentialStore {
    pool: DbPool,
}

impl SqlCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_credential(row: &sqlx::sqlite::SqliteRow) -> Result<Credential, RepositoryError> {
    let access_token: String = row.try_get("access_token").map_err(decode_error)?;
    let refresh_token: Option<String> = row.try_get("refresh_token").map_err(decode_error)?;
    let expires_at: Option<String> = row.try_get("expires_at").map_err(decode_error)?;

    Ok(Credential {
        access_token: SecretString::from(access_token),
        refresh_token: refresh_token.map(SecretString::from),
        expires_at: expires_at.map(|raw| decode_timestamp("expires_at", &raw)).transpose()?,
    })
}

#[async_trait::async_trait]
impl CredentialStore for SqlCredentialStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<Credential>, RepositoryError> {
        let row = sqlx::query(
            "SELECT access_token, refresh_token, expires_at FROM credential WHERE user_id = ?",
        )
        .bind(&user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_credential).transpose()
    }

    async fn set(&self, user_id: &UserId, credential: Credential) -> Result<(), RepositoryError> {
        let refresh_token = credential.refresh_token.as_ref().map(|token| token.expose_secret());

        // A refresh response may omit the refresh token; keep the stored one.
        sqlx::query(
            "INSERT INTO credential (user_id, access_token, refresh_token, expires_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 access_token = excluded.access_token,
                 refresh_token = COALESCE(excluded.refresh_token, credential.refresh_token),
                 expires_at = excluded.expires_at,
                 updated_at = excluded.updated_at",
        )
        .bind(&user_id.0)
        .bind(credential.access_token.expose_secret())
        .bind(refresh_token)
        .bind(credential.expires_at.map(encode_timestamp))
        .bind(encode_timestamp(chrono::Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM credential WHERE user_id = ?")
            .bind(&user_id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
