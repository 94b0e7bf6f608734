use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;

use crate::domain::conversation::{ConversationId, UserId};

/// Opaque access/refresh token pair for one user's Google account.
#[derive(Clone, Debug)]
pub struct Credential {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into().into(), refresh_token: None, expires_at: None }
    }

    /// Tokens within a minute of expiry count as expired.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - Duration::seconds(60) <= now,
            None => false,
        }
    }
}

/// One-shot login state binding an OAuth callback to the chat that asked for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthStateGrant {
    pub token: String,
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub expires_at: DateTime<Utc>,
}

impl OAuthStateGrant {
    pub const LIFETIME_MINUTES: i64 = 10;

    pub fn issue(user_id: UserId, conversation_id: ConversationId, now: DateTime<Utc>) -> Self {
        Self {
            token: uuid::Uuid::new_v4().simple().to_string(),
            user_id,
            conversation_id,
            expires_at: now + Duration::minutes(Self::LIFETIME_MINUTES),
        }
    }
}
