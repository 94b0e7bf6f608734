use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use jarvis_core::domain::conversation::{ConversationId, PendingMeeting, UserId};
use jarvis_core::domain::credential::{Credential, OAuthStateGrant};

use super::{ConversationStateStore, CredentialStore, OAuthStateStore, RepositoryError};

#[derive(Default)]
pub struct InMemoryConversationStateStore {
    pending: RwLock<HashMap<ConversationId, PendingMeeting>>,
}

#[async_trait::async_trait]
impl ConversationStateStore for InMemoryConversationStateStore {
    async fn get(&self, id: &ConversationId) -> Result<Option<PendingMeeting>, RepositoryError> {
        let pending = self.pending.read().await;
        Ok(pending.get(id).cloned())
    }

    async fn set(
        &self,
        id: &ConversationId,
        meeting: PendingMeeting,
    ) -> Result<(), RepositoryError> {
        let mut pending = self.pending.write().await;
        pending.insert(id.clone(), meeting);
        Ok(())
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, RepositoryError> {
        let mut pending = self.pending.write().await;
        Ok(pending.remove(id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<HashMap<UserId, Credential>>,
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<Credential>, RepositoryError> {
        let credentials = self.credentials.read().await;
        Ok(credentials.get(user_id).cloned())
    }

    async fn set(&self, user_id: &UserId, credential: Credential) -> Result<(), RepositoryError> {
        let mut credentials = self.credentials.write().await;
        credentials.insert(user_id.clone(), credential);
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<bool, RepositoryError> {
        let mut credentials = self.credentials.write().await;
        Ok(credentials.remove(user_id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryOAuthStateStore {
    grants: RwLock<HashMap<String, OAuthStateGrant>>,
}

#[async_trait::async_trait]
impl OAuthStateStore for InMemoryOAuthStateStore {
    async fn issue(&self, grant: OAuthStateGrant) -> Result<(), RepositoryError> {
        let mut grants = self.grants.write().await;
        grants.retain(|_, existing| existing.expires_at > Utc::now());
        grants.insert(grant.token.clone(), grant);
        Ok(())
    }

    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OAuthStateGrant>, RepositoryError> {
        let mut grants = self.grants.write().await;
        Ok(grants.remove(token).filter(|grant| grant.expires_at > now))
    }
}
