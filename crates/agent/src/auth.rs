//! Chat-driven Google login: consent link, OAuth callback, logout and
//! credential refresh.

use std::sync::Arc;

use jarvis_core::datetime::Clock;
use jarvis_core::domain::conversation::{ConversationId, UserId};
use jarvis_core::domain::credential::{Credential, OAuthStateGrant};
use jarvis_core::errors::ApplicationError;
use jarvis_core::gateway::{GatewayError, OAuthProvider};
use jarvis_db::repositories::{CredentialStore, OAuthStateStore, RepositoryError};

pub(crate) fn persistence(error: RepositoryError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedLogin {
    pub user_id: UserId,
    pub conversation_id: ConversationId,
}

pub struct LoginFlow {
    provider: Arc<dyn OAuthProvider>,
    credentials: Arc<dyn CredentialStore>,
    states: Arc<dyn OAuthStateStore>,
    clock: Arc<dyn Clock>,
}

impl LoginFlow {
    pub fn new(
        provider: Arc<dyn OAuthProvider>,
        credentials: Arc<dyn CredentialStore>,
        states: Arc<dyn OAuthStateStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { provider, credentials, states, clock }
    }

    /// Issues a one-shot state and returns the consent URL carrying it.
    pub async fn begin(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<String, ApplicationError> {
        let grant =
            OAuthStateGrant::issue(user_id.clone(), conversation_id.clone(), self.clock.now());
        let url = self.provider.authorization_url(&grant.token);
        self.states.issue(grant).await.map_err(persistence)?;
        tracing::info!(
            event_name = "auth.login_started",
            user_id = %user_id,
            conversation_id = %conversation_id,
            "login link issued"
        );
        Ok(url)
    }

    /// Consumes the state, exchanges the code and stores the credential.
    /// Unknown, replayed or expired states yield `Ok(None)`.
    pub async fn complete(
        &self,
        state: &str,
        code: &str,
    ) -> Result<Option<CompletedLogin>, ApplicationError> {
        let Some(grant) = self.states.consume(state, self.clock.now()).await.map_err(persistence)?
        else {
            tracing::warn!(event_name = "auth.state_rejected", "unknown or expired oauth state");
            return Ok(None);
        };

        let credential = self.provider.exchange_code(code).await?;
        self.credentials.set(&grant.user_id, credential).await.map_err(persistence)?;
        tracing::info!(
            event_name = "auth.login_completed",
            user_id = %grant.user_id,
            conversation_id = %grant.conversation_id,
            "credential stored"
        );
        Ok(Some(CompletedLogin { user_id: grant.user_id, conversation_id: grant.conversation_id }))
    }

    pub async fn logout(&self, user_id: &UserId) -> Result<bool, ApplicationError> {
        self.credentials.delete(user_id).await.map_err(persistence)
    }

    /// Loads the user's credential, refreshing it first when it is about to
    /// expire. A rejected refresh forgets the credential.
    pub async fn credential_for(&self, user_id: &UserId) -> Result<Credential, ApplicationError> {
        let missing = || ApplicationError::AuthMissing { user_id: user_id.to_string() };
        let credential =
            self.credentials.get(user_id).await.map_err(persistence)?.ok_or_else(missing)?;

        if !credential.needs_refresh(self.clock.now()) || credential.refresh_token.is_none() {
            return Ok(credential);
        }

        match self.provider.refresh(&credential).await {
            Ok(refreshed) => {
                self.credentials.set(user_id, refreshed.clone()).await.map_err(persistence)?;
                Ok(refreshed)
            }
            Err(GatewayError::Unauthorized) => {
                tracing::warn!(
                    event_name = "auth.refresh_rejected",
                    user_id = %user_id,
                    "refresh token rejected; credential dropped"
                );
                self.credentials.delete(user_id).await.map_err(persistence)?;
                Err(missing())
            }
            Err(error) => Err(error.into()),
        }
    }
}
