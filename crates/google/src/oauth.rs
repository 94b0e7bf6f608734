//! OAuth2 web-server flow: consent URL, code exchange and refresh.

use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use jarvis_core::domain::credential::Credential;
use jarvis_core::gateway::{GatewayError, OAuthProvider};

use crate::{GoogleApiError, AUTH_ENDPOINT, SCOPES, TOKEN_ENDPOINT};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_credential(self) -> Credential {
        let expires_in = self.expires_in.unwrap_or(3600);
        Credential {
            access_token: SecretString::from(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::from),
            expires_at: Some(Utc::now() + Duration::seconds(expires_in)),
        }
    }
}

pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_url: String,
    token_endpoint: String,
}

impl GoogleOAuthClient {
    pub fn new(
        http: reqwest::Client,
        client_id: impl Into<String>,
        client_secret: SecretString,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            client_id: client_id.into(),
            client_secret,
            redirect_url: redirect_url.into(),
            token_endpoint: TOKEN_ENDPOINT.to_owned(),
        }
    }

    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<Credential, GoogleApiError> {
        let response = self.http.post(&self.token_endpoint).form(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleApiError::TokenExchange(format!("{status}: {body}")));
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.into_credential())
    }
}

#[async_trait::async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        let scope = SCOPES.join(" ");
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ];
        match reqwest::Url::parse_with_params(AUTH_ENDPOINT, &params) {
            Ok(url) => url.to_string(),
            Err(_) => AUTH_ENDPOINT.to_owned(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential, GatewayError> {
        let credential = self
            .request_token(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await?;
        tracing::info!(event_name = "google.oauth.code_exchanged", "oauth code exchanged");
        Ok(credential)
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential, GatewayError> {
        let Some(refresh_token) = credential.refresh_token.as_ref() else {
            return Err(GatewayError::Unauthorized);
        };

        let mut refreshed = self
            .request_token(&[
                ("refresh_token", refresh_token.expose_secret()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token.clone());
        }
        tracing::debug!(event_name = "google.oauth.token_refreshed", "access token refreshed");
        Ok(refreshed)
    }
}
