//! Google Calendar v3, Google Tasks v1 and OAuth2 clients behind the
//! gateway traits of `jarvis-core`.

pub mod calendar;
pub mod oauth;
pub mod tasks;

use std::time::Duration;

use jarvis_core::gateway::GatewayError;

pub use calendar::GoogleCalendarClient;
pub use oauth::GoogleOAuthClient;
pub use tasks::GoogleTasksClient;

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const TASKS_API_BASE: &str = "https://tasks.googleapis.com/tasks/v1";
pub const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.events",
    "https://www.googleapis.com/auth/tasks",
];

#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token expired or revoked")]
    AuthExpired,
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("unexpected payload: {0}")]
    Payload(String),
    #[error("invalid endpoint URL: {0}")]
    Url(String),
}

impl From<GoogleApiError> for GatewayError {
    fn from(value: GoogleApiError) -> Self {
        match value {
            GoogleApiError::AuthExpired => Self::Unauthorized,
            GoogleApiError::ApiError { status, message } => Self::Api { status, message },
            GoogleApiError::Http(error) if error.is_decode() => Self::Decode(error.to_string()),
            GoogleApiError::Http(error) => Self::Transport(error.to_string()),
            GoogleApiError::TokenExchange(message) => Self::Api { status: 400, message },
            GoogleApiError::Payload(message) => Self::Decode(message),
            GoogleApiError::Url(message) => Self::Transport(message),
        }
    }
}

/// Appends percent-encoded path segments to an API base URL.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<reqwest::Url, GoogleApiError> {
    let mut url = reqwest::Url::parse(base).map_err(|e| GoogleApiError::Url(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| GoogleApiError::Url(format!("{base} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Builds the shared HTTP client with the configured request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Maps non-success responses to `GoogleApiError`, 401 becoming `AuthExpired`.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, GoogleApiError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GoogleApiError::AuthExpired);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GoogleApiError::ApiError { status: status.as_u16(), message: body });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use jarvis_core::gateway::GatewayError;

    use super::GoogleApiError;

    #[test]
    fn endpoint_encodes_calendar_ids() {
        let url = super::endpoint(super::CALENDAR_API_BASE, &["calendars", "team@group.x", "events"])
            .expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team@group.x/events"
        );
    }

    #[test]
    fn auth_expired_maps_to_unauthorized() {
        assert_eq!(GatewayError::from(GoogleApiError::AuthExpired), GatewayError::Unauthorized);
    }

    #[test]
    fn api_error_keeps_status_and_body() {
        let mapped = GatewayError::from(GoogleApiError::ApiError {
            status: 403,
            message: "insufficientPermissions".to_owned(),
        });
        assert_eq!(
            mapped,
            GatewayError::Api { status: 403, message: "insufficientPermissions".to_owned() }
        );
    }
}
