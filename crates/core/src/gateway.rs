//! Narrow contracts for the calendar, task and OAuth backends.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::domain::calendar::{CreatedEvent, EventSummary, NewCalendarEvent};
use crate::domain::credential::Credential;
use crate::domain::task::{NewTask, TaskSummary};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("credential was rejected by the provider")]
    Unauthorized,
    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected provider payload: {0}")]
    Decode(String),
}

#[async_trait]
pub trait CalendarGateway: Send + Sync {
    async fn create_event(
        &self,
        credential: &Credential,
        event: &NewCalendarEvent,
    ) -> Result<CreatedEvent, GatewayError>;

    /// Events overlapping `[day_start, day_end)`, ordered by start time.
    async fn list_events(
        &self,
        credential: &Credential,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> Result<Vec<EventSummary>, GatewayError>;
}

#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn create_task(&self, credential: &Credential, task: &NewTask)
        -> Result<(), GatewayError>;

    /// Incomplete tasks, undated ones first.
    async fn list_pending(&self, credential: &Credential) -> Result<Vec<TaskSummary>, GatewayError>;
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn authorization_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<Credential, GatewayError>;

    async fn refresh(&self, credential: &Credential) -> Result<Credential, GatewayError>;
}
