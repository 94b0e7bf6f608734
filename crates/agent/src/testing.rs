//! In-memory gateway doubles shared by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use secrecy::ExposeSecret;

use jarvis_core::domain::calendar::{CreatedEvent, EventSummary, NewCalendarEvent};
use jarvis_core::domain::credential::Credential;
use jarvis_core::domain::task::{NewTask, TaskSummary};
use jarvis_core::gateway::{CalendarGateway, GatewayError, OAuthProvider, TaskGateway};

#[derive(Default)]
pub struct FakeOAuth {
    exchanges: AtomicUsize,
}

impl FakeOAuth {
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthProvider for FakeOAuth {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://auth.test/consent?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential, GatewayError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        Ok(Credential::new(format!("token-for-{code}")))
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential, GatewayError> {
        match credential.refresh_token.as_ref().map(|token| token.expose_secret()) {
            Some("revoked") | None => Err(GatewayError::Unauthorized),
            Some(_) => Ok(Credential::new("refreshed")),
        }
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    pub created: Mutex<Vec<NewCalendarEvent>>,
    pub listed: AtomicUsize,
    pub events: Vec<EventSummary>,
    pub failure: Option<GatewayError>,
}

impl FakeCalendar {
    pub fn created(&self) -> Vec<NewCalendarEvent> {
        self.created.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.created().len() + self.listed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarGateway for FakeCalendar {
    async fn create_event(
        &self,
        _credential: &Credential,
        event: &NewCalendarEvent,
    ) -> Result<CreatedEvent, GatewayError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let mut created = self.created.lock().map_err(|e| GatewayError::Transport(e.to_string()))?;
        created.push(event.clone());
        Ok(CreatedEvent {
            id: format!("evt-{}", created.len()),
            link: Some(format!("https://calendar.test/evt-{}", created.len())),
        })
    }

    async fn list_events(
        &self,
        _credential: &Credential,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> Result<Vec<EventSummary>, GatewayError> {
        self.listed.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        Ok(self
            .events
            .iter()
            .filter(|event| event.start.map_or(true, |start| start >= day_start && start < day_end))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct FakeTasks {
    pub created: Mutex<Vec<NewTask>>,
    pub pending: Vec<TaskSummary>,
    pub failure: Option<GatewayError>,
}

impl FakeTasks {
    pub fn created(&self) -> Vec<NewTask> {
        self.created.lock().map(|tasks| tasks.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TaskGateway for FakeTasks {
    async fn create_task(&self, _credential: &Credential, task: &NewTask) -> Result<(), GatewayError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let mut created = self.created.lock().map_err(|e| GatewayError::Transport(e.to_string()))?;
        created.push(task.clone());
        Ok(())
    }

    async fn list_pending(&self, _credential: &Credential) -> Result<Vec<TaskSummary>, GatewayError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        Ok(self.pending.clone())
    }
}
