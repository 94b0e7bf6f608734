//! Google Calendar API v3: event insertion and day listing.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Value};

use jarvis_core::domain::calendar::{CreatedEvent, EventSummary, NewCalendarEvent};
use jarvis_core::domain::credential::Credential;
use jarvis_core::gateway::{CalendarGateway, GatewayError};

use crate::{endpoint, ensure_success, GoogleApiError, CALENDAR_API_BASE};

const UNTITLED_EVENT: &str = "(sin título)";
const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<GoogleEventRaw>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventRaw {
    #[serde(default)]
    summary: Option<String>,
    start: Option<EventDateTime>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    id: String,
    #[serde(default)]
    html_link: Option<String>,
}

pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
    calendar_id: String,
    timezone: Tz,
}

impl GoogleCalendarClient {
    pub fn new(http: reqwest::Client, calendar_id: impl Into<String>, timezone: Tz) -> Self {
        Self { http, base_url: CALENDAR_API_BASE.to_owned(), calendar_id: calendar_id.into(), timezone }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn insert(
        &self,
        credential: &Credential,
        event: &NewCalendarEvent,
    ) -> Result<CreatedEvent, GoogleApiError> {
        let url = endpoint(&self.base_url, &["calendars", &self.calendar_id, "events"])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(credential.access_token.expose_secret())
            .json(&event_body(event, self.timezone))
            .send()
            .await?;
        let inserted: InsertedEvent = ensure_success(response).await?.json().await?;
        Ok(CreatedEvent { id: inserted.id, link: inserted.html_link })
    }

    async fn fetch_day(
        &self,
        credential: &Credential,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> Result<Vec<EventSummary>, GoogleApiError> {
        let url = endpoint(&self.base_url, &["calendars", &self.calendar_id, "events"])?;
        let time_min = localize(self.timezone, day_start)?.to_rfc3339();
        let time_max = localize(self.timezone, day_end)?.to_rfc3339();
        let timezone = self.timezone.name();

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .http
                .get(url.clone())
                .bearer_auth(credential.access_token.expose_secret())
                .query(&[
                    ("timeMin", time_min.as_str()),
                    ("timeMax", time_max.as_str()),
                    ("timeZone", timezone),
                    ("singleEvents", "true"),
                    ("orderBy", "startTime"),
                    ("maxResults", "250"),
                ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: EventListResponse = ensure_success(request.send().await?).await?.json().await?;
            events.extend(summarize(page.items, self.timezone));

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(events)
    }
}

#[async_trait::async_trait]
impl CalendarGateway for GoogleCalendarClient {
    async fn create_event(
        &self,
        credential: &Credential,
        event: &NewCalendarEvent,
    ) -> Result<CreatedEvent, GatewayError> {
        let created = self.insert(credential, event).await?;
        tracing::info!(
            event_name = "google.calendar.event_created",
            event_id = %created.id,
            "calendar event created"
        );
        Ok(created)
    }

    async fn list_events(
        &self,
        credential: &Credential,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> Result<Vec<EventSummary>, GatewayError> {
        Ok(self.fetch_day(credential, day_start, day_end).await?)
    }
}

fn event_body(event: &NewCalendarEvent, timezone: Tz) -> Value {
    let overrides: Vec<Value> = event
        .reminder_offsets_minutes
        .iter()
        .map(|minutes| json!({ "method": "popup", "minutes": minutes }))
        .collect();

    json!({
        "summary": event.title,
        "start": {
            "dateTime": event.start.format(LOCAL_FORMAT).to_string(),
            "timeZone": timezone.name(),
        },
        "end": {
            "dateTime": event.end.format(LOCAL_FORMAT).to_string(),
            "timeZone": timezone.name(),
        },
        "reminders": { "useDefault": false, "overrides": overrides },
    })
}

fn localize(timezone: Tz, local: NaiveDateTime) -> Result<DateTime<Tz>, GoogleApiError> {
    timezone
        .from_local_datetime(&local)
        .earliest()
        .or_else(|| timezone.from_local_datetime(&(local + chrono::Duration::hours(1))).earliest())
        .ok_or_else(|| GoogleApiError::Payload(format!("{local} does not exist in {timezone}")))
}

/// Drops cancelled events; all-day events carry no start time.
fn summarize(items: Vec<GoogleEventRaw>, timezone: Tz) -> Vec<EventSummary> {
    items
        .into_iter()
        .filter(|item| item.status.as_deref() != Some("cancelled"))
        .map(|item| {
            let start = item
                .start
                .as_ref()
                .and_then(|start| start.date_time.as_deref())
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|instant| instant.with_timezone(&timezone).naive_local());
            EventSummary {
                title: item
                    .summary
                    .filter(|summary| !summary.trim().is_empty())
                    .unwrap_or_else(|| UNTITLED_EVENT.to_owned()),
                start,
            }
        })
        .collect()
}
