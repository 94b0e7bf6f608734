//! Google Tasks API v1.

use chrono::NaiveDate;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use jarvis_core::domain::credential::Credential;
use jarvis_core::domain::task::{order_pending, NewTask, TaskSummary};
use jarvis_core::gateway::{GatewayError, TaskGateway};

use crate::{endpoint, ensure_success, GoogleApiError, TASKS_API_BASE};

#[derive(Debug, Serialize)]
struct TaskInsert<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskListResponse {
    #[serde(default)]
    items: Vec<GoogleTaskRaw>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleTaskRaw {
    #[serde(default)]
    title: String,
    #[serde(default)]
    due: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub struct GoogleTasksClient {
    http: reqwest::Client,
    base_url: String,
    task_list_id: String,
}

impl GoogleTasksClient {
    pub fn new(http: reqwest::Client, task_list_id: impl Into<String>) -> Self {
        Self { http, base_url: TASKS_API_BASE.to_owned(), task_list_id: task_list_id.into() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn insert(&self, credential: &Credential, task: &NewTask) -> Result<(), GoogleApiError> {
        let url = endpoint(&self.base_url, &["lists", &self.task_list_id, "tasks"])?;
        let body = TaskInsert { title: &task.title, due: task.due.map(encode_due) };
        let response = self
            .http
            .post(url)
            .bearer_auth(credential.access_token.expose_secret())
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn fetch_pending(&self, credential: &Credential) -> Result<Vec<TaskSummary>, GoogleApiError> {
        let url = endpoint(&self.base_url, &["lists", &self.task_list_id, "tasks"])?;
        let mut tasks = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(url.clone())
                .bearer_auth(credential.access_token.expose_secret())
                .query(&[("showCompleted", "false"), ("showHidden", "false"), ("maxResults", "100")]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: TaskListResponse = ensure_success(request.send().await?).await?.json().await?;
            tasks.extend(summarize(page.items));

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        order_pending(&mut tasks);
        Ok(tasks)
    }
}

#[async_trait::async_trait]
impl TaskGateway for GoogleTasksClient {
    async fn create_task(&self, credential: &Credential, task: &NewTask) -> Result<(), GatewayError> {
        self.insert(credential, task).await?;
        tracing::info!(
            event_name = "google.tasks.task_created",
            has_due = task.due.is_some(),
            "task created"
        );
        Ok(())
    }

    async fn list_pending(&self, credential: &Credential) -> Result<Vec<TaskSummary>, GatewayError> {
        Ok(self.fetch_pending(credential).await?)
    }
}

/// The Tasks API only keeps the date part of `due`.
fn encode_due(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

fn decode_due(raw: &str) -> Option<NaiveDate> {
    raw.get(..10).and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
}

fn summarize(items: Vec<GoogleTaskRaw>) -> Vec<TaskSummary> {
    items
        .into_iter()
        .filter(|item| item.status.as_deref() != Some("completed"))
        .filter(|item| !item.title.trim().is_empty())
        .map(|item| TaskSummary { due: item.due.as_deref().and_then(decode_due), title: item.title })
        .collect()
}
