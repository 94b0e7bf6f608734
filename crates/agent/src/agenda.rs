use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use jarvis_core::domain::calendar::EventSummary;
use jarvis_core::domain::task::TaskSummary;

/// One day's view: calendar events, tasks due that day, and a capped list of
/// undated tasks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgendaDigest {
    pub day: NaiveDate,
    pub events: Vec<EventSummary>,
    pub due_tasks: Vec<TaskSummary>,
    pub undated_tasks: Vec<TaskSummary>,
}

impl AgendaDigest {
    pub fn build(
        day: NaiveDate,
        events: Vec<EventSummary>,
        pending_tasks: Vec<TaskSummary>,
        undated_limit: usize,
    ) -> Self {
        let (undated, dated): (Vec<_>, Vec<_>) =
            pending_tasks.into_iter().partition(|task| task.due.is_none());
        let due_tasks = dated.into_iter().filter(|task| task.due == Some(day)).collect();

        Self {
            day,
            events,
            due_tasks,
            undated_tasks: undated.into_iter().take(undated_limit).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.due_tasks.is_empty() && self.undated_tasks.is_empty()
    }
}

/// Half-open local wall-clock bounds `[00:00, next day 00:00)`.
pub fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(chrono::NaiveTime::MIN);
    (start, start + Duration::days(1))
}
