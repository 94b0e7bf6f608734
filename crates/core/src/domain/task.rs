use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub due: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub title: String,
    pub due: Option<NaiveDate>,
}

/// Undated tasks first, then by due date; ties keep their incoming order.
pub fn order_pending(tasks: &mut [TaskSummary]) {
    tasks.sort_by_key(|task| (task.due.is_some(), task.due));
}
