use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::datetime::HourMinute;
use crate::domain::conversation::{Awaiting, PendingMeeting};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueType {
    MeetingScheduling,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueState {
    Idle,
    AwaitingDate,
    AwaitingTime,
}

impl DialogueState {
    pub fn of(pending: Option<&PendingMeeting>) -> Self {
        match pending.map(|meeting| meeting.awaiting) {
            None => Self::Idle,
            Some(Awaiting::Date) => Self::AwaitingDate,
            Some(Awaiting::Time) => Self::AwaitingTime,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueEvent {
    MeetingRequested { title: String, date: Option<NaiveDate>, time: Option<HourMinute> },
    DateProvided { date: NaiveDate, time: Option<HourMinute> },
    TimeProvided { time: HourMinute },
    NothingUsable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueContext {
    pub pending: Option<PendingMeeting>,
    pub now: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueAction {
    AskForDate { title: String },
    AskForTime { title: String, date: NaiveDate },
    ScheduleMeeting { title: String, start: NaiveDateTime },
}

/// Result of one transition. `pending` is what the conversation store must
/// hold once the actions have completed successfully.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: DialogueState,
    pub to: DialogueState,
    pub event: DialogueEvent,
    pub actions: Vec<DialogueAction>,
    pub pending: Option<PendingMeeting>,
}
