use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a single chat thread; key for all per-chat state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// The piece of information a pending meeting still needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Awaiting {
    Date,
    Time,
}

impl Awaiting {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

/// A meeting request that is still missing its date or its time-of-day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMeeting {
    pub title: String,
    pub resolved_date: Option<NaiveDate>,
    pub awaiting: Awaiting,
    pub updated_at: DateTime<Utc>,
}

impl PendingMeeting {
    pub fn awaiting_date(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self { title: title.into(), resolved_date: None, awaiting: Awaiting::Date, updated_at: now }
    }

    pub fn awaiting_time(title: impl Into<String>, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            resolved_date: Some(date),
            awaiting: Awaiting::Time,
            updated_at: now,
        }
    }

    /// A zero `ttl` never expires.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if ttl <= Duration::zero() {
            return false;
        }
        now - self.updated_at > ttl
    }
}
