use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MEETING_MINUTES: u32 = 60;
pub const DEFAULT_REMINDER_OFFSETS: [u32; 2] = [1440, 60];

/// Duration and reminders applied to every meeting the assistant creates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingPolicy {
    pub duration_minutes: u32,
    pub reminder_offsets_minutes: Vec<u32>,
}

impl Default for MeetingPolicy {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_MEETING_MINUTES,
            reminder_offsets_minutes: DEFAULT_REMINDER_OFFSETS.to_vec(),
        }
    }
}

impl MeetingPolicy {
    pub fn event_for(&self, title: impl Into<String>, start: NaiveDateTime) -> NewCalendarEvent {
        NewCalendarEvent {
            title: title.into(),
            start,
            end: start + Duration::minutes(i64::from(self.duration_minutes)),
            reminder_offsets_minutes: self.reminder_offsets_minutes.clone(),
        }
    }
}

/// Start and end are wall-clock times in the assistant's configured timezone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCalendarEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub reminder_offsets_minutes: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    pub link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub title: String,
    /// `None` for all-day events.
    pub start: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::MeetingPolicy;

    #[test]
    fn default_policy_is_one_hour_with_day_and_hour_reminders() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 3)
            .and_then(|date| date.and_hms_opt(15, 30, 0))
            .expect("valid start");

        let event = MeetingPolicy::default().event_for("Reunión de equipo", start);

        assert_eq!(event.start, start);
        assert_eq!((event.end - event.start).num_minutes(), 60);
        assert_eq!(event.reminder_offsets_minutes, vec![1440, 60]);
    }
}
