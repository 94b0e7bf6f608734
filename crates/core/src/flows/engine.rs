use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::conversation::PendingMeeting;
use crate::flows::states::{
    DialogueAction, DialogueContext, DialogueEvent, DialogueState, DialogueType,
    TransitionOutcome,
};

pub trait DialogueDefinition {
    fn dialogue_type(&self) -> DialogueType;
    fn initial_state(&self) -> DialogueState;
    fn transition(
        &self,
        current: &DialogueState,
        event: &DialogueEvent,
        context: &DialogueContext,
    ) -> Result<TransitionOutcome, DialogueTransitionError>;
}

#[derive(Clone, Debug, Default)]
pub struct MeetingDialogue;

impl DialogueDefinition for MeetingDialogue {
    fn dialogue_type(&self) -> DialogueType {
        DialogueType::MeetingScheduling
    }

    fn initial_state(&self) -> DialogueState {
        DialogueState::Idle
    }

    fn transition(
        &self,
        current: &DialogueState,
        event: &DialogueEvent,
        context: &DialogueContext,
    ) -> Result<TransitionOutcome, DialogueTransitionError> {
        transition_meeting(current, event, context)
    }
}

pub struct DialogueEngine<F> {
    dialogue: F,
}

impl<F> DialogueEngine<F>
where
    F: DialogueDefinition,
{
    pub fn new(dialogue: F) -> Self {
        Self { dialogue }
    }

    pub fn dialogue_type(&self) -> DialogueType {
        self.dialogue.dialogue_type()
    }

    pub fn initial_state(&self) -> DialogueState {
        self.dialogue.initial_state()
    }

    pub fn apply(
        &self,
        current: &DialogueState,
        event: &DialogueEvent,
        context: &DialogueContext,
    ) -> Result<TransitionOutcome, DialogueTransitionError> {
        self.dialogue.transition(current, event, context)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &DialogueState,
        event: &DialogueEvent,
        context: &DialogueContext,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, DialogueTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "dialogue.transition_applied",
                        AuditCategory::Dialogue,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("actions", outcome.actions.len().to_string()),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "dialogue.transition_rejected",
                        AuditCategory::Dialogue,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for DialogueEngine<MeetingDialogue> {
    fn default() -> Self {
        Self::new(MeetingDialogue)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DialogueTransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: DialogueState, event: DialogueEvent },
    #[error("state {state:?} requires a pending meeting but none was provided")]
    MissingPendingMeeting { state: DialogueState },
    #[error("pending meeting in {state:?} has no resolved date")]
    MissingPendingDate { state: DialogueState },
}

type Step = (DialogueState, Vec<DialogueAction>, Option<PendingMeeting>);

fn transition_meeting(
    current: &DialogueState,
    event: &DialogueEvent,
    context: &DialogueContext,
) -> Result<TransitionOutcome, DialogueTransitionError> {
    use DialogueEvent::{DateProvided, MeetingRequested, NothingUsable, TimeProvided};
    use DialogueState::{AwaitingDate, AwaitingTime, Idle};

    let outcome = |(to, actions, pending): Step| TransitionOutcome {
        from: current.clone(),
        to,
        event: event.clone(),
        actions,
        pending,
    };

    // A new meeting request always starts over, superseding whatever was pending.
    if let MeetingRequested { title, date, time } = event {
        let step = match (date, time) {
            (None, _) => ask_for_date(title, context.now),
            (Some(date), None) => ask_for_time(title, *date, context.now),
            (Some(date), Some(time)) => schedule(title, time.on(*date)),
        };
        return Ok(outcome(step));
    }

    let invalid = || DialogueTransitionError::InvalidTransition {
        state: current.clone(),
        event: event.clone(),
    };
    if *current == Idle {
        return Err(invalid());
    }

    let pending = context
        .pending
        .as_ref()
        .ok_or_else(|| DialogueTransitionError::MissingPendingMeeting { state: current.clone() })?;
    let title = pending.title.as_str();
    let stored_date = || {
        pending
            .resolved_date
            .ok_or_else(|| DialogueTransitionError::MissingPendingDate { state: current.clone() })
    };

    let step = match (current, event) {
        (AwaitingDate | AwaitingTime, DateProvided { date, time: Some(time) }) => {
            schedule(title, time.on(*date))
        }
        (AwaitingDate, DateProvided { date, time: None }) => {
            ask_for_time(title, *date, context.now)
        }
        (AwaitingDate, TimeProvided { .. } | NothingUsable) => (
            AwaitingDate,
            vec![DialogueAction::AskForDate { title: title.to_owned() }],
            Some(pending.clone()),
        ),
        (AwaitingTime, TimeProvided { time }) => schedule(title, time.on(stored_date()?)),
        (AwaitingTime, NothingUsable) => (
            AwaitingTime,
            vec![DialogueAction::AskForTime { title: title.to_owned(), date: stored_date()? }],
            Some(pending.clone()),
        ),
        _ => return Err(invalid()),
    };

    Ok(outcome(step))
}

fn ask_for_date(title: &str, now: DateTime<Utc>) -> Step {
    (
        DialogueState::AwaitingDate,
        vec![DialogueAction::AskForDate { title: title.to_owned() }],
        Some(PendingMeeting::awaiting_date(title, now)),
    )
}

fn ask_for_time(title: &str, date: NaiveDate, now: DateTime<Utc>) -> Step {
    (
        DialogueState::AwaitingTime,
        vec![DialogueAction::AskForTime { title: title.to_owned(), date }],
        Some(PendingMeeting::awaiting_time(title, date, now)),
    )
}

fn schedule(title: &str, start: NaiveDateTime) -> Step {
    (
        DialogueState::Idle,
        vec![DialogueAction::ScheduleMeeting { title: title.to_owned(), start }],
        None,
    )
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use crate::audit::{AuditContext, InMemoryAuditSink};
    use crate::datetime::HourMinute;
    use crate::domain::conversation::{ConversationId, PendingMeeting};
    use crate::flows::engine::{
        DialogueDefinition, DialogueEngine, DialogueTransitionError, MeetingDialogue,
    };
    use crate::flows::states::{
        DialogueAction, DialogueContext, DialogueEvent, DialogueState, DialogueType,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).single().expect("valid instant")
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date")
    }

    fn time(hour: u32, minute: u32) -> HourMinute {
        HourMinute::new(hour, minute).expect("valid time")
    }

    fn context(pending: Option<PendingMeeting>) -> DialogueContext {
        DialogueContext { pending, now: now() }
    }

    fn request(date: Option<NaiveDate>, time: Option<HourMinute>) -> DialogueEvent {
        DialogueEvent::MeetingRequested { title: "Reunión con Ana".to_owned(), date, time }
    }

    #[test]
    fn full_request_schedules_immediately_without_pending_state() {
        let engine = DialogueEngine::default();
        let outcome = engine
            .apply(&DialogueState::Idle, &request(Some(day()), Some(time(10, 30))), &context(None))
            .expect("idle -> idle with schedule");

        assert_eq!(outcome.to, DialogueState::Idle);
        assert_eq!(outcome.pending, None);
        assert_eq!(
            outcome.actions,
            vec![DialogueAction::ScheduleMeeting {
                title: "Reunión con Ana".to_owned(),
                start: time(10, 30).on(day()),
            }]
        );
    }

    #[test]
    fn date_then_time_completes_in_two_turns() {
        let engine = DialogueEngine::new(MeetingDialogue);
        let first = engine
            .apply(&engine.initial_state(), &request(Some(day()), None), &context(None))
            .expect("idle -> awaiting time");

        assert_eq!(first.to, DialogueState::AwaitingTime);
        assert!(matches!(first.actions.as_slice(), [DialogueAction::AskForTime { .. }]));
        let pending = first.pending.clone().expect("pending meeting stored");
        assert_eq!(pending.resolved_date, Some(day()));

        let second = engine
            .apply(
                &first.to,
                &DialogueEvent::TimeProvided { time: time(16, 0) },
                &context(Some(pending)),
            )
            .expect("awaiting time -> idle");

        assert_eq!(second.to, DialogueState::Idle);
        assert_eq!(second.pending, None);
        assert_eq!(
            second.actions,
            vec![DialogueAction::ScheduleMeeting {
                title: "Reunión con Ana".to_owned(),
                start: time(16, 0).on(day()),
            }]
        );
    }

    #[test]
    fn missing_date_asks_for_date_then_time() {
        let engine = DialogueEngine::default();
        let first = engine
            .apply(&DialogueState::Idle, &request(None, None), &context(None))
            .expect("idle -> awaiting date");
        assert_eq!(first.to, DialogueState::AwaitingDate);

        let second = engine
            .apply(
                &first.to,
                &DialogueEvent::DateProvided { date: day(), time: None },
                &context(first.pending),
            )
            .expect("awaiting date -> awaiting time");
        assert_eq!(second.to, DialogueState::AwaitingTime);
        assert_eq!(second.pending.and_then(|pending| pending.resolved_date), Some(day()));
    }

    #[test]
    fn date_with_time_while_awaiting_date_schedules_directly() {
        let engine = DialogueEngine::default();
        let pending = PendingMeeting::awaiting_date("Junta", now());
        let outcome = engine
            .apply(
                &DialogueState::AwaitingDate,
                &DialogueEvent::DateProvided { date: day(), time: Some(time(9, 0)) },
                &context(Some(pending)),
            )
            .expect("awaiting date -> idle");

        assert_eq!(outcome.to, DialogueState::Idle);
        assert!(matches!(outcome.actions.as_slice(), [DialogueAction::ScheduleMeeting { .. }]));
    }

    #[test]
    fn unusable_replies_repeat_the_question_and_keep_state() {
        let engine = DialogueEngine::default();
        let pending = PendingMeeting::awaiting_time("Junta", day(), now());
        let outcome = engine
            .apply(
                &DialogueState::AwaitingTime,
                &DialogueEvent::NothingUsable,
                &context(Some(pending.clone())),
            )
            .expect("awaiting time stays");

        assert_eq!(outcome.to, DialogueState::AwaitingTime);
        assert_eq!(outcome.pending, Some(pending));
        assert_eq!(
            outcome.actions,
            vec![DialogueAction::AskForTime { title: "Junta".to_owned(), date: day() }]
        );

        let awaiting_date = PendingMeeting::awaiting_date("Junta", now());
        let outcome = engine
            .apply(
                &DialogueState::AwaitingDate,
                &DialogueEvent::TimeProvided { time: time(9, 0) },
                &context(Some(awaiting_date)),
            )
            .expect("awaiting date stays");
        assert_eq!(outcome.to, DialogueState::AwaitingDate);
    }

    #[test]
    fn new_request_supersedes_pending_meeting() {
        let engine = DialogueEngine::default();
        let pending = PendingMeeting::awaiting_time("Vieja junta", day(), now());
        let outcome = engine
            .apply(&DialogueState::AwaitingTime, &request(None, None), &context(Some(pending)))
            .expect("supersede");

        assert_eq!(outcome.to, DialogueState::AwaitingDate);
        assert_eq!(outcome.pending.map(|pending| pending.title), Some("Reunión con Ana".to_owned()));
    }

    #[test]
    fn awaiting_time_only_accepts_dates_that_carry_a_time() {
        let engine = DialogueEngine::default();
        let pending = PendingMeeting::awaiting_time("Junta", day(), now());
        let moved = NaiveDate::from_ymd_opt(2026, 3, 9).expect("valid date");

        let error = engine
            .apply(
                &DialogueState::AwaitingTime,
                &DialogueEvent::DateProvided { date: moved, time: None },
                &context(Some(pending.clone())),
            )
            .expect_err("bare date is not an answer");
        assert!(matches!(error, DialogueTransitionError::InvalidTransition { .. }));

        let outcome = engine
            .apply(
                &DialogueState::AwaitingTime,
                &DialogueEvent::DateProvided { date: moved, time: Some(time(11, 0)) },
                &context(Some(pending)),
            )
            .expect("date with time schedules");
        assert_eq!(outcome.to, DialogueState::Idle);
        assert_eq!(
            outcome.actions,
            vec![DialogueAction::ScheduleMeeting {
                title: "Junta".to_owned(),
                start: time(11, 0).on(moved),
            }]
        );
    }

    #[test]
    fn continuation_events_are_rejected_when_idle() {
        let engine = DialogueEngine::default();
        let error = engine
            .apply(&DialogueState::Idle, &DialogueEvent::NothingUsable, &context(None))
            .expect_err("idle cannot continue");

        assert!(matches!(
            error,
            DialogueTransitionError::InvalidTransition {
                state: DialogueState::Idle,
                event: DialogueEvent::NothingUsable
            }
        ));
    }

    #[test]
    fn awaiting_states_require_pending_context() {
        let engine = DialogueEngine::default();
        let error = engine
            .apply(
                &DialogueState::AwaitingTime,
                &DialogueEvent::TimeProvided { time: time(9, 0) },
                &context(None),
            )
            .expect_err("missing pending meeting");

        assert_eq!(
            error,
            DialogueTransitionError::MissingPendingMeeting { state: DialogueState::AwaitingTime }
        );
    }

    #[test]
    fn replay_is_deterministic_for_same_event_sequence() {
        let engine = DialogueEngine::default();
        let events = [
            request(None, None),
            DialogueEvent::NothingUsable,
            DialogueEvent::DateProvided { date: day(), time: None },
            DialogueEvent::TimeProvided { time: time(11, 15) },
        ];

        let run = |engine: &DialogueEngine<MeetingDialogue>| {
            let mut state = engine.initial_state();
            let mut pending = None;
            let mut actions = Vec::new();
            for event in &events {
                let outcome =
                    engine.apply(&state, event, &context(pending)).expect("deterministic run");
                actions.push(outcome.actions);
                pending = outcome.pending;
                state = outcome.to;
            }
            (state, actions)
        };

        let first = run(&engine);
        let second = run(&engine);

        assert_eq!(first, second);
        assert_eq!(first.0, DialogueState::Idle);
        assert_eq!(engine.dialogue_type(), DialogueType::MeetingScheduling);
        assert_eq!(MeetingDialogue.dialogue_type(), DialogueType::MeetingScheduling);
    }

    #[test]
    fn transitions_emit_audit_events() {
        let engine = DialogueEngine::default();
        let sink = InMemoryAuditSink::default();
        let audit = AuditContext::new(Some(ConversationId("77".to_owned())), "upd-42", "dialogue");

        let _ = engine
            .apply_with_audit(
                &DialogueState::Idle,
                &request(Some(day()), None),
                &context(None),
                &sink,
                &audit,
            )
            .expect("transition should succeed");
        let _ = engine.apply_with_audit(
            &DialogueState::Idle,
            &DialogueEvent::NothingUsable,
            &context(None),
            &sink,
            &audit,
        );

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].correlation_id, "upd-42");
        assert_eq!(events[0].event_type, "dialogue.transition_applied");
        assert_eq!(events[0].metadata.get("to").map(String::as_str), Some("AwaitingTime"));
        assert_eq!(events[1].event_type, "dialogue.transition_rejected");
    }
}
