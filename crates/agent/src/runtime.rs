use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;

use jarvis_core::audit::{AuditContext, AuditSink, TracingAuditSink};
use jarvis_core::datetime::{Clock, DateTimeResolver, SystemClock};
use jarvis_core::domain::calendar::MeetingPolicy;
use jarvis_core::domain::conversation::{ConversationId, PendingMeeting, UserId};
use jarvis_core::domain::credential::Credential;
use jarvis_core::domain::task::NewTask;
use jarvis_core::errors::{ApplicationError, DomainError};
use jarvis_core::flows::{
    DialogueAction, DialogueContext, DialogueEngine, DialogueEvent, DialogueState,
    MeetingDialogue,
};
use jarvis_core::gateway::{CalendarGateway, GatewayError, TaskGateway};
use jarvis_core::text::normalize;
use jarvis_db::repositories::ConversationStateStore;

use crate::agenda::{day_bounds, AgendaDigest};
use crate::auth::{persistence, LoginFlow};
use crate::conversation::{derive_title, IntentClassifier, IntentKind, MessageFacts};
use crate::locks::ConversationLocks;
use crate::replies::AssistantReply;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub timezone: Tz,
    pub pending_ttl: Duration,
    pub meeting_policy: MeetingPolicy,
    pub undated_task_limit: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::Santiago,
            pending_ttl: Duration::minutes(60),
            meeting_policy: MeetingPolicy::default(),
            undated_task_limit: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub text: String,
    pub correlation_id: String,
}

/// Per-message view handed to the intent handlers.
struct Turn<'a> {
    message: &'a IncomingMessage,
    credential: Credential,
    pending: Option<PendingMeeting>,
    facts: MessageFacts,
    now: DateTime<Utc>,
    local_now: NaiveDateTime,
}

pub struct AssistantRuntime {
    resolver: DateTimeResolver,
    classifier: IntentClassifier,
    engine: DialogueEngine<MeetingDialogue>,
    conversations: Arc<dyn ConversationStateStore>,
    login: Arc<LoginFlow>,
    calendar: Arc<dyn CalendarGateway>,
    tasks: Arc<dyn TaskGateway>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    settings: RuntimeSettings,
    locks: ConversationLocks,
}

impl AssistantRuntime {
    pub fn new(
        conversations: Arc<dyn ConversationStateStore>,
        login: Arc<LoginFlow>,
        calendar: Arc<dyn CalendarGateway>,
        tasks: Arc<dyn TaskGateway>,
        settings: RuntimeSettings,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            resolver: DateTimeResolver::new()?,
            classifier: IntentClassifier::new()?,
            engine: DialogueEngine::default(),
            conversations,
            login,
            calendar,
            tasks,
            audit: Arc::new(TracingAuditSink),
            clock: Arc::new(SystemClock),
            settings,
            locks: ConversationLocks::default(),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn login(&self) -> &LoginFlow {
        &self.login
    }

    /// Handles one free-text message. Empty and slash-prefixed text is not
    /// assistant input and yields `None`.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Option<AssistantReply> {
        let text = message.text.trim();
        if text.is_empty() || text.starts_with('/') {
            return None;
        }

        let _guard = self.locks.acquire(&message.conversation_id).await;
        let reply = match self.process(message).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(
                    event_name = "assistant.message_failed",
                    correlation_id = %message.correlation_id,
                    conversation_id = %message.conversation_id,
                    error = %error,
                    "message handling failed"
                );
                AssistantReply::Failure(error.into_interface(message.correlation_id.clone()))
            }
        };
        Some(reply)
    }

    /// Drops the pending meeting of a conversation, if any.
    pub async fn cancel_pending(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<AssistantReply, ApplicationError> {
        let _guard = self.locks.acquire(conversation_id).await;
        let had_pending = self.conversations.delete(conversation_id).await.map_err(persistence)?;
        Ok(AssistantReply::Cancelled { had_pending })
    }

    async fn process(&self, message: &IncomingMessage) -> Result<AssistantReply, ApplicationError> {
        let credential = self.login.credential_for(&message.user_id).await?;
        let now = self.clock.now();
        let local_now = now.with_timezone(&self.settings.timezone).naive_local();
        let pending = self.live_pending(&message.conversation_id, now).await?;

        let text = message.text.trim();
        let facts = MessageFacts {
            normalized: normalize(text),
            date: self.resolver.resolve(text, local_now).date(),
            time: self.resolver.extract_hour_minute(text),
            awaiting: pending.as_ref().map(|meeting| meeting.awaiting),
        };
        let intent = self.classifier.classify(&facts);
        tracing::info!(
            event_name = "assistant.intent_classified",
            correlation_id = %message.correlation_id,
            conversation_id = %message.conversation_id,
            intent = ?intent,
            has_date = facts.date.is_some(),
            has_time = facts.time.is_some(),
            pending = pending.is_some(),
            "message classified"
        );

        let turn = Turn { message, credential, pending, facts, now, local_now };
        match intent {
            IntentKind::AgendaQuery => self.answer_agenda(&turn).await,
            IntentKind::PendingContinuation => {
                let event = match (turn.facts.date, turn.facts.time) {
                    (Some(date), time) => DialogueEvent::DateProvided { date, time },
                    (None, Some(time)) => DialogueEvent::TimeProvided { time },
                    (None, None) => DialogueEvent::NothingUsable,
                };
                self.advance_dialogue(&turn, event).await
            }
            IntentKind::Meeting => {
                let event = DialogueEvent::MeetingRequested {
                    title: derive_title(text),
                    date: turn.facts.date,
                    time: turn.facts.time,
                };
                self.advance_dialogue(&turn, event).await
            }
            IntentKind::ExplicitTask => self.create_task(&turn).await,
            IntentKind::Default if turn.pending.is_some() => {
                self.advance_dialogue(&turn, DialogueEvent::NothingUsable).await
            }
            IntentKind::Default => self.create_task(&turn).await,
        }
    }

    /// Reads the pending meeting, deleting it when older than the TTL.
    async fn live_pending(
        &self,
        conversation_id: &ConversationId,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingMeeting>, ApplicationError> {
        let pending = self.conversations.get(conversation_id).await.map_err(persistence)?;
        match pending {
            Some(meeting) if meeting.is_expired(now, self.settings.pending_ttl) => {
                self.conversations.delete(conversation_id).await.map_err(persistence)?;
                tracing::info!(
                    event_name = "assistant.pending_expired",
                    conversation_id = %conversation_id,
                    "pending meeting expired"
                );
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn advance_dialogue(
        &self,
        turn: &Turn<'_>,
        event: DialogueEvent,
    ) -> Result<AssistantReply, ApplicationError> {
        let message = turn.message;
        let state = DialogueState::of(turn.pending.as_ref());
        let context = DialogueContext { pending: turn.pending.clone(), now: turn.now };
        let audit = AuditContext::new(
            Some(message.conversation_id.clone()),
            message.correlation_id.clone(),
            format!("user:{}", message.user_id),
        );
        let outcome = self
            .engine
            .apply_with_audit(&state, &event, &context, self.audit.as_ref(), &audit)
            .map_err(DomainError::from)?;

        let mut reply = None;
        for action in outcome.actions {
            reply = Some(match action {
                DialogueAction::AskForDate { title } => AssistantReply::AskDate { title },
                DialogueAction::AskForTime { title, date } => {
                    AssistantReply::AskTime { title, date }
                }
                DialogueAction::ScheduleMeeting { title, start } => {
                    let event = self.settings.meeting_policy.event_for(title.clone(), start);
                    let created = self
                        .calendar
                        .create_event(&turn.credential, &event)
                        .await
                        .map_err(|error| self.gateway_failure(&message.user_id, error))?;
                    AssistantReply::EventCreated { title, start, link: created.link }
                }
            });
        }

        match outcome.pending {
            Some(pending) => {
                self.conversations
                    .set(&message.conversation_id, pending)
                    .await
                    .map_err(persistence)?;
            }
            None if turn.pending.is_some() => {
                self.conversations.delete(&message.conversation_id).await.map_err(persistence)?;
            }
            None => {}
        }

        reply.ok_or_else(|| {
            DomainError::InvariantViolation("dialogue transition produced no action".to_owned())
                .into()
        })
    }

    async fn create_task(&self, turn: &Turn<'_>) -> Result<AssistantReply, ApplicationError> {
        let message = turn.message;
        let task = NewTask { title: derive_title(&message.text), due: turn.facts.date };
        self.tasks
            .create_task(&turn.credential, &task)
            .await
            .map_err(|error| self.gateway_failure(&message.user_id, error))?;

        if turn.pending.is_some() {
            self.conversations.delete(&message.conversation_id).await.map_err(persistence)?;
            tracing::info!(
                event_name = "assistant.pending_superseded",
                correlation_id = %message.correlation_id,
                conversation_id = %message.conversation_id,
                "task superseded pending meeting"
            );
        }

        Ok(AssistantReply::TaskCreated { title: task.title, due: task.due })
    }

    async fn answer_agenda(&self, turn: &Turn<'_>) -> Result<AssistantReply, ApplicationError> {
        let day = turn.facts.date.unwrap_or(turn.local_now.date());
        let (day_start, day_end) = day_bounds(day);
        let user_id = &turn.message.user_id;

        let (events, tasks) = tokio::try_join!(
            self.calendar.list_events(&turn.credential, day_start, day_end),
            self.tasks.list_pending(&turn.credential),
        )
        .map_err(|error| self.gateway_failure(user_id, error))?;

        Ok(AssistantReply::Agenda(AgendaDigest::build(
            day,
            events,
            tasks,
            self.settings.undated_task_limit,
        )))
    }

    fn gateway_failure(&self, user_id: &UserId, error: GatewayError) -> ApplicationError {
        match error {
            GatewayError::Unauthorized => {
                ApplicationError::AuthMissing { user_id: user_id.to_string() }
            }
            other => other.into(),
        }
    }
}
