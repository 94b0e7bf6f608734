pub mod audit;
pub mod config;
pub mod datetime;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod gateway;
pub mod text;

pub use datetime::{Clock, DateTimeResolver, FixedClock, HourMinute, Resolution, SystemClock};
pub use domain::calendar::{CreatedEvent, EventSummary, MeetingPolicy, NewCalendarEvent};
pub use domain::conversation::{Awaiting, ConversationId, PendingMeeting, UserId};
pub use domain::credential::{Credential, OAuthStateGrant};
pub use domain::task::{NewTask, TaskSummary};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{DialogueEngine, DialogueTransitionError, MeetingDialogue};
pub use gateway::{CalendarGateway, GatewayError, OAuthProvider, TaskGateway};
