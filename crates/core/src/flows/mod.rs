pub mod engine;
pub mod states;

pub use engine::{DialogueDefinition, DialogueEngine, DialogueTransitionError, MeetingDialogue};
pub use states::{
    DialogueAction, DialogueContext, DialogueEvent, DialogueState, DialogueType, TransitionOutcome,
};
