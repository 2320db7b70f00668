//! Guided question flow
//!
//! A fixed list of questions, the position within it, and the controller
//! that ties answers, backend submissions and the message store together.

mod controller;
mod definition;
mod state;

pub use controller::{CANCELLED_TEXT, EVENT_CHANNEL_CAPACITY, FlowController, FlowError, SubmitOutcome};
pub use definition::{
    Answers, FlowDefinition, NO_ANSWER_TEXT, ParsedAnswer, PayloadBuilder, PayloadContext, Question, QuestionMode,
    ResponseShape,
};
pub use state::{FlowPhase, FlowState, Transition};
