//! Guided flow controller
//!
//! Owns the message store, the flow position and the collected answers.
//! All mutations go through here; each one publishes a [`StoreEvent`] so
//! the terminal can redraw without polling.

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::definition::{FlowDefinition, Question};
use super::state::{FlowPhase, FlowState, Transition};
use crate::backend;
use crate::chat::{Message, MessageId, MessageStore, MessageUpdate, PLACEHOLDER_TEXT, StoreEvent};
use crate::config::ChatConfig;
use crate::pipeline::SubmissionPipeline;

/// Store events buffered for slow subscribers
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Text replacing a placeholder whose request was abandoned
pub const CANCELLED_TEXT: &str = "Request cancelled.";

/// Errors from driving the flow
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("A submission for question {0} is still pending")]
    SubmissionPending(usize),

    #[error("The guided flow has not been started")]
    NotStarted,
}

/// What a call to the controller did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing changed (empty input, unknown or ineligible message)
    Ignored,
    /// The user is now asked question `index`
    Prompted { index: usize, repeat: bool },
    /// The guided sequence is over
    Finished,
    /// A free-chat or retried response was filled in
    Answered,
    /// The request failed; the error text is shown in place of the response
    Failed { reason: String },
}

/// Drives the guided conversation
pub struct FlowController {
    definition: FlowDefinition,
    pipeline: SubmissionPipeline,
    texts: ChatConfig,
    store: MessageStore,
    state: FlowState,
    phase: FlowPhase,
    events: broadcast::Sender<StoreEvent>,
}

impl FlowController {
    pub fn new(definition: FlowDefinition, pipeline: SubmissionPipeline, texts: ChatConfig) -> Self {
        debug!(questions = definition.len(), "FlowController::new: called");
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            definition,
            pipeline,
            texts,
            store: MessageStore::new(),
            state: FlowState::default(),
            phase: FlowPhase::Idle,
            events,
        }
    }

    /// Receive an event for every later store mutation
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    /// The question currently waiting for an answer
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            FlowPhase::AwaitingAnswer(i) | FlowPhase::Submitting(i) => self.definition.get(i),
            FlowPhase::Idle | FlowPhase::Finished => None,
        }
    }

    /// Show the welcome text and the first prompt
    ///
    /// Only acts from `Idle`; an empty flow goes straight to free chat.
    pub fn start(&mut self) {
        if self.phase != FlowPhase::Idle {
            debug!(phase = ?self.phase, "start: already started");
            return;
        }
        info!(questions = self.definition.len(), "start: guided flow starting");

        if !self.texts.welcome_message.is_empty() {
            let welcome = Message::assistant(self.texts.welcome_message.clone());
            self.append(welcome);
        }

        let (state, transition) = FlowState::start(self.definition.len());
        self.state = state;
        self.apply(transition, false);
    }

    /// Handle a line of user input
    ///
    /// In guided mode this answers the current question; once the flow is
    /// finished it is sent as a free-form query.
    pub async fn submit(&mut self, text: &str) -> Result<SubmitOutcome, FlowError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("submit: empty input ignored");
            return Ok(SubmitOutcome::Ignored);
        }

        match self.phase {
            FlowPhase::Idle => Err(FlowError::NotStarted),
            FlowPhase::Submitting(i) => Err(FlowError::SubmissionPending(i)),
            FlowPhase::AwaitingAnswer(i) => {
                let user = Message::user(text).for_question(i);
                let user_id = user.id.clone();
                self.append(user);
                Ok(self.answer(i, &user_id, text).await)
            }
            FlowPhase::Finished => {
                let user = Message::user(text);
                let user_id = user.id.clone();
                self.append(user);
                Ok(self.reply_free(&user_id, text).await)
            }
        }
    }

    /// Rewrite an earlier user message and answer it again
    ///
    /// Everything after the message is discarded. A guided answer is
    /// re-submitted for the question it originally answered and the flow
    /// rewinds to that question.
    pub async fn edit(&mut self, id: &MessageId, text: &str) -> Result<SubmitOutcome, FlowError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }
        if let FlowPhase::Submitting(i) = self.phase {
            return Err(FlowError::SubmissionPending(i));
        }
        let question = match self.store.get(id) {
            Some(msg) if msg.is_user() => msg.question,
            _ => {
                debug!(%id, "edit: no such user message");
                return Ok(SubmitOutcome::Ignored);
            }
        };

        info!(%id, ?question, "edit: rewriting user message");
        let truncated = self.store.truncate_after(id);
        let len = truncated.len();
        self.commit(truncated, StoreEvent::Truncated { id: id.clone(), len });
        self.update(id, MessageUpdate::text(text));

        match question.filter(|i| *i < self.definition.len()) {
            Some(i) => {
                self.state = std::mem::take(&mut self.state).at(i);
                Ok(self.answer(i, id, text).await)
            }
            None => Ok(self.reply_free(id, text).await),
        }
    }

    /// Re-issue the request behind the latest assistant message
    ///
    /// Older messages, and messages without a recorded request, are not
    /// retryable. The response text is refreshed in place; the flow
    /// position does not move.
    pub async fn retry(&mut self, id: &MessageId) -> Result<SubmitOutcome, FlowError> {
        if let FlowPhase::Submitting(i) = self.phase {
            return Err(FlowError::SubmissionPending(i));
        }
        let Some(latest) = self.store.latest_assistant().filter(|m| &m.id == id) else {
            debug!(%id, "retry: not the latest assistant message");
            return Ok(SubmitOutcome::Ignored);
        };
        let Some(request) = latest.request.clone() else {
            debug!(%id, "retry: message has no request");
            return Ok(SubmitOutcome::Ignored);
        };
        let question = latest.question;
        let history = self.store.history(latest.in_reply_to.as_ref());

        info!(%id, ?question, "retry: reissuing request");
        self.update(id, MessageUpdate::text(PLACEHOLDER_TEXT));

        let guided = question.and_then(|i| self.definition.get(i)).filter(|q| q.is_api());
        let result = match guided {
            Some(q) => self
                .pipeline
                .submit(q, &self.state.answers, &request, &history)
                .await
                .map(|parsed| parsed.answer)
                .map_err(|e| e.to_string()),
            None => backend::query(self.pipeline.backend().as_ref(), &request, &history)
                .await
                .map_err(|e| e.to_string()),
        };

        Ok(self.resolve(id, result))
    }

    /// Give up on an interrupted request
    ///
    /// Pending placeholders get [`CANCELLED_TEXT`] and an interrupted guided
    /// answer is asked again, so the user always has a prompt.
    pub fn cancel_pending(&mut self) {
        let pending: Vec<MessageId> = self
            .store
            .iter()
            .filter(|m| m.is_placeholder())
            .map(|m| m.id.clone())
            .collect();
        for id in &pending {
            self.update(id, MessageUpdate::text(CANCELLED_TEXT));
        }

        if let FlowPhase::Submitting(i) = self.phase {
            warn!(question = i, "cancel_pending: submission abandoned");
            self.state = std::mem::take(&mut self.state).at(i);
            self.apply(Transition::Prompt { index: i, repeat: true }, false);
        }
    }

    /// Clear the conversation and start over
    pub fn reset(&mut self) {
        info!("reset: clearing session");
        self.commit(MessageStore::new(), StoreEvent::Reset);
        self.state = FlowState::default();
        self.phase = FlowPhase::Idle;
        self.start();
    }

    async fn answer(&mut self, index: usize, user_id: &MessageId, text: &str) -> SubmitOutcome {
        let total = self.definition.len();
        let Some(question) = self.definition.get(index).cloned() else {
            warn!(index, "answer: question out of range");
            self.state = std::mem::take(&mut self.state).finish(total);
            return self.apply(Transition::Finish, false);
        };

        let value = question.normalize_answer(text);
        debug!(question = %question.id, %value, "answer: recording");
        self.state = std::mem::take(&mut self.state).record_answer(&question.storage_key, &value);

        if let Some(ack) = &question.acknowledgement {
            self.append(Message::assistant(ack.clone()));
        }
        self.phase = FlowPhase::Submitting(index);

        if !question.is_api() {
            let (state, transition) = std::mem::take(&mut self.state).advance(index, total);
            self.state = state;
            return self.apply(transition, true);
        }

        let history = self.store.history(Some(user_id));
        let placeholder = Message::placeholder(value.clone(), user_id).for_question(index);
        let placeholder_id = placeholder.id.clone();
        self.append(placeholder);

        match self
            .pipeline
            .submit(&question, &self.state.answers, &value, &history)
            .await
        {
            Ok(parsed) => {
                self.update(&placeholder_id, MessageUpdate::text(parsed.answer));
                let state = std::mem::take(&mut self.state);
                let (state, transition) = if parsed.continue_flow {
                    state.advance(index, total)
                } else {
                    info!(question = %question.id, "answer: backend asked to repeat");
                    state.repeat(index, question.repeat_index, total)
                };
                self.state = state;
                self.apply(transition, false)
            }
            Err(e) => {
                warn!(
                    question = %question.id,
                    error = %e,
                    backend_reported = e.is_backend_reported(),
                    "answer: submission failed"
                );
                let reason = e.to_string();
                self.update(&placeholder_id, MessageUpdate::text(format!("Error: {}", reason)));
                self.state = std::mem::take(&mut self.state).at(index);
                self.apply(Transition::Prompt { index, repeat: true }, false);
                SubmitOutcome::Failed { reason }
            }
        }
    }

    async fn reply_free(&mut self, user_id: &MessageId, text: &str) -> SubmitOutcome {
        let history = self.store.history(Some(user_id));
        let placeholder = Message::placeholder(text, user_id);
        let placeholder_id = placeholder.id.clone();
        self.append(placeholder);

        let result = backend::query(self.pipeline.backend().as_ref(), text, &history)
            .await
            .map_err(|e| e.to_string());
        self.resolve(&placeholder_id, result)
    }

    fn resolve(&mut self, id: &MessageId, result: Result<String, String>) -> SubmitOutcome {
        match result {
            Ok(answer) => {
                self.update(id, MessageUpdate::text(answer));
                SubmitOutcome::Answered
            }
            Err(reason) => {
                warn!(%id, %reason, "resolve: request failed");
                self.update(id, MessageUpdate::text(format!("Error: {}", reason)));
                SubmitOutcome::Failed { reason }
            }
        }
    }

    fn apply(&mut self, transition: Transition, completion: bool) -> SubmitOutcome {
        match transition {
            Transition::Prompt { index, repeat } => {
                self.phase = FlowPhase::AwaitingAnswer(index);
                let prompt = self
                    .definition
                    .get(index)
                    .map(|q| Message::assistant(q.prompt_text(repeat)).for_question(index));
                if let Some(prompt) = prompt {
                    self.append(prompt);
                }
                SubmitOutcome::Prompted { index, repeat }
            }
            Transition::Finish => {
                info!("apply: guided flow finished");
                self.phase = FlowPhase::Finished;
                if completion && !self.texts.completion_message.is_empty() {
                    self.append(Message::assistant(self.texts.completion_message.clone()));
                }
                SubmitOutcome::Finished
            }
        }
    }

    fn append(&mut self, message: Message) {
        let id = message.id.clone();
        let store = self.store.append(message);
        self.commit(store, StoreEvent::Appended { id });
    }

    fn update(&mut self, id: &MessageId, update: MessageUpdate) {
        if self.store.get(id).is_none() {
            // truncated away by an edit
            debug!(%id, "update: message gone, dropping result");
            return;
        }
        let store = self.store.update_by_id(id, &update);
        self.commit(store, StoreEvent::Updated { id: id.clone() });
    }

    fn commit(&mut self, store: MessageStore, event: StoreEvent) {
        self.store = store;
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
