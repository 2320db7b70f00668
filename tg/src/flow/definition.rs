//! Guided flow definition: the fixed, ordered list of questions
//!
//! Questions are pure data. API questions may carry a payload builder
//! (a plain function over the answers so far) and a declarative
//! response shape describing where the answer text lives.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::backend::HistoryEntry;

/// Default text when a response carries none of the configured answer keys
pub const NO_ANSWER_TEXT: &str = "No answer returned.";

/// How a question is handled once answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionMode {
    /// Answer is stored locally and the flow advances
    Collect,
    /// Answer is submitted to the backend first
    Api,
}

/// Answers collected so far, keyed by storage key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<String, String>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer; re-answering overwrites
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Answer text or `"unknown"`, the way prompts to the backend expect it
    pub fn get_or_unknown(&self, key: &str) -> &str {
        self.get(key).filter(|v| !v.is_empty()).unwrap_or("unknown")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Inputs available to a payload builder
#[derive(Debug, Clone, Copy)]
pub struct PayloadContext<'a> {
    pub answers: &'a Answers,
    pub current_answer: &'a str,
    pub history: &'a [HistoryEntry],
}

/// Builds the outbound request body for an API question
pub type PayloadBuilder = fn(&PayloadContext<'_>) -> Value;

/// Result of interpreting a backend response for a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub answer: String,
    pub continue_flow: bool,
}

/// Where to find the answer text in a response, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseShape {
    /// Keys tried in order; the first non-empty string wins
    pub answer_keys: Vec<String>,
    /// Used when no key yields text
    pub fallback: String,
    /// Boolean key that stops the flow only when explicitly `false`
    pub continue_key: String,
}

impl Default for ResponseShape {
    fn default() -> Self {
        Self {
            answer_keys: vec!["answer".to_string(), "message".to_string()],
            fallback: NO_ANSWER_TEXT.to_string(),
            continue_key: "continue".to_string(),
        }
    }
}

impl ResponseShape {
    /// Interpret a raw response body
    ///
    /// A bare string body is the answer text itself.
    pub fn parse(&self, response: &Value) -> ParsedAnswer {
        if let Value::String(text) = response
            && !text.is_empty()
        {
            return ParsedAnswer {
                answer: text.clone(),
                continue_flow: true,
            };
        }

        let answer = self
            .answer_keys
            .iter()
            .filter_map(|key| response.get(key).and_then(Value::as_str))
            .find(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback.clone());

        let continue_flow = response.get(&self.continue_key).and_then(Value::as_bool) != Some(false);

        ParsedAnswer { answer, continue_flow }
    }
}

/// One step of the guided flow
#[derive(Debug, Clone)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    /// Shown instead of `prompt` when the same question is asked again
    pub repeat_prompt: Option<String>,
    pub storage_key: String,
    pub mode: QuestionMode,
    pub endpoint: Option<String>,
    /// Body key carrying the answer in the default payload
    pub payload_key: Option<String>,
    pub build_payload: Option<PayloadBuilder>,
    pub response: ResponseShape,
    /// Appended as an assistant message before dispatch
    pub acknowledgement: Option<String>,
    /// Where to go back to when the backend says not to continue
    pub repeat_index: Option<usize>,
    /// Fixed choice set
    pub options: Vec<String>,
}

impl Question {
    /// A question whose answer is only stored
    pub fn collect(id: &str, prompt: &str) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            repeat_prompt: None,
            storage_key: id.to_string(),
            mode: QuestionMode::Collect,
            endpoint: None,
            payload_key: None,
            build_payload: None,
            response: ResponseShape::default(),
            acknowledgement: None,
            repeat_index: None,
            options: Vec::new(),
        }
    }

    /// A question whose answer is submitted to `endpoint`
    pub fn api(id: &str, prompt: &str, endpoint: &str) -> Self {
        Self {
            mode: QuestionMode::Api,
            endpoint: Some(endpoint.to_string()),
            payload_key: Some("query".to_string()),
            ..Self::collect(id, prompt)
        }
    }

    pub fn with_storage_key(mut self, key: &str) -> Self {
        self.storage_key = key.to_string();
        self
    }

    pub fn with_repeat_prompt(mut self, text: &str) -> Self {
        self.repeat_prompt = Some(text.to_string());
        self
    }

    pub fn with_acknowledgement(mut self, text: &str) -> Self {
        self.acknowledgement = Some(text.to_string());
        self
    }

    pub fn with_repeat_index(mut self, index: usize) -> Self {
        self.repeat_index = Some(index);
        self
    }

    pub fn with_payload(mut self, builder: PayloadBuilder) -> Self {
        self.build_payload = Some(builder);
        self
    }

    pub fn with_response(mut self, shape: ResponseShape) -> Self {
        self.response = shape;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn is_api(&self) -> bool {
        self.mode == QuestionMode::Api
    }

    /// Prompt text for a first or repeated ask
    pub fn prompt_text(&self, repeat: bool) -> &str {
        match (&self.repeat_prompt, repeat) {
            (Some(text), true) => text,
            _ => &self.prompt,
        }
    }

    /// Map a case-insensitive option match onto the canonical option text
    pub fn normalize_answer(&self, answer: &str) -> String {
        self.options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(answer))
            .cloned()
            .unwrap_or_else(|| answer.to_string())
    }

    /// Request body for this question
    pub fn payload(&self, ctx: &PayloadContext<'_>) -> Value {
        if let Some(builder) = self.build_payload {
            return builder(ctx);
        }

        let key = self.payload_key.as_deref().unwrap_or("query");
        let mut body = serde_json::json!({
            "history": ctx.history,
            "questionId": self.id,
            "answers": ctx.answers,
        });
        body[key] = Value::String(ctx.current_answer.to_string());
        body
    }
}

/// Immutable ordered list of questions
#[derive(Debug, Clone, Default)]
pub struct FlowDefinition {
    questions: Vec<Question>,
}

impl FlowDefinition {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// The built-in road trip questionnaire
    pub fn road_trip() -> Self {
        Self::new(vec![
            Question::collect("from", "Where is the starting location for your route?")
                .with_acknowledgement("Got it! Starting point noted."),
            Question::collect("to", "Where is the destination location for your route?")
                .with_acknowledgement("Got it! Destination noted."),
            Question::collect("duration", "What is the duration of your trip in days?")
                .with_acknowledgement("Understood! Duration recorded."),
            Question::api("drivingHoursPerDay", "How many hours do you plan to drive each day?", "/init")
                .with_repeat_prompt("Let's try that again. Could you share any extra notes or context?")
                .with_acknowledgement("Great, let me think on that for a moment...")
                .with_repeat_index(0)
                .with_payload(route_check_payload),
            Question::api(
                "routePreference",
                "Are you in a hurry to reach your destination?",
                "/utility_itinerary",
            )
            .with_acknowledgement("Thanks for the info! Let me process that...")
            .with_options(&["Yes", "No"])
            .with_payload(itinerary_payload),
        ])
    }
}

fn trip_body(query: String, ctx: &PayloadContext<'_>) -> Value {
    serde_json::json!({
        "query": query,
        "history": ctx.history,
        "questionId": "notes",
        "answers": ctx.answers,
    })
}

/// Feasibility check once origin, destination, duration and daily hours are known
fn route_check_payload(ctx: &PayloadContext<'_>) -> Value {
    let hours = if ctx.current_answer.is_empty() {
        "unknown"
    } else {
        ctx.current_answer
    };
    let query = [
        format!(
            "I am planning a road trip from {} to {}.",
            ctx.answers.get_or_unknown("from"),
            ctx.answers.get_or_unknown("to")
        ),
        format!("The trip will last {} days,", ctx.answers.get_or_unknown("duration")),
        format!("and I plan to drive about {} hours each day.", hours),
        "Please provide any additional notes or context that would help in planning this route.".to_string(),
    ]
    .join("\n");
    trip_body(query, ctx)
}

/// Full itinerary request including the hurry preference
fn itinerary_payload(ctx: &PayloadContext<'_>) -> Value {
    let to = ctx.answers.get_or_unknown("to");
    let duration = ctx.answers.get_or_unknown("duration");
    let preference = if ctx.current_answer.is_empty() {
        "unknown"
    } else {
        ctx.current_answer
    };
    let query = [
        format!(
            "I am planning a road trip from {} to {}.",
            ctx.answers.get_or_unknown("from"),
            to
        ),
        format!(
            "The trip will last {} days after {} days I must arrive at {},",
            duration, duration, to
        ),
        format!(
            "and I plan to drive about {} hours each day.",
            ctx.answers.get_or_unknown("drivingHoursPerDay")
        ),
        format!("Regarding hurry: {}.", preference),
    ]
    .join("\n");
    trip_body(query, ctx)
}
