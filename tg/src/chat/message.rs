//! Conversation message types

use serde::{Deserialize, Serialize};

/// Text shown while an assistant response is outstanding
pub const PLACEHOLDER_TEXT: &str = "...";

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Stable message identifier, unique for the session lifetime
///
/// Format: `{role-initial}-{uuid-v7}`, e.g. `a-01930c5e-...`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a fresh id for a message of the given role
    pub fn generate(role: Role) -> Self {
        let initial = match role {
            Role::User => 'u',
            Role::Assistant => 'a',
        };
        Self(format!("{}-{}", initial, uuid::Uuid::now_v7()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single conversation entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,

    /// Original outbound text, kept so the response can be retried
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,

    /// The user message this assistant message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<MessageId>,

    /// Guided-flow position this message asks (assistant) or answers (user)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<usize>,
}

impl Message {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(role),
            role,
            text: text.into(),
            request: None,
            in_reply_to: None,
            question: None,
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Create a pending assistant response for a request
    pub fn placeholder(request: impl Into<String>, in_reply_to: &MessageId) -> Self {
        let mut msg = Self::assistant(PLACEHOLDER_TEXT);
        msg.request = Some(request.into());
        msg.in_reply_to = Some(in_reply_to.clone());
        msg
    }

    /// Tag the message with a guided-flow position
    pub fn for_question(mut self, index: usize) -> Self {
        self.question = Some(index);
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// Still waiting for the backend
    pub fn is_placeholder(&self) -> bool {
        self.is_assistant() && self.text == PLACEHOLDER_TEXT
    }
}

/// Partial update applied to a message in place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageUpdate {
    pub text: Option<String>,
    pub request: Option<String>,
}

impl MessageUpdate {
    /// Replace the text only
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            request: None,
        }
    }

    /// Also record the outbound request text
    pub fn with_request(mut self, request: impl Into<String>) -> Self {
        self.request = Some(request.into());
        self
    }

    pub(crate) fn apply(&self, msg: &mut Message) {
        if let Some(text) = &self.text {
            msg.text = text.clone();
        }
        if let Some(request) = &self.request {
            msg.request = Some(request.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_prefixed() {
        let a = Message::assistant("hi");
        let b = Message::assistant("hi");
        let u = Message::user("hello");

        assert_ne!(a.id, b.id);
        assert!(a.id.as_str().starts_with("a-"));
        assert!(u.id.as_str().starts_with("u-"));
    }

    #[test]
    fn test_placeholder() {
        let user = Message::user("Seattle");
        let pending = Message::placeholder("Seattle", &user.id);

        assert!(pending.is_placeholder());
        assert_eq!(pending.request.as_deref(), Some("Seattle"));
        assert_eq!(pending.in_reply_to.as_ref(), Some(&user.id));
        assert!(!user.is_placeholder());
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut msg = Message::assistant("...").for_question(2);
        MessageUpdate::text("Done").apply(&mut msg);
        assert_eq!(msg.text, "Done");
        assert_eq!(msg.request, None);
        assert_eq!(msg.question, Some(2));

        MessageUpdate::default().with_request("again").apply(&mut msg);
        assert_eq!(msg.text, "Done");
        assert_eq!(msg.request.as_deref(), Some("again"));
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let msg = Message::user("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("request").is_none());
        assert!(json.get("question").is_none());
    }
}
