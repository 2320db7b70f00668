//! Ordered message store
//!
//! Every operation returns a new store; earlier snapshots are never mutated.

use serde::Serialize;
use tracing::debug;

use super::message::{Message, MessageId, MessageUpdate, Role};
use crate::backend::HistoryEntry;

/// Notification emitted after each store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A message was added at the end
    Appended { id: MessageId },
    /// A message was changed in place
    Updated { id: MessageId },
    /// Messages after `id` were discarded
    Truncated { id: MessageId, len: usize },
    /// The whole session was cleared
    Reset,
}

/// Append-only conversation history with in-place updates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// New store with `message` at the end
    pub fn append(&self, message: Message) -> Self {
        debug!(id = %message.id, role = %message.role, "append: called");
        let mut messages = self.messages.clone();
        messages.push(message);
        Self { messages }
    }

    /// New store with the message `id` updated; unchanged copy when absent
    pub fn update_by_id(&self, id: &MessageId, update: &MessageUpdate) -> Self {
        let mut messages = self.messages.clone();
        match messages.iter_mut().find(|m| &m.id == id) {
            Some(msg) => {
                debug!(%id, "update_by_id: updating");
                update.apply(msg);
            }
            None => debug!(%id, "update_by_id: id not found, ignoring"),
        }
        Self { messages }
    }

    /// New store keeping entries up to and including `id`
    ///
    /// Unknown ids leave the sequence unchanged.
    pub fn truncate_after(&self, id: &MessageId) -> Self {
        let messages = match self.position(id) {
            Some(pos) => {
                debug!(%id, keep = pos + 1, drop = self.messages.len() - pos - 1, "truncate_after: truncating");
                self.messages[..=pos].to_vec()
            }
            None => {
                debug!(%id, "truncate_after: id not found, ignoring");
                self.messages.clone()
            }
        };
        Self { messages }
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn position(&self, id: &MessageId) -> Option<usize> {
        self.messages.iter().position(|m| &m.id == id)
    }

    /// The most recently appended assistant message (the only retryable one)
    pub fn latest_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Conversation history sent with backend requests
    ///
    /// Stops before `until` (exclusive) when given; placeholders are skipped.
    pub fn history(&self, until: Option<&MessageId>) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .take_while(|m| until.is_none_or(|id| &m.id != id))
            .filter(|m| !m.is_placeholder())
            .map(|m| HistoryEntry::new(m.role, m.text.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MessageStore, Vec<MessageId>) {
        let msgs = vec![
            Message::assistant("Where from?"),
            Message::user("Seattle"),
            Message::assistant("Where to?"),
            Message::user("Portland"),
        ];
        let ids = msgs.iter().map(|m| m.id.clone()).collect();
        let store = msgs.into_iter().fold(MessageStore::new(), |s, m| s.append(m));
        (store, ids)
    }

    #[test]
    fn test_append_does_not_alias_snapshot() {
        let (store, _) = sample();
        let next = store.append(Message::assistant("How long?"));

        assert_eq!(store.len(), 4);
        assert_eq!(next.len(), 5);
        assert_eq!(next.last().unwrap().text, "How long?");
    }

    #[test]
    fn test_update_by_id() {
        let (store, ids) = sample();
        let updated = store.update_by_id(&ids[1], &MessageUpdate::text("Tacoma"));

        assert_eq!(updated.get(&ids[1]).unwrap().text, "Tacoma");
        assert_eq!(store.get(&ids[1]).unwrap().text, "Seattle");
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let (store, _) = sample();
        let updated = store.update_by_id(&MessageId::from("a-missing"), &MessageUpdate::text("x"));
        assert_eq!(updated, store);
    }

    #[test]
    fn test_truncate_after_keeps_inclusive() {
        let (store, ids) = sample();
        let truncated = store.truncate_after(&ids[1]);

        assert_eq!(truncated.len(), 2);
        assert_eq!(truncated.last().unwrap().id, ids[1]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_truncate_unknown_id_is_noop() {
        let (store, _) = sample();
        assert_eq!(store.truncate_after(&MessageId::from("u-missing")), store);
    }

    #[test]
    fn test_latest_assistant() {
        let (store, ids) = sample();
        assert_eq!(store.latest_assistant().unwrap().id, ids[2]);
        assert!(MessageStore::new().latest_assistant().is_none());
    }

    #[test]
    fn test_history_stops_before_and_skips_placeholders() {
        let (store, ids) = sample();
        let store = store.append(Message::placeholder("Portland", &ids[3]));

        let full = store.history(None);
        assert_eq!(full.len(), 4);

        let partial = store.history(Some(&ids[2]));
        assert_eq!(partial.len(), 2);
        assert_eq!(partial[1].text, "Seattle");
        assert_eq!(partial[1].role, Role::User);
    }
}
