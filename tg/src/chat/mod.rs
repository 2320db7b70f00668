//! Conversation messages and the ordered message store

mod message;
mod store;

pub use message::{Message, MessageId, MessageUpdate, PLACEHOLDER_TEXT, Role};
pub use store::{MessageStore, StoreEvent};
