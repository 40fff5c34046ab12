//! In-memory `MessageRepository`.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{MessagePersistenceError, MessageRepository};
use crate::domain::{Message, PropertyId};

use super::poisoned;

/// Messages kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessageRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_messages<T>(
        &self,
        f: impl FnOnce(&mut Vec<Message>) -> T,
    ) -> Result<T, MessagePersistenceError> {
        let mut messages = self
            .messages
            .lock()
            .map_err(|_| poisoned(MessagePersistenceError::query))?;
        Ok(f(&mut messages))
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), MessagePersistenceError> {
        self.with_messages(|messages| messages.push(message.clone()))
    }

    async fn list_for_property(
        &self,
        property: &PropertyId,
    ) -> Result<Vec<Message>, MessagePersistenceError> {
        self.with_messages(|messages| {
            let mut found: Vec<Message> = messages
                .iter()
                .filter(|message| message.property_id == *property)
                .cloned()
                .collect();
            found.sort_by_key(|message| Reverse(message.created_at));
            found
        })
    }

    async fn count_for_properties(
        &self,
        properties: &[PropertyId],
    ) -> Result<HashMap<PropertyId, u64>, MessagePersistenceError> {
        self.with_messages(|messages| {
            let mut counts = HashMap::new();
            for message in messages
                .iter()
                .filter(|message| properties.contains(&message.property_id))
            {
                *counts.entry(message.property_id).or_insert(0) += 1;
            }
            counts
        })
    }
}
