//! Port abstraction for inquiry message persistence.
use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Message, PropertyId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by message repository adapters.
    pub enum MessagePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "message repository query failed: {message}",
    }
}

/// Data access for inquiry messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a new message.
    async fn insert(&self, message: &Message) -> Result<(), MessagePersistenceError>;

    /// Messages left on a listing, newest first.
    async fn list_for_property(
        &self,
        property: &PropertyId,
    ) -> Result<Vec<Message>, MessagePersistenceError>;

    /// Message counts keyed by listing. Listings without messages are omitted.
    async fn count_for_properties(
        &self,
        properties: &[PropertyId],
    ) -> Result<HashMap<PropertyId, u64>, MessagePersistenceError>;
}
