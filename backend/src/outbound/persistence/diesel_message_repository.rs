//! PostgreSQL-backed `MessageRepository` implementation using Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{MessagePersistenceError, MessageRepository};
use crate::domain::{Message, MessageBody, PropertyId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MessageRow, NewMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::messages;

/// Diesel-backed implementation of the `MessageRepository` port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MessagePersistenceError {
    map_basic_pool_error(error, MessagePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MessagePersistenceError {
    map_basic_diesel_error(
        error,
        MessagePersistenceError::query,
        MessagePersistenceError::connection,
    )
}

fn row_to_message(row: MessageRow) -> Result<Message, MessagePersistenceError> {
    let body = MessageBody::new(&row.body)
        .map_err(|err| MessagePersistenceError::query(format!("invalid stored message: {err}")))?;
    Ok(Message {
        id: row.id,
        property_id: PropertyId::from_uuid(row.property_id),
        sender_id: UserId::from_uuid(row.sender_id),
        body,
        created_at: row.created_at,
    })
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewMessageRow {
            id: message.id,
            property_id: *message.property_id.as_uuid(),
            sender_id: *message.sender_id.as_uuid(),
            body: message.body.as_ref(),
            created_at: message.created_at,
        };
        diesel::insert_into(messages::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_for_property(
        &self,
        property: &PropertyId,
    ) -> Result<Vec<Message>, MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MessageRow> = messages::table
            .filter(messages::property_id.eq(*property.as_uuid()))
            .order(messages::created_at.desc())
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_message).collect()
    }

    async fn count_for_properties(
        &self,
        properties: &[PropertyId],
    ) -> Result<HashMap<PropertyId, u64>, MessagePersistenceError> {
        if properties.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<Uuid> = properties.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let counts: Vec<(Uuid, i64)> = messages::table
            .filter(messages::property_id.eq_any(ids))
            .group_by(messages::property_id)
            .select((messages::property_id, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(counts
            .into_iter()
            .map(|(id, count)| {
                (
                    PropertyId::from_uuid(id),
                    u64::try_from(count).unwrap_or_default(),
                )
            })
            .collect())
    }
}
