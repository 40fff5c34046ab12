//! Inquiry messages left by visitors on published listings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::{Error, FieldError};
use super::property::PropertyId;
use super::user::{CallerIdentity, UserId};

/// Minimum message length, in characters.
pub const MESSAGE_MIN_LEN: usize = 20;

/// Validation errors for message bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageValidationError {
    /// Body shorter than [`MESSAGE_MIN_LEN`] after trimming.
    #[error("message must be at least {min} characters")]
    TooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

impl From<MessageValidationError> for Error {
    fn from(err: MessageValidationError) -> Self {
        Error::invalid_fields(vec![FieldError::new("message", "too_short", err.to_string())])
    }
}

/// Trimmed message body of at least [`MESSAGE_MIN_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    /// Validate a message body.
    ///
    /// # Examples
    /// ```
    /// use listings::domain::MessageBody;
    ///
    /// assert!(MessageBody::new("Is the garden shared with neighbours?").is_ok());
    /// assert!(MessageBody::new("Still available?").is_err());
    /// ```
    pub fn new(body: impl AsRef<str>) -> Result<Self, MessageValidationError> {
        let body = body.as_ref().trim();
        if body.chars().count() < MESSAGE_MIN_LEN {
            return Err(MessageValidationError::TooShort {
                min: MESSAGE_MIN_LEN,
            });
        }
        Ok(Self(body.to_owned()))
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A stored inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identifier.
    pub id: Uuid,
    /// Listing the message was left on.
    pub property_id: PropertyId,
    /// Author of the message.
    pub sender_id: UserId,
    /// Message text.
    pub body: MessageBody,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a new message with a random identifier.
    #[must_use]
    pub fn new(
        property_id: PropertyId,
        sender_id: UserId,
        body: MessageBody,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            sender_id,
            body,
            created_at,
        }
    }
}

/// Message as shown to the listing owner; the sender is reduced to their
/// public identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    /// Message text.
    pub body: MessageBody,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Public identity of the author.
    pub sender: CallerIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("   exactly twenty chars   ", true)]
    #[case("nineteen characters", false)]
    #[case("", false)]
    fn body_length_is_measured_after_trimming(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(MessageBody::new(raw).is_ok(), ok);
    }
}
