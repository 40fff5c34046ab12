//! Form validation helpers shared by the inbound HTTP adapters.
//!
//! Forms derive [`validator::Validate`] for format checks; failures are
//! flattened into `details.errors` entries of an `invalid_request` error.

use std::borrow::Cow;
use std::str::FromStr;

use tracing::debug;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::{Error, FieldError, GuardFailure, PropertyId};

pub(crate) fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Accept integers, optionally signed.
pub(crate) fn integer(value: &str) -> Result<(), ValidationError> {
    if value.trim().parse::<i64>().is_ok() {
        Ok(())
    } else {
        Err(validation_error("numeric", "must be a whole number"))
    }
}

/// Accept finite decimal numbers.
pub(crate) fn decimal(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(()),
        _ => Err(validation_error("numeric", "must be a number")),
    }
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut flattened: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| {
                let message = failure
                    .message
                    .as_ref()
                    .map_or_else(|| format!("{field} is invalid"), ToString::to_string);
                FieldError::new(field.as_ref(), failure.code.as_ref(), message)
            })
        })
        .collect();
    flattened.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    flattened
}

/// Run the derived validators on `form`.
pub(crate) fn validate_form<T: Validate>(form: &T) -> Result<(), Error> {
    form.validate().map_err(|errors| {
        debug!(errors = ?errors.field_errors(), "form validation failed");
        Error::invalid_fields(field_errors(&errors))
    })
}

/// Parse a validated numeric field, reporting overflow against `field`.
pub(crate) fn parse_field<T: FromStr>(value: &str, field: &'static str) -> Result<T, Error> {
    value.trim().parse().map_err(|_| {
        Error::invalid_fields(vec![FieldError::new(field, "out_of_range", format!("{field} is out of range"))])
    })
}

/// Parse a property id from a path segment.
///
/// Malformed ids are indistinguishable from ids that do not exist.
pub(crate) fn property_id(raw: &str) -> Result<PropertyId, GuardFailure> {
    Uuid::parse_str(raw)
        .map(PropertyId::from_uuid)
        .map_err(|_| GuardFailure::ResourceNotFound)
}
