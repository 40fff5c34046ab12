//! Resource ownership guard.
//!
//! Every owner-only operation on a listing goes through
//! [`OwnershipGuard::authorize`] before touching it. The guard loads the
//! listing, checks it exists, belongs to the caller and satisfies the
//! requested state, and hands the loaded listing back. It never writes.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{PropertyPersistenceError, PropertyRepository};
use crate::domain::{
    AccessError, CallerIdentity, Error, GuardFailure, OwnedByUser, Property, PropertyId,
    RequiredState,
};

/// Existence, ownership and state checks for listings.
#[derive(Clone)]
pub struct OwnershipGuard<P> {
    properties: Arc<P>,
}

pub(crate) fn map_property_error(error: PropertyPersistenceError) -> Error {
    match error {
        PropertyPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("property repository unavailable: {message}"))
        }
        PropertyPersistenceError::Query { message } => {
            Error::internal(format!("property repository error: {message}"))
        }
        PropertyPersistenceError::Missing { id } => Error::not_found(format!("listing {id}")),
    }
}

impl<P> OwnershipGuard<P>
where
    P: PropertyRepository,
{
    /// Create a guard over a property repository.
    pub fn new(properties: Arc<P>) -> Self {
        Self { properties }
    }

    /// Load `id` and check that `caller` may mutate it.
    ///
    /// Fails with [`GuardFailure::ResourceNotFound`], [`GuardFailure::NotOwner`]
    /// or [`GuardFailure::InvalidState`]; repository failures become domain
    /// errors. Repeated calls without an intervening mutation return the same
    /// outcome.
    pub async fn authorize(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
        required: RequiredState,
    ) -> Result<Property, AccessError> {
        let property = self
            .properties
            .find_by_id(&id)
            .await
            .map_err(map_property_error)?;

        let Some(property) = property else {
            return Err(reject(caller, id, GuardFailure::ResourceNotFound));
        };
        if !property.is_owned_by(caller.id()) {
            return Err(reject(caller, id, GuardFailure::NotOwner));
        }
        if required == RequiredState::Unpublished && property.is_published() {
            return Err(reject(caller, id, GuardFailure::InvalidState));
        }
        Ok(property)
    }
}

fn reject(caller: &CallerIdentity, id: PropertyId, failure: GuardFailure) -> AccessError {
    warn!(
        caller = %caller.id(),
        property = %id,
        reason = %failure,
        "ownership check failed"
    );
    failure.into()
}
