//! Port abstraction for listing persistence.
use async_trait::async_trait;

use crate::domain::{CategoryId, Property, PropertyId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by property repository adapters.
    pub enum PropertyPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "property repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "property repository query failed: {message}",
        /// The listing to update no longer exists.
        Missing { id: String } => "listing no longer exists: {id}",
    }
}

/// Filter over published listings. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedFilter {
    /// Only listings in this category.
    pub category: Option<CategoryId>,
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Upper bound on the number of listings returned.
    pub limit: Option<u32>,
}

/// Data access for listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Fetch a listing by identifier.
    async fn find_by_id(&self, id: &PropertyId)
    -> Result<Option<Property>, PropertyPersistenceError>;

    /// Store a new listing.
    async fn insert(&self, property: &Property) -> Result<(), PropertyPersistenceError>;

    /// Overwrite an existing listing; fails with `Missing` once it has been
    /// deleted.
    async fn update(&self, property: &Property) -> Result<(), PropertyPersistenceError>;

    /// Remove a listing. Removing a missing listing is not an error.
    async fn delete(&self, id: &PropertyId) -> Result<(), PropertyPersistenceError>;

    /// List an owner's listings, newest first.
    async fn list_by_owner(
        &self,
        owner: &UserId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Property>, PropertyPersistenceError>;

    /// Count an owner's listings.
    async fn count_by_owner(&self, owner: &UserId) -> Result<u64, PropertyPersistenceError>;

    /// Published listings matching `filter`, newest first.
    async fn list_published(
        &self,
        filter: &PublishedFilter,
    ) -> Result<Vec<Property>, PropertyPersistenceError>;
}
