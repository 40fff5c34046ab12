//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports describe how the domain reaches storage, signing, hashing,
//! file storage and mail. Driving ports are the use-cases inbound adapters
//! call. Each driven port exposes a `thiserror` enum so adapters map their
//! failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod account_operations;
mod caller_verification;
mod catalogue_repository;
mod credential_signer;
mod image_store;
mod listing_operations;
mod mailer;
mod message_repository;
mod password_hasher;
mod property_repository;
mod user_repository;

#[cfg(test)]
pub use account_operations::MockAccountOperations;
pub use account_operations::AccountOperations;
#[cfg(test)]
pub use caller_verification::MockCallerVerification;
pub use caller_verification::CallerVerification;
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{
    CatalogueRepository, CatalogueRepositoryError, FixtureCatalogueRepository,
};
#[cfg(test)]
pub use credential_signer::MockCredentialSigner;
pub use credential_signer::{CredentialSigner, CredentialSignerError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageFormat, ImageStore, ImageStoreError};
#[cfg(test)]
pub use listing_operations::MockListingOperations;
pub use listing_operations::{
    CategoryListings, HomePage, ListingOperations, OwnerListing, OwnerListingItem, PropertyForm,
    PropertyMessages, PublicProperty, PublishedListing, SearchResults,
};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{Mailer, MailerError, Recipient};
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{MessagePersistenceError, MessageRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use property_repository::MockPropertyRepository;
pub use property_repository::{PropertyPersistenceError, PropertyRepository, PublishedFilter};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
