//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services that enforce the authorization
//! contract. Keep types immutable where possible and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - CallerIdentity: authenticated actor derived from a credential.
//! - Property: a listing owned by one user.
//! - CredentialVerifier and OwnershipGuard: the two gates every owner
//!   operation passes through.

pub mod access;
pub mod account_service;
pub mod auth;
pub mod catalogue;
pub mod credential;
pub mod credential_verifier;
pub mod error;
pub mod listing_service;
pub mod message;
pub mod ownership_guard;
pub mod paging;
pub mod ports;
pub mod property;
pub mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use self::access::{AccessError, AuthFailure, GuardFailure, OwnedByUser, RequiredState};
pub use self::account_service::{ACCOUNT_TOKEN_LEN, AccountCollaborators, AccountService};
pub use self::auth::{
    AuthValidationError, LoginCredentials, NewPassword, PASSWORD_MIN_LEN, Registration,
    RegistrationInput,
};
pub use self::catalogue::{Catalogue, Category, CategoryId, PriceRange, PriceRangeId};
pub use self::credential::{CREDENTIAL_COOKIE, Credential, CredentialClaims};
pub use self::credential_verifier::CredentialVerifier;
pub use self::error::{Error, ErrorCode, ErrorValidationError, FieldError};
pub use self::listing_service::{ListingRepositories, ListingService};
pub use self::message::{MESSAGE_MIN_LEN, Message, MessageBody, MessageValidationError, MessageView};
pub use self::ownership_guard::OwnershipGuard;
pub use self::paging::{PAGE_SIZE, PageInfo, PageRequest};
pub use self::property::{
    DESCRIPTION_MAX, ImageName, InvalidImageName, Location, Property, PropertyDetails,
    PropertyDetailsInput, PropertyDraft, PropertyId, PropertyValidationError, STREET_MAX,
    TITLE_MAX,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AccountToken, CallerIdentity, DISPLAY_NAME_MAX, DisplayName, Email, PasswordHash, User,
    UserDraft, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use listings::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
