//! Real-estate listings backend.
//!
//! Owners publish listings and read buyer messages; visitors browse published
//! listings. Every owner operation passes a credential check and an ownership
//! check before any data is read or changed.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
