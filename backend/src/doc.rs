//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the error
//! payload schemas, and the credential cookie security scheme. Schemas named
//! in response bodies are collected from the paths.
//!
//! The document is served by Swagger UI in debug builds and printed by
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{CREDENTIAL_COOKIE, Error, ErrorCode, FieldError};

/// Enrich the generated document with the credential cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "CredentialCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                CREDENTIAL_COOKIE,
                "Signed credential issued by POST /auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the HTTP interface.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Listings backend API",
        description = "Property listings with credential-gated owner operations."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("CredentialCookie" = [])),
    paths(
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::confirm,
        crate::inbound::http::accounts::forgot_password,
        crate::inbound::http::accounts::check_reset_token,
        crate::inbound::http::accounts::reset_password,
        crate::inbound::http::listings::owner_listing,
        crate::inbound::http::listings::create_form,
        crate::inbound::http::listings::create,
        crate::inbound::http::listings::image_form,
        crate::inbound::http::listings::attach_image,
        crate::inbound::http::listings::edit_form,
        crate::inbound::http::listings::edit,
        crate::inbound::http::listings::delete,
        crate::inbound::http::listings::toggle_published,
        crate::inbound::http::listings::messages,
        crate::inbound::http::public::home,
        crate::inbound::http::public::category,
        crate::inbound::http::public::search,
        crate::inbound::http::public::published_listings,
        crate::inbound::http::public::show,
        crate::inbound::http::public::send_message,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode, FieldError)),
    tags(
        (name = "auth", description = "Sign-in, registration and password reset"),
        (name = "listings", description = "Owner operations on their own listings"),
        (name = "public", description = "Published listings and buyer messages"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
