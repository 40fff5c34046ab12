//! Request gate: resolves the credential cookie before a handler runs and
//! turns authorization failures into one response per strategy.
//!
//! Page routes use [`RedirectToLogin`]: authentication failures redirect to
//! the login page and ownership failures back to the owner's listings. API
//! routes use [`JsonResponse`]: `401` for authentication failures and a
//! generic `404` for ownership failures. Every variant of a failure family
//! looks identical to the caller.

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;

use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use futures_util::future::LocalBoxFuture;
use tracing::error;

use crate::domain::{
    AccessError, AuthFailure, CREDENTIAL_COOKIE, CallerIdentity, Credential, Error,
};

use super::cookies::CredentialCookies;
use super::error::status_for;
use super::state::HttpState;

/// Login page that unauthenticated callers are sent to.
pub const LOGIN_PATH: &str = "/auth/login";
/// Owner landing page.
pub const OWNER_HOME_PATH: &str = "/mis-propiedades";

/// How a rejected request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `303 See Other` to a fixed page.
    Redirect,
    /// JSON error body.
    Json,
}

/// Type-level selector for the rejection strategy of a [`Caller`].
pub trait ResponseStrategy: 'static {
    /// Strategy applied to rejected requests.
    const STRATEGY: Strategy;
}

/// Redirect strategy for page routes.
#[derive(Debug)]
pub struct RedirectToLogin;

impl ResponseStrategy for RedirectToLogin {
    const STRATEGY: Strategy = Strategy::Redirect;
}

/// JSON strategy for API routes.
#[derive(Debug)]
pub struct JsonResponse;

impl ResponseStrategy for JsonResponse {
    const STRATEGY: Strategy = Strategy::Json;
}

/// A rejected request.
#[derive(Debug)]
pub struct Rejection {
    strategy: Strategy,
    error: AccessError,
    cookies: Option<CredentialCookies>,
}

impl Rejection {
    /// Wrap `error` for answering with `strategy`.
    pub fn new(strategy: Strategy, error: impl Into<AccessError>) -> Self {
        Self {
            strategy,
            error: error.into(),
            cookies: None,
        }
    }

    /// Clear a rejected credential with the same attributes it was issued
    /// with.
    #[must_use]
    pub fn clearing_with(mut self, cookies: CredentialCookies) -> Self {
        self.cookies = Some(cookies);
        self
    }

    fn removal_cookie(&self, failure: AuthFailure) -> Option<actix_web::cookie::Cookie<'static>> {
        (failure == AuthFailure::InvalidCredential)
            .then_some(self.cookies)
            .flatten()
            .map(|cookies| cookies.clear())
    }

    /// The underlying failure.
    pub fn error(&self) -> &AccessError {
        &self.error
    }

    fn see_other(location: &str) -> actix_web::HttpResponseBuilder {
        let mut builder = HttpResponse::SeeOther();
        builder.insert_header((header::LOCATION, location.to_owned()));
        builder
    }
}

impl From<Error> for Rejection {
    fn from(error: Error) -> Self {
        Self::new(Strategy::Json, error)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl ResponseError for Rejection {
    fn status_code(&self) -> StatusCode {
        match (&self.error, self.strategy) {
            (AccessError::Domain(err), _) => status_for(err.code()),
            (_, Strategy::Redirect) => StatusCode::SEE_OTHER,
            (AccessError::Auth(_), Strategy::Json) => StatusCode::UNAUTHORIZED,
            (AccessError::Guard(_), Strategy::Json) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match (&self.error, self.strategy) {
            (AccessError::Domain(err), _) => err.error_response(),
            (AccessError::Auth(failure), Strategy::Redirect) => {
                let mut builder = Self::see_other(LOGIN_PATH);
                if let Some(cookie) = self.removal_cookie(*failure) {
                    builder.cookie(cookie);
                }
                builder.finish()
            }
            (AccessError::Auth(failure), Strategy::Json) => {
                let mut response = Error::unauthorized("authentication required").error_response();
                if let Some(cookie) = self.removal_cookie(*failure) {
                    if let Err(err) = response.add_cookie(&cookie) {
                        error!(error = %err, "failed to clear rejected credential cookie");
                    }
                }
                response
            }
            (AccessError::Guard(_), Strategy::Redirect) => {
                Self::see_other(OWNER_HOME_PATH).finish()
            }
            (AccessError::Guard(_), Strategy::Json) => {
                Error::not_found("property not found").error_response()
            }
        }
    }
}

fn credential(req: &HttpRequest) -> Option<Credential> {
    req.cookie(CREDENTIAL_COOKIE)
        .and_then(|cookie| Credential::new(cookie.value()))
}

fn http_state(req: &HttpRequest) -> Option<web::Data<HttpState>> {
    let state = req.app_data::<web::Data<HttpState>>().cloned();
    if state.is_none() {
        error!(path = req.path(), "HttpState is not registered on the app");
    }
    state
}

/// Authenticated caller, resolved before the handler body runs.
///
/// ```ignore
/// #[post("/propiedades/eliminar/{id}")]
/// async fn delete(caller: Caller, ..) -> Result<HttpResponse, Rejection> { .. }
/// ```
pub struct Caller<S: ResponseStrategy = RedirectToLogin> {
    identity: CallerIdentity,
    strategy: PhantomData<S>,
}

impl<S: ResponseStrategy> Caller<S> {
    /// The verified caller.
    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }

    /// Reject the request with this route's strategy.
    pub fn reject(&self, error: impl Into<AccessError>) -> Rejection {
        Rejection::new(S::STRATEGY, error)
    }
}

impl<S: ResponseStrategy> FromRequest for Caller<S> {
    type Error = Rejection;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = http_state(req);
        let credential = credential(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| {
                Rejection::new(S::STRATEGY, Error::internal("request state unavailable"))
            })?;
            let identity = state
                .verifier
                .verify(credential)
                .await
                .map_err(|err| Rejection::new(S::STRATEGY, err).clearing_with(state.cookies))?;
            Ok(Self {
                identity,
                strategy: PhantomData,
            })
        })
    }
}

/// Caller identity when a valid credential is present; never rejects.
pub struct Viewer(pub Option<CallerIdentity>);

impl FromRequest for Viewer {
    type Error = Infallible;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = http_state(req);
        let credential = credential(req);
        Box::pin(async move {
            let identity = match state {
                Some(state) => state.verifier.identify(credential).await,
                None => None,
            };
            Ok(Self(identity))
        })
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
