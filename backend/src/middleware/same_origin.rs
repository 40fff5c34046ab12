//! Cross-site request forgery protection for state-changing requests.
//!
//! Browsers attach the credential cookie to cross-site form posts, so every
//! non-safe request must come from this origin. The check uses
//! `Sec-Fetch-Site` when the browser sends it and falls back to comparing
//! `Origin` (or `Referer`) with the request host. Requests carrying none of
//! these headers are not from a browser form and pass through.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{AsHeaderName, ORIGIN, REFERER};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;
use url::Url;

const SEC_FETCH_SITE: &str = "sec-fetch-site";

/// Middleware factory rejecting cross-site `POST`, `PUT`, `PATCH` and
/// `DELETE` requests with `403 forbidden`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use listings::middleware::SameOrigin;
///
/// let app = App::new().wrap(SameOrigin);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SameOrigin;

impl<S, B> Transform<S, ServiceRequest> for SameOrigin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = SameOriginMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SameOriginMiddleware { service }))
    }
}

/// Service produced by [`SameOrigin`].
pub struct SameOriginMiddleware<S> {
    service: S,
}

fn header(req: &ServiceRequest, name: impl AsHeaderName) -> Option<&str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

fn authority(source: &str) -> Option<String> {
    let url = Url::parse(source).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

/// Whether a state-changing request was initiated by another site.
fn is_cross_site(req: &ServiceRequest) -> bool {
    if req.method().is_safe() {
        return false;
    }
    if let Some(site) = header(req, SEC_FETCH_SITE) {
        return !matches!(site, "same-origin" | "none");
    }
    let Some(source) = header(req, ORIGIN).or_else(|| header(req, REFERER)) else {
        return false;
    };
    match authority(source) {
        Some(origin) => !origin.eq_ignore_ascii_case(req.connection_info().host()),
        // Opaque origins such as `null` come from sandboxed or privacy-redirected pages.
        None => true,
    }
}

impl<S, B> Service<ServiceRequest> for SameOriginMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_cross_site(&req) {
            warn!(
                method = %req.method(),
                path = req.path(),
                origin = header(&req, ORIGIN).unwrap_or_default(),
                "cross-site request rejected"
            );
            let error = crate::domain::Error::forbidden("cross-site request rejected");
            return Box::pin(ready(Ok(req.error_response(error))));
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_boxed_body) })
    }
}
