//! Shared helpers for end-to-end HTTP tests over the in-memory application.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test;
use listings::domain::CREDENTIAL_COOKIE;
use listings::test_support::{MailKind, TestApp};

/// Form body for a valid listing.
pub const LISTING_FORM: &str = "title=Casa+con+jardin&description=Three+bedrooms+near+the+park\
    &category=1&price=2&rooms=3&parking=1&wc=2&street=Av.+Reforma+1&lat=19.43&lng=-99.13";

/// Value of the `Location` header.
pub fn location<B>(res: &ServiceResponse<B>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
}

/// The credential cookie set on a response, if any.
pub fn credential_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == CREDENTIAL_COOKIE)
        .map(Cookie::into_owned)
}

/// Register, confirm and sign in; returns the credential cookie.
pub async fn sign_up<S, B>(app: &S, fixture: &TestApp, name: &str, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let register = test::TestRequest::post()
        .uri("/auth/registrar")
        .set_form([
            ("display_name", name),
            ("email", email),
            ("password", "secret1"),
            ("repeat_password", "secret1"),
        ])
        .to_request();
    assert_eq!(
        test::call_service(app, register).await.status(),
        StatusCode::CREATED
    );

    let token = fixture
        .mailer
        .last_token(MailKind::Confirmation, email)
        .expect("confirmation mail");
    let confirm = test::TestRequest::get()
        .uri(&format!("/auth/confirmar/{token}"))
        .to_request();
    assert_eq!(test::call_service(app, confirm).await.status(), StatusCode::OK);

    sign_in(app, email, "secret1")
        .await
        .expect("credential cookie after sign-in")
}

/// Post the login form; returns the credential cookie on success.
pub async fn sign_in<S, B>(app: &S, email: &str, password: &str) -> Option<Cookie<'static>>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([("email", email), ("password", password)])
        .to_request();
    let res = test::call_service(app, req).await;
    if res.status() != StatusCode::SEE_OTHER {
        return None;
    }
    credential_cookie(&res)
}

/// Create a listing as `owner`; returns its id.
pub async fn create_listing<S, B>(app: &S, owner: &Cookie<'static>) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/propiedades/crear")
        .cookie(owner.clone())
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(LISTING_FORM)
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    location(&res)
        .strip_prefix("/propiedades/agregar-imagen/")
        .expect("image upload redirect")
        .to_owned()
}

/// Upload a PNG for the listing, publishing it.
pub async fn publish_listing<S, B>(app: &S, owner: &Cookie<'static>, id: &str)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("/propiedades/agregar-imagen/{id}"))
        .cookie(owner.clone())
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0x89, b'P', b'N', b'G'])
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}
