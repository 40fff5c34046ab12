//! Tests for the request gate.

use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, get, test as actix_test};
use rstest::rstest;
use serde_json::Value;

use super::*;
use crate::domain::GuardFailure;
use crate::inbound::http::test_utils::{MockPorts, caller, credential_cookie, forged_cookie};

#[get("/page")]
async fn page(caller: Caller) -> HttpResponse {
    HttpResponse::Ok().body(caller.identity().display_name().to_string())
}

#[get("/api")]
async fn api(caller: Caller<JsonResponse>) -> HttpResponse {
    HttpResponse::Ok().body(caller.identity().display_name().to_string())
}

#[get("/page/guarded/{failure}")]
async fn guarded_page(caller: Caller, failure: web::Path<String>) -> Result<HttpResponse, Rejection> {
    Err(caller.reject(failure_named(&failure)))
}

#[get("/api/guarded/{failure}")]
async fn guarded_api(
    caller: Caller<JsonResponse>,
    failure: web::Path<String>,
) -> Result<HttpResponse, Rejection> {
    Err(caller.reject(failure_named(&failure)))
}

#[get("/viewer")]
async fn viewer(viewer: Viewer) -> HttpResponse {
    match viewer.0 {
        Some(identity) => HttpResponse::Ok().body(identity.display_name().to_string()),
        None => HttpResponse::Ok().body("anonymous"),
    }
}

fn failure_named(name: &str) -> GuardFailure {
    match name {
        "missing" => GuardFailure::ResourceNotFound,
        "stranger" => GuardFailure::NotOwner,
        _ => GuardFailure::InvalidState,
    }
}

async fn call(request: actix_test::TestRequest) -> actix_web::dev::ServiceResponse {
    let state = MockPorts::signed_in_as(&caller("Ada")).into_state();
    let app = actix_test::init_service(
        App::new()
            .app_data(state)
            .service(page)
            .service(api)
            .service(guarded_page)
            .service(guarded_api)
            .service(viewer),
    )
    .await;
    actix_test::call_service(&app, request.to_request()).await
}

fn location(response: &actix_web::dev::ServiceResponse) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

fn clears_credential(response: &actix_web::dev::ServiceResponse) -> bool {
    response
        .response()
        .cookies()
        .any(|cookie| cookie.name() == CREDENTIAL_COOKIE && cookie.value().is_empty())
}

#[rstest]
#[actix_web::test]
async fn valid_credential_reaches_the_handler() {
    let response = call(actix_test::TestRequest::get().uri("/page").cookie(credential_cookie())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = actix_test::read_body(response).await;
    assert_eq!(body.as_ref(), b"Ada");
}

#[rstest]
#[actix_web::test]
async fn missing_credential_redirects_to_login() {
    let response = call(actix_test::TestRequest::get().uri("/page")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(LOGIN_PATH));
    assert!(!clears_credential(&response));
}

#[rstest]
#[actix_web::test]
async fn forged_credential_redirects_and_clears_cookie() {
    let response = call(actix_test::TestRequest::get().uri("/page").cookie(forged_cookie())).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(LOGIN_PATH));
    assert!(clears_credential(&response));
}

#[rstest]
#[actix_web::test]
async fn rejected_credential_is_cleared_with_configured_attributes() {
    let cookies = CredentialCookies::new(
        crate::inbound::http::credential_config::CookiePolicy {
            secure: true,
            same_site: actix_web::cookie::SameSite::Strict,
        },
        actix_web::cookie::time::Duration::hours(1),
    );
    let state = MockPorts::signed_in_as(&caller("Ada")).into_state_with(cookies);
    let app = actix_test::init_service(App::new().app_data(state).service(page)).await;
    let request = actix_test::TestRequest::get()
        .uri("/page")
        .cookie(forged_cookie())
        .to_request();

    let response = actix_test::call_service(&app, request).await;

    let cleared = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == CREDENTIAL_COOKIE)
        .expect("removal cookie");
    assert!(cleared.value().is_empty());
    assert_eq!(cleared.secure(), Some(true));
    assert_eq!(cleared.same_site(), Some(actix_web::cookie::SameSite::Strict));
}

#[rstest]
#[case(None)]
#[case(Some("forged"))]
#[actix_web::test]
async fn api_routes_answer_unauthenticated_with_401(#[case] token: Option<&str>) {
    let mut request = actix_test::TestRequest::get().uri("/api");
    if token.is_some() {
        request = request.cookie(forged_cookie());
    }
    let response = call(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(clears_credential(&response), token.is_some());
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[case("missing")]
#[case("stranger")]
#[case("published")]
#[actix_web::test]
async fn guard_failures_on_pages_redirect_home(#[case] failure: &str) {
    let response = call(
        actix_test::TestRequest::get()
            .uri(&format!("/page/guarded/{failure}"))
            .cookie(credential_cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(OWNER_HOME_PATH));
}

#[rstest]
#[actix_web::test]
async fn guard_failures_on_api_are_indistinguishable() {
    let mut bodies = Vec::new();
    for failure in ["missing", "stranger", "published"] {
        let response = call(
            actix_test::TestRequest::get()
                .uri(&format!("/api/guarded/{failure}"))
                .cookie(credential_cookie()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(response).await;
        bodies.push((body["code"].clone(), body["message"].clone()));
    }
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[rstest]
#[case(true, "Ada")]
#[case(false, "anonymous")]
#[actix_web::test]
async fn viewer_is_optional(#[case] signed_in: bool, #[case] expected: &str) {
    let mut request = actix_test::TestRequest::get().uri("/viewer");
    if signed_in {
        request = request.cookie(credential_cookie());
    } else {
        request = request.cookie(forged_cookie());
    }
    let response = call(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = actix_test::read_body(response).await;
    assert_eq!(body.as_ref(), expected.as_bytes());
}

#[rstest]
fn domain_errors_keep_their_status() {
    let rejection = Rejection::new(Strategy::Redirect, Error::invalid_request("bad form"));
    assert_eq!(rejection.status_code(), StatusCode::BAD_REQUEST);
}
