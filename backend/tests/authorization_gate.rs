//! End-to-end checks of the credential verifier and ownership guard through
//! the full application.

mod support;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Duration, Utc};
use listings::domain::ports::CredentialSigner;
use listings::domain::{CREDENTIAL_COOKIE, CredentialClaims, DisplayName, UserId};
use listings::outbound::jwt::{DEFAULT_ISSUER, JwtCredentialSigner};
use listings::server::build_app;
use listings::test_support::{TEST_SIGNING_KEY, TestApp};
use rstest::rstest;
use serde_json::Value;
use uuid::Uuid;

use support::{create_listing, credential_cookie, location, publish_listing, sign_up};

async fn signed_credential(subject: UserId, expires_in: Duration) -> Cookie<'static> {
    let signer = JwtCredentialSigner::new(TEST_SIGNING_KEY, DEFAULT_ISSUER);
    let issued_at = Utc::now() - Duration::hours(2);
    let claims = CredentialClaims {
        subject,
        display_name: DisplayName::new("Ghost").expect("valid name"),
        issued_at,
        expires_at: Utc::now() + expires_in,
    };
    let credential = signer.sign(&claims).await.expect("signed");
    Cookie::new(CREDENTIAL_COOKIE, credential.as_str().to_owned())
}

#[rstest]
#[case("/mis-propiedades")]
#[case("/propiedades/crear")]
#[case("/mensajes/not-an-id")]
#[actix_web::test]
async fn anonymous_callers_are_sent_to_login(#[case] uri: &str) {
    let fixture = TestApp::new();
    let app = test::init_service(build_app(fixture.dependencies())).await;

    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/auth/login");
    assert!(credential_cookie(&res).is_none());
}

#[actix_web::test]
async fn forged_and_expired_credentials_are_cleared() {
    let fixture = TestApp::new();
    let app = test::init_service(build_app(fixture.dependencies())).await;
    let owner_id = UserId::random();
    let rejected = [
        Cookie::new(CREDENTIAL_COOKIE, "forged.credential.value"),
        signed_credential(owner_id, -Duration::hours(1)).await,
    ];

    for cookie in rejected {
        let req = test::TestRequest::get()
            .uri("/mis-propiedades")
            .cookie(cookie)
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/auth/login");
        let cleared = credential_cookie(&res).expect("removal cookie");
        assert!(cleared.value().is_empty());
    }
}

#[actix_web::test]
async fn credential_for_missing_account_is_treated_as_signed_out() {
    let fixture = TestApp::new();
    let app = test::init_service(build_app(fixture.dependencies())).await;
    let cookie = signed_credential(UserId::random(), Duration::hours(1)).await;

    let req = test::TestRequest::get()
        .uri("/mis-propiedades")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/auth/login");
}

#[actix_web::test]
async fn owner_reaches_their_listing_and_strangers_do_not() {
    let fixture = TestApp::new();
    let app = test::init_service(build_app(fixture.dependencies())).await;
    let owner = sign_up(&app, &fixture, "Ada", "ada@example.com").await;
    let stranger = sign_up(&app, &fixture, "Mallory", "mallory@example.com").await;
    let id = create_listing(&app, &owner).await;
    let edit = format!("/propiedades/editar/{id}");

    let req = test::TestRequest::get()
        .uri(&edit)
        .cookie(owner.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["property"]["id"], id.as_str());

    let req = test::TestRequest::get()
        .uri(&edit)
        .cookie(stranger)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/mis-propiedades");
}

#[rstest]
#[case::unknown_id(Some(Uuid::new_v4().to_string()))]
#[case::malformed_id(Some("12345".to_owned()))]
#[case::foreign_listing(None)]
#[actix_web::test]
async fn guarded_routes_share_one_redirect(#[case] target: Option<String>) {
    let fixture = TestApp::new();
    let app = test::init_service(build_app(fixture.dependencies())).await;
    let owner = sign_up(&app, &fixture, "Ada", "ada@example.com").await;
    let stranger = sign_up(&app, &fixture, "Mallory", "mallory@example.com").await;
    let owned = create_listing(&app, &owner).await;
    let id = target.unwrap_or(owned);

    for uri in [
        format!("/propiedades/agregar-imagen/{id}"),
        format!("/propiedades/editar/{id}"),
        format!("/mensajes/{id}"),
    ] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .cookie(stranger.clone())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&res), "/mis-propiedades", "{uri}");
    }
}

#[actix_web::test]
async fn stranger_cannot_delete_and_listing_survives() {
    let fixture = TestApp::new();
    let app = test::init_service(build_app(fixture.dependencies())).await;
    let owner = sign_up(&app, &fixture, "Ada", "ada@example.com").await;
    let stranger = sign_up(&app, &fixture, "Mallory", "mallory@example.com").await;
    let id = create_listing(&app, &owner).await;

    let req = test::TestRequest::post()
        .uri(&format!("/propiedades/eliminar/{id}"))
        .cookie(stranger)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/mis-propiedades");

    let req = test::TestRequest::get()
        .uri(&format!("/propiedades/editar/{id}"))
        .cookie(owner)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn published_listing_rejects_a_second_image() {
    let fixture = TestApp::new();
    let app = test::init_service(build_app(fixture.dependencies())).await;
    let owner = sign_up(&app, &fixture, "Ada", "ada@example.com").await;
    let id = create_listing(&app, &owner).await;
    publish_listing(&app, &owner, &id).await;

    let req = test::TestRequest::get()
        .uri(&format!("/propiedades/agregar-imagen/{id}"))
        .cookie(owner)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/mis-propiedades");
}

#[actix_web::test]
async fn toggle_rejections_do_not_reveal_which_listings_exist() {
    let fixture = TestApp::new();
    let app = test::init_service(build_app(fixture.dependencies())).await;
    let owner = sign_up(&app, &fixture, "Ada", "ada@example.com").await;
    let stranger = sign_up(&app, &fixture, "Mallory", "mallory@example.com").await;
    let owned = create_listing(&app, &owner).await;

    let mut bodies = Vec::new();
    for id in [owned.clone(), Uuid::new_v4().to_string(), "nope".to_owned()] {
        let req = test::TestRequest::put()
            .uri(&format!("/propiedades/{id}"))
            .cookie(stranger.clone())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        bodies.push((body["code"].clone(), body["message"].clone()));
    }
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));

    let req = test::TestRequest::put()
        .uri(&format!("/propiedades/{owned}"))
        .cookie(owner)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["resultado"], true);
    assert_eq!(body["published"], true);
}

#[actix_web::test]
async fn anonymous_toggle_is_unauthorized_json() {
    let fixture = TestApp::new();
    let app = test::init_service(build_app(fixture.dependencies())).await;

    let req = test::TestRequest::put()
        .uri(&format!("/propiedades/{}", Uuid::new_v4()))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}
