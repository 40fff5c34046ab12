//! Tests for the public listing handlers.

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::Value;

use super::*;
use crate::domain::ports::MockListingOperations;
use crate::domain::test_helpers::property;
use crate::domain::{AccessError, Catalogue, Category, CategoryId, PropertyId};
use crate::inbound::http::gate::LOGIN_PATH;
use crate::inbound::http::test_utils::{MockPorts, caller, credential_cookie};

async fn call(listings: MockListingOperations, request: actix_test::TestRequest) -> actix_web::dev::ServiceResponse {
    let mut ports = MockPorts::signed_in_as(&caller("Grace"));
    ports.listings = listings;
    let app = actix_test::init_service(
        App::new()
            .app_data(ports.into_state())
            .service(home)
            .service(category)
            .service(search)
            .service(published_listings)
            .service(show)
            .service(send_message),
    )
    .await;
    actix_test::call_service(&app, request.to_request()).await
}

#[rstest]
#[case(true)]
#[case(false)]
#[actix_web::test]
async fn show_passes_optional_viewer(#[case] signed_in: bool) {
    let owner = caller("Ada");
    let listing = property(owner.id(), true);
    let id = listing.id();
    let mut listings = MockListingOperations::new();
    listings
        .expect_public_view()
        .withf(move |viewer, requested| viewer.is_some() == signed_in && *requested == id)
        .return_once(move |viewer, _| {
            Ok(PublicProperty {
                property: listing,
                category: None,
                price: None,
                is_seller: false,
                viewer,
            })
        });
    let mut request = actix_test::TestRequest::get().uri(&format!("/propiedad/{id}"));
    if signed_in {
        request = request.cookie(credential_cookie());
    }

    let response = call(listings, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["isSeller"], false);
    assert_eq!(body["viewer"].is_null(), !signed_in);
}

#[rstest]
#[actix_web::test]
async fn unpublished_listing_is_not_found() {
    let mut listings = MockListingOperations::new();
    listings
        .expect_public_view()
        .return_once(|_, _| Err(AccessError::Domain(Error::not_found("property not found"))));

    let response = call(
        listings,
        actix_test::TestRequest::get().uri(&format!("/propiedad/{}", PropertyId::random())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn anonymous_message_redirects_to_login() {
    let mut listings = MockListingOperations::new();
    listings.expect_send_message().never();

    let response = call(
        listings,
        actix_test::TestRequest::post()
            .uri(&format!("/propiedad/{}", PropertyId::random()))
            .set_form([("message", "I would like to visit on Saturday")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).map(|v| v.as_bytes()),
        Some(LOGIN_PATH.as_bytes())
    );
}

#[rstest]
#[case("Too short", StatusCode::BAD_REQUEST)]
#[case("I would like to visit on Saturday", StatusCode::SEE_OTHER)]
#[actix_web::test]
async fn message_length_is_checked(#[case] message: &str, #[case] status: StatusCode) {
    let id = PropertyId::random();
    let accepted = status == StatusCode::SEE_OTHER;
    let mut listings = MockListingOperations::new();
    listings
        .expect_send_message()
        .times(usize::from(accepted))
        .returning(|_, _, _| Ok(()));

    let response = call(
        listings,
        actix_test::TestRequest::post()
            .uri(&format!("/propiedad/{id}"))
            .cookie(credential_cookie())
            .set_form([("message", message)]),
    )
    .await;
    assert_eq!(response.status(), status);
    if accepted {
        assert_eq!(
            response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some(format!("/propiedad/{id}").as_str())
        );
    }
}

fn published(owner_name: &str) -> PublishedListing {
    PublishedListing {
        property: property(caller(owner_name).id(), true),
        category: None,
        price: None,
    }
}

#[rstest]
#[actix_web::test]
async fn home_lists_latest_listings() {
    let mut listings = MockListingOperations::new();
    listings.expect_home().return_once(|| {
        Ok(HomePage {
            catalogue: Catalogue::default(),
            latest: vec![published("Ada")],
        })
    });

    let response = call(listings, actix_test::TestRequest::get().uri("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["latest"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn category_page_passes_the_id() {
    let mut listings = MockListingOperations::new();
    listings
        .expect_category_listings()
        .withf(|id| *id == CategoryId::new(2))
        .return_once(|id| {
            Ok(CategoryListings {
                category: Category {
                    id,
                    name: "Departamento".into(),
                },
                listings: Vec::new(),
            })
        });

    let response = call(listings, actix_test::TestRequest::get().uri("/categorias/2")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["category"]["name"], "Departamento");
}

#[rstest]
#[actix_web::test]
async fn malformed_category_id_is_not_found() {
    let mut listings = MockListingOperations::new();
    listings.expect_category_listings().never();

    let response = call(listings, actix_test::TestRequest::get().uri("/categorias/casa")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn blank_search_returns_home() {
    let mut listings = MockListingOperations::new();
    listings.expect_search().never();

    let response = call(
        listings,
        actix_test::TestRequest::post()
            .uri("/buscador")
            .set_form([("termino", "   ")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).map(|v| v.as_bytes()),
        Some(b"/".as_slice())
    );
}

#[rstest]
#[actix_web::test]
async fn search_returns_matches() {
    let mut listings = MockListingOperations::new();
    listings
        .expect_search()
        .withf(|term| term == "jardín")
        .return_once(|term| {
            Ok(SearchResults {
                term: term.to_owned(),
                listings: vec![published("Ada")],
            })
        });

    let response = call(
        listings,
        actix_test::TestRequest::post()
            .uri("/buscador")
            .set_form([("termino", "jardín")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["term"], "jardín");
    assert_eq!(body["listings"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn api_lists_published_listings_anonymously() {
    let mut listings = MockListingOperations::new();
    listings
        .expect_published_listings()
        .return_once(|| Ok(vec![published("Ada"), published("Grace")]));

    let response = call(listings, actix_test::TestRequest::get().uri("/api/propiedades")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[0]["property"]["published"], true);
}
