//! Public pages: the landing page, category and search listings, the
//! published listing page and the contact form on it.

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::ports::{
    CategoryListings, HomePage, PublicProperty, PublishedListing, SearchResults,
};
use crate::domain::{AccessError, CategoryId, Error};

use super::gate::{Caller, Rejection, Strategy, Viewer};
use super::state::HttpState;
use super::validation::{property_id, validate_form};

/// Contact form sent to a listing's seller.
#[derive(Debug, Default, Deserialize, Serialize, Validate, utoipa::ToSchema)]
#[serde(default)]
pub struct MessageForm {
    #[validate(length(min = 20, message = "message must be at least 20 characters"))]
    pub message: String,
}

/// Search box on the landing page.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct SearchForm {
    pub termino: String,
}

fn public_rejection(error: impl Into<AccessError>) -> Rejection {
    Rejection::new(Strategy::Json, error)
}

/// Lookup tables and the newest published listings.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Landing page", body = HomePage)),
    tags = ["public"],
    operation_id = "home",
    security([])
)]
#[get("/")]
pub async fn home(state: web::Data<HttpState>) -> Result<HttpResponse, Rejection> {
    let page = state.listings.home().await.map_err(public_rejection)?;
    Ok(HttpResponse::Ok().json(page))
}

/// Published listings of one category.
#[utoipa::path(
    get,
    path = "/categorias/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Listings in the category", body = CategoryListings),
        (status = 404, description = "Unknown category", body = Error)
    ),
    tags = ["public"],
    operation_id = "categoryListings",
    security([])
)]
#[get("/categorias/{id}")]
pub async fn category(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Rejection> {
    let id = id
        .parse::<i32>()
        .map(CategoryId::new)
        .map_err(|_| public_rejection(Error::not_found("category not found")))?;
    let listings = state
        .listings
        .category_listings(id)
        .await
        .map_err(public_rejection)?;
    Ok(HttpResponse::Ok().json(listings))
}

/// Search published listings by title. A blank term returns to the landing
/// page.
#[utoipa::path(
    post,
    path = "/buscador",
    request_body(content = SearchForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Matching listings", body = SearchResults),
        (status = 303, description = "Blank search term")
    ),
    tags = ["public"],
    operation_id = "search",
    security([])
)]
#[post("/buscador")]
pub async fn search(
    state: web::Data<HttpState>,
    form: web::Form<SearchForm>,
) -> Result<HttpResponse, Rejection> {
    if form.termino.trim().is_empty() {
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/"))
            .finish());
    }
    let results = state
        .listings
        .search(&form.termino)
        .await
        .map_err(public_rejection)?;
    Ok(HttpResponse::Ok().json(results))
}

/// Every published listing, newest first, for map and API clients.
#[utoipa::path(
    get,
    path = "/api/propiedades",
    responses((status = 200, description = "Published listings", body = [PublishedListing])),
    tags = ["public"],
    operation_id = "publishedListings",
    security([])
)]
#[get("/api/propiedades")]
pub async fn published_listings(state: web::Data<HttpState>) -> Result<HttpResponse, Rejection> {
    let listings = state
        .listings
        .published_listings()
        .await
        .map_err(public_rejection)?;
    Ok(HttpResponse::Ok().json(listings))
}

/// A published listing. Signed-in viewers learn whether they are the seller.
#[utoipa::path(
    get,
    path = "/propiedad/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Published listing", body = PublicProperty),
        (status = 404, description = "No published listing with this id", body = Error)
    ),
    tags = ["public"],
    operation_id = "publicProperty",
    security([])
)]
#[get("/propiedad/{id}")]
pub async fn show(
    viewer: Viewer,
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Rejection> {
    let id = property_id(&id).map_err(public_rejection)?;
    let view = state
        .listings
        .public_view(viewer.0, id)
        .await
        .map_err(public_rejection)?;
    Ok(HttpResponse::Ok().json(view))
}

/// Send a message to the seller, then return to the listing.
#[utoipa::path(
    post,
    path = "/propiedad/{id}",
    params(("id" = String, Path, description = "Listing id")),
    request_body(content = MessageForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Message sent, or not signed in"),
        (status = 400, description = "Message too short", body = Error),
        (status = 403, description = "Sellers cannot message their own listing", body = Error),
        (status = 404, description = "No published listing with this id", body = Error)
    ),
    tags = ["public"],
    operation_id = "sendMessage"
)]
#[post("/propiedad/{id}")]
pub async fn send_message(
    caller: Caller,
    state: web::Data<HttpState>,
    id: web::Path<String>,
    form: web::Form<MessageForm>,
) -> Result<HttpResponse, Rejection> {
    let id = property_id(&id).map_err(public_rejection)?;
    validate_form(&*form).map_err(|err| caller.reject(err))?;
    let MessageForm { message } = form.into_inner();
    state
        .listings
        .send_message(caller.identity(), id, message)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, format!("/propiedad/{id}")))
        .finish())
}

#[cfg(test)]
mod tests;
