//! Owner handlers for managing listings.
//!
//! Every route resolves the caller through [`Caller`] before its body runs;
//! routes addressing one listing then pass through the ownership guard inside
//! the listing service. Page routes answer rejections with redirects, the
//! publish toggle with JSON.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::domain::ports::{ImageFormat, OwnerListing, PropertyForm, PropertyMessages};
use crate::domain::{
    CategoryId, Catalogue, Error, FieldError, PageRequest, PriceRangeId, Property,
    PropertyDetailsInput,
};

use super::gate::{Caller, JsonResponse, OWNER_HOME_PATH, Rejection};
use super::state::HttpState;
use super::validation::{decimal, integer, parse_field, property_id, validate_form};

/// `?pagina=N` on the owner's listing.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number.
    pub pagina: Option<String>,
}

/// Create and edit form body.
#[derive(Debug, Default, Deserialize, Serialize, Validate, utoipa::ToSchema)]
#[serde(default)]
pub struct PropertyFormBody {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "description is required, up to 200 characters"))]
    pub description: String,
    #[validate(custom(function = "integer"))]
    pub category: String,
    #[validate(custom(function = "integer"))]
    pub price: String,
    #[validate(custom(function = "integer"))]
    pub rooms: String,
    #[validate(custom(function = "integer"))]
    pub parking: String,
    #[validate(custom(function = "integer"))]
    pub wc: String,
    #[validate(length(max = 120, message = "street is too long"))]
    pub street: String,
    #[validate(custom(function = "decimal"))]
    pub lat: String,
    #[validate(custom(function = "decimal"))]
    pub lng: String,
}

impl PropertyFormBody {
    fn to_input(&self) -> Result<PropertyDetailsInput, Error> {
        Ok(PropertyDetailsInput {
            title: self.title.clone(),
            description: self.description.clone(),
            category: CategoryId::new(parse_field(&self.category, "category")?),
            price: PriceRangeId::new(parse_field(&self.price, "price")?),
            rooms: parse_field(&self.rooms, "rooms")?,
            parking: parse_field(&self.parking, "parking")?,
            wc: parse_field(&self.wc, "wc")?,
            street: self.street.clone(),
            lat: parse_field(&self.lat, "lat")?,
            lng: parse_field(&self.lng, "lng")?,
        })
    }
}

/// Reply to the publish toggle.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ToggleResponse {
    /// Always `true` when the toggle was applied.
    pub resultado: bool,
    /// New visibility.
    pub published: bool,
}

fn see_other(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

fn image_format(req: &HttpRequest) -> Result<ImageFormat, Error> {
    let mime = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .unwrap_or_default();
    ImageFormat::from_mime(mime).ok_or_else(|| {
        debug!(mime, "rejected image upload");
        Error::invalid_fields(vec![FieldError::new(
            "image",
            "unsupported_format",
            "image must be JPEG, PNG or WebP",
        )])
    })
}

/// The caller's listings, newest first.
#[utoipa::path(
    get,
    path = "/mis-propiedades",
    params(PageQuery),
    responses(
        (status = 200, description = "A page of listings", body = OwnerListing),
        (status = 303, description = "Not signed in, or invalid page number")
    ),
    tags = ["listings"],
    operation_id = "ownerListing"
)]
#[get("/mis-propiedades")]
pub async fn owner_listing(
    caller: Caller,
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Rejection> {
    let Some(page) = query.pagina.as_deref().and_then(PageRequest::parse) else {
        return Ok(see_other(format!("{OWNER_HOME_PATH}?pagina=1")));
    };
    let listing = state
        .listings
        .owner_listing(caller.identity(), page)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(HttpResponse::Ok().json(listing))
}

/// Lookup tables for the create form.
#[utoipa::path(
    get,
    path = "/propiedades/crear",
    responses(
        (status = 200, description = "Categories and price ranges", body = Catalogue),
        (status = 303, description = "Not signed in")
    ),
    tags = ["listings"],
    operation_id = "createPropertyForm"
)]
#[get("/propiedades/crear")]
pub async fn create_form(
    caller: Caller,
    state: web::Data<HttpState>,
) -> Result<HttpResponse, Rejection> {
    let catalogue = state
        .listings
        .catalogue()
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(HttpResponse::Ok().json(catalogue))
}

/// Create an unpublished listing; the image is attached next.
#[utoipa::path(
    post,
    path = "/propiedades/crear",
    request_body(content = PropertyFormBody, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created; continue with the image upload"),
        (status = 400, description = "Invalid form", body = Error)
    ),
    tags = ["listings"],
    operation_id = "createProperty"
)]
#[post("/propiedades/crear")]
pub async fn create(
    caller: Caller,
    state: web::Data<HttpState>,
    form: web::Form<PropertyFormBody>,
) -> Result<HttpResponse, Rejection> {
    validate_form(&*form).map_err(|err| caller.reject(err))?;
    let input = form.to_input().map_err(|err| caller.reject(err))?;
    let property = state
        .listings
        .create(caller.identity(), input)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(see_other(format!("/propiedades/agregar-imagen/{}", property.id())))
}

/// The listing awaiting its image.
#[utoipa::path(
    get,
    path = "/propiedades/agregar-imagen/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Unpublished listing", body = Property),
        (status = 303, description = "Not signed in, not the owner, or already published")
    ),
    tags = ["listings"],
    operation_id = "imageForm"
)]
#[get("/propiedades/agregar-imagen/{id}")]
pub async fn image_form(
    caller: Caller,
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Rejection> {
    let id = property_id(&id).map_err(|failure| caller.reject(failure))?;
    let property = state
        .listings
        .image_form(caller.identity(), id)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(HttpResponse::Ok().json(property))
}

/// Store the uploaded image and publish the listing.
#[utoipa::path(
    post,
    path = "/propiedades/agregar-imagen/{id}",
    params(("id" = String, Path, description = "Listing id")),
    request_body(content = Vec<u8>, content_type = "image/jpeg"),
    responses(
        (status = 303, description = "Published"),
        (status = 400, description = "Missing or unsupported image", body = Error)
    ),
    tags = ["listings"],
    operation_id = "attachImage"
)]
#[post("/propiedades/agregar-imagen/{id}")]
pub async fn attach_image(
    caller: Caller,
    state: web::Data<HttpState>,
    req: HttpRequest,
    id: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, Rejection> {
    let id = property_id(&id).map_err(|failure| caller.reject(failure))?;
    let format = image_format(&req).map_err(|err| caller.reject(err))?;
    if body.is_empty() {
        return Err(caller.reject(Error::invalid_fields(vec![FieldError::new(
            "image",
            "required",
            "an image is required",
        )])));
    }
    state
        .listings
        .attach_image(caller.identity(), id, body.to_vec(), format)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(see_other(OWNER_HOME_PATH))
}

/// The listing and lookup tables for its edit form.
#[utoipa::path(
    get,
    path = "/propiedades/editar/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing with lookup tables", body = PropertyForm),
        (status = 303, description = "Not signed in or not the owner")
    ),
    tags = ["listings"],
    operation_id = "editPropertyForm"
)]
#[get("/propiedades/editar/{id}")]
pub async fn edit_form(
    caller: Caller,
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Rejection> {
    let id = property_id(&id).map_err(|failure| caller.reject(failure))?;
    let form = state
        .listings
        .edit_form(caller.identity(), id)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(HttpResponse::Ok().json(form))
}

/// Save edited listing fields.
#[utoipa::path(
    post,
    path = "/propiedades/editar/{id}",
    params(("id" = String, Path, description = "Listing id")),
    request_body(content = PropertyFormBody, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Saved, or not signed in / not the owner"),
        (status = 400, description = "Invalid form", body = Error)
    ),
    tags = ["listings"],
    operation_id = "editProperty"
)]
#[post("/propiedades/editar/{id}")]
pub async fn edit(
    caller: Caller,
    state: web::Data<HttpState>,
    id: web::Path<String>,
    form: web::Form<PropertyFormBody>,
) -> Result<HttpResponse, Rejection> {
    let id = property_id(&id).map_err(|failure| caller.reject(failure))?;
    validate_form(&*form).map_err(|err| caller.reject(err))?;
    let input = form.to_input().map_err(|err| caller.reject(err))?;
    state
        .listings
        .edit(caller.identity(), id, input)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(see_other(OWNER_HOME_PATH))
}

/// Delete a listing and its image.
#[utoipa::path(
    post,
    path = "/propiedades/eliminar/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses((status = 303, description = "Deleted, or not signed in / not the owner")),
    tags = ["listings"],
    operation_id = "deleteProperty"
)]
#[post("/propiedades/eliminar/{id}")]
pub async fn delete(
    caller: Caller,
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Rejection> {
    let id = property_id(&id).map_err(|failure| caller.reject(failure))?;
    state
        .listings
        .delete(caller.identity(), id)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(see_other(OWNER_HOME_PATH))
}

/// Flip a listing's visibility.
#[utoipa::path(
    put,
    path = "/propiedades/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "New visibility", body = ToggleResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "No such listing for this caller", body = Error)
    ),
    tags = ["listings"],
    operation_id = "togglePublished"
)]
#[put("/propiedades/{id}")]
pub async fn toggle_published(
    caller: Caller<JsonResponse>,
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Rejection> {
    let id = property_id(&id).map_err(|failure| caller.reject(failure))?;
    let published = state
        .listings
        .toggle_published(caller.identity(), id)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(HttpResponse::Ok().json(ToggleResponse {
        resultado: true,
        published,
    }))
}

/// Messages received on a listing.
#[utoipa::path(
    get,
    path = "/mensajes/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Messages, newest first", body = PropertyMessages),
        (status = 303, description = "Not signed in or not the owner")
    ),
    tags = ["listings"],
    operation_id = "propertyMessages"
)]
#[get("/mensajes/{id}")]
pub async fn messages(
    caller: Caller,
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Rejection> {
    let id = property_id(&id).map_err(|failure| caller.reject(failure))?;
    let messages = state
        .listings
        .messages(caller.identity(), id)
        .await
        .map_err(|err| caller.reject(err))?;
    Ok(HttpResponse::Ok().json(messages))
}
