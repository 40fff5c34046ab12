//! Property listings.
//!
//! A [`Property`] is owned by exactly one user. It starts unpublished with no
//! image; attaching an image publishes it, after which the owner may flip the
//! published flag freely.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::access::OwnedByUser;
use super::catalogue::{CategoryId, PriceRangeId};
use super::error::{Error, FieldError};
use super::user::UserId;

/// Maximum title length, in characters.
pub const TITLE_MAX: usize = 100;
/// Maximum description length, in characters.
pub const DESCRIPTION_MAX: usize = 200;
/// Maximum street length, in characters.
pub const STREET_MAX: usize = 120;

/// Stable property identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "0b7f6f0e-3f0c-4a53-9d0a-0a9c1f3f7b11")]
pub struct PropertyId(Uuid);

impl PropertyId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation errors for listing details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyValidationError {
    /// Title missing.
    #[error("title is required")]
    EmptyTitle,
    /// Title longer than [`TITLE_MAX`].
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Description missing.
    #[error("description must not be empty")]
    EmptyDescription,
    /// Description longer than [`DESCRIPTION_MAX`].
    #[error("description must be at most {max} characters")]
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Street longer than [`STREET_MAX`].
    #[error("street must be at most {max} characters")]
    StreetTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// A room count was negative.
    #[error("{field} must not be negative")]
    NegativeCount {
        /// Offending field.
        field: &'static str,
    },
    /// Latitude or longitude out of range.
    #[error("location is outside the valid coordinate range")]
    InvalidLocation,
    /// Referenced category does not exist.
    #[error("unknown category")]
    UnknownCategory,
    /// Referenced price range does not exist.
    #[error("unknown price range")]
    UnknownPriceRange,
}

impl PropertyValidationError {
    /// Name of the form field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyDescription | Self::DescriptionTooLong { .. } => "description",
            Self::StreetTooLong { .. } => "street",
            Self::NegativeCount { field } => field,
            Self::InvalidLocation => "lat",
            Self::UnknownCategory => "category",
            Self::UnknownPriceRange => "price",
        }
    }
}

impl From<PropertyValidationError> for Error {
    fn from(err: PropertyValidationError) -> Self {
        Error::invalid_fields(vec![FieldError::new(err.field(), "invalid", err.to_string())])
    }
}

/// Geographic position of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Location {
    /// Validate coordinate ranges.
    pub fn new(lat: f64, lng: f64) -> Result<Self, PropertyValidationError> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
        if lat_ok && lng_ok {
            Ok(Self { lat, lng })
        } else {
            Err(PropertyValidationError::InvalidLocation)
        }
    }
}

/// Raw listing fields after type conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDetailsInput {
    /// Listing title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category reference.
    pub category: CategoryId,
    /// Price range reference.
    pub price: PriceRangeId,
    /// Number of rooms.
    pub rooms: i16,
    /// Number of parking spots.
    pub parking: i16,
    /// Number of bathrooms.
    pub wc: i16,
    /// Street address; may be empty.
    pub street: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Validated, editable listing fields.
///
/// ## Invariants
/// - `title` and `description` are non-empty and within their limits.
/// - Counts are non-negative.
/// - `location` is within WGS84 ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    title: String,
    description: String,
    category: CategoryId,
    price: PriceRangeId,
    rooms: i16,
    parking: i16,
    wc: i16,
    street: String,
    location: Location,
}

fn check_count(value: i16, field: &'static str) -> Result<i16, PropertyValidationError> {
    if value < 0 {
        Err(PropertyValidationError::NegativeCount { field })
    } else {
        Ok(value)
    }
}

impl PropertyDetails {
    /// Validate raw listing fields.
    ///
    /// # Examples
    /// ```
    /// use listings::domain::{CategoryId, PriceRangeId, PropertyDetails, PropertyDetailsInput};
    ///
    /// let details = PropertyDetails::try_new(PropertyDetailsInput {
    ///     title: "Casa en la playa".into(),
    ///     description: "Two floors, sea view".into(),
    ///     category: CategoryId::new(1),
    ///     price: PriceRangeId::new(3),
    ///     rooms: 3,
    ///     parking: 1,
    ///     wc: 2,
    ///     street: String::new(),
    ///     lat: 19.43,
    ///     lng: -99.13,
    /// })
    /// .expect("valid details");
    /// assert_eq!(details.title(), "Casa en la playa");
    /// ```
    pub fn try_new(input: PropertyDetailsInput) -> Result<Self, PropertyValidationError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(PropertyValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(PropertyValidationError::TitleTooLong { max: TITLE_MAX });
        }
        let description = input.description.trim();
        if description.is_empty() {
            return Err(PropertyValidationError::EmptyDescription);
        }
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(PropertyValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        let street = input.street.trim();
        if street.chars().count() > STREET_MAX {
            return Err(PropertyValidationError::StreetTooLong { max: STREET_MAX });
        }

        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            category: input.category,
            price: input.price,
            rooms: check_count(input.rooms, "rooms")?,
            parking: check_count(input.parking, "parking")?,
            wc: check_count(input.wc, "wc")?,
            street: street.to_owned(),
            location: Location::new(input.lat, input.lng)?,
        })
    }

    /// Listing title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Category reference.
    pub fn category(&self) -> CategoryId {
        self.category
    }

    /// Price range reference.
    pub fn price(&self) -> PriceRangeId {
        self.price
    }

    /// Number of rooms.
    pub fn rooms(&self) -> i16 {
        self.rooms
    }

    /// Number of parking spots.
    pub fn parking(&self) -> i16 {
        self.parking
    }

    /// Number of bathrooms.
    pub fn wc(&self) -> i16 {
        self.wc
    }

    /// Street address.
    pub fn street(&self) -> &str {
        &self.street
    }

    /// Map position.
    pub fn location(&self) -> Location {
        self.location
    }
}

/// Stored image file name, e.g. `3f0c….jpg`.
///
/// Never contains path separators, so it is safe to join onto the uploads
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "0b7f6f0e-3f0c-4a53-9d0a-0a9c1f3f7b11.jpg")]
pub struct ImageName(String);

/// Error raised for unsafe image names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid image name: {0}")]
pub struct InvalidImageName(String);

impl ImageName {
    /// Validate a stored file name.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidImageName> {
        let name = name.into();
        let safe = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_');
        if safe {
            Ok(Self(name))
        } else {
            Err(InvalidImageName(name))
        }
    }
}

impl ImageName {
    /// Borrow the file name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ImageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ImageName> for String {
    fn from(value: ImageName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageName {
    type Error = InvalidImageName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Field values used to rehydrate a [`Property`] from storage.
#[derive(Debug, Clone)]
pub struct PropertyDraft {
    /// Identifier.
    pub id: PropertyId,
    /// Owning user.
    pub owner_id: UserId,
    /// Editable fields.
    pub details: PropertyDetails,
    /// Attached image, if any.
    pub image: Option<ImageName>,
    /// Visibility flag.
    pub published: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A listing owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    id: PropertyId,
    owner_id: UserId,
    details: PropertyDetails,
    image: Option<ImageName>,
    published: bool,
    created_at: DateTime<Utc>,
}

impl From<PropertyDraft> for Property {
    fn from(draft: PropertyDraft) -> Self {
        let PropertyDraft {
            id,
            owner_id,
            details,
            image,
            published,
            created_at,
        } = draft;
        Self {
            id,
            owner_id,
            details,
            image,
            published,
            created_at,
        }
    }
}

impl Property {
    /// Create a new unpublished listing without an image.
    #[must_use]
    pub fn create(owner_id: UserId, details: PropertyDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id: PropertyId::random(),
            owner_id,
            details,
            image: None,
            published: false,
            created_at,
        }
    }

    /// Identifier.
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Editable fields.
    pub fn details(&self) -> &PropertyDetails {
        &self.details
    }

    /// Attached image, if any.
    pub fn image(&self) -> Option<&ImageName> {
        self.image.as_ref()
    }

    /// Whether the listing is visible publicly.
    pub fn is_published(&self) -> bool {
        self.published
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replace the editable fields.
    pub fn apply(&mut self, details: PropertyDetails) {
        self.details = details;
    }

    /// Attach an image and publish the listing.
    pub fn attach_image(&mut self, image: ImageName) {
        self.image = Some(image);
        self.published = true;
    }

    /// Flip the published flag and return the new value.
    pub fn toggle_published(&mut self) -> bool {
        self.published = !self.published;
        self.published
    }
}

impl OwnedByUser for Property {
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}
