//! Driving port for listing use-cases and the view models they return.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    AccessError, CallerIdentity, Catalogue, Category, CategoryId, MessageView, PageInfo,
    PageRequest, PriceRange, Property, PropertyDetailsInput, PropertyId,
};

use super::ImageFormat;

/// One row of the owner's listing page.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerListingItem {
    /// The listing.
    pub property: Property,
    /// Category name, when the category still exists.
    pub category: Option<String>,
    /// Price label, when the price range still exists.
    pub price: Option<String>,
    /// Number of messages received.
    pub messages: u64,
}

/// A page of the owner's listings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerListing {
    /// Listings on this page, newest first.
    pub items: Vec<OwnerListingItem>,
    /// Pagination summary.
    pub page: PageInfo,
}

/// A listing together with the lookup tables for its edit form.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyForm {
    /// The listing being edited.
    pub property: Property,
    /// Lookup tables.
    pub catalogue: Catalogue,
}

/// Public view of a published listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProperty {
    /// The listing.
    pub property: Property,
    /// Category, when it still exists.
    pub category: Option<Category>,
    /// Price range, when it still exists.
    pub price: Option<PriceRange>,
    /// Whether the viewer owns the listing.
    pub is_seller: bool,
    /// The viewer, when signed in.
    pub viewer: Option<CallerIdentity>,
}

/// A published listing as shown in public lists.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishedListing {
    /// The listing.
    pub property: Property,
    /// Category, when it still exists.
    pub category: Option<Category>,
    /// Price range, when it still exists.
    pub price: Option<PriceRange>,
}

/// Landing page: lookup tables and the latest published listings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    /// Lookup tables for the search and category links.
    pub catalogue: Catalogue,
    /// Newest published listings.
    pub latest: Vec<PublishedListing>,
}

/// Published listings in one category.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListings {
    pub category: Category,
    /// Newest first.
    pub listings: Vec<PublishedListing>,
}

/// Result of a title search.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// The trimmed search term.
    pub term: String,
    pub listings: Vec<PublishedListing>,
}

/// Messages received on one listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMessages {
    /// The listing.
    pub property: Property,
    /// Messages, newest first.
    pub messages: Vec<MessageView>,
}

/// Listing use-cases. Owner operations run through the ownership guard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingOperations: Send + Sync {
    /// Page through the caller's listings.
    async fn owner_listing(
        &self,
        caller: &CallerIdentity,
        page: PageRequest,
    ) -> Result<OwnerListing, AccessError>;

    /// Lookup tables for the create form.
    async fn catalogue(&self) -> Result<Catalogue, AccessError>;

    /// Create an unpublished listing without an image.
    async fn create(
        &self,
        caller: &CallerIdentity,
        input: PropertyDetailsInput,
    ) -> Result<Property, AccessError>;

    /// Listing shown on the image upload form; must be unpublished.
    async fn image_form(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
    ) -> Result<Property, AccessError>;

    /// Store an image and publish the listing; must be unpublished.
    async fn attach_image(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
        bytes: Vec<u8>,
        format: ImageFormat,
    ) -> Result<Property, AccessError>;

    /// Listing and lookup tables for the edit form.
    async fn edit_form(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
    ) -> Result<PropertyForm, AccessError>;

    /// Replace the editable fields of a listing.
    async fn edit(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
        input: PropertyDetailsInput,
    ) -> Result<Property, AccessError>;

    /// Delete a listing and its image.
    async fn delete(&self, caller: &CallerIdentity, id: PropertyId) -> Result<(), AccessError>;

    /// Flip the published flag; returns the new value.
    async fn toggle_published(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
    ) -> Result<bool, AccessError>;

    /// Public page of a published listing.
    async fn public_view(
        &self,
        viewer: Option<CallerIdentity>,
        id: PropertyId,
    ) -> Result<PublicProperty, AccessError>;

    /// Leave an inquiry on a published listing.
    async fn send_message(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
        body: String,
    ) -> Result<(), AccessError>;

    /// Messages received on one of the caller's listings.
    async fn messages(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
    ) -> Result<PropertyMessages, AccessError>;

    /// Lookup tables and the newest published listings.
    async fn home(&self) -> Result<HomePage, AccessError>;

    /// Published listings in a category; unknown categories are not found.
    async fn category_listings(&self, id: CategoryId) -> Result<CategoryListings, AccessError>;

    /// Published listings whose title contains `term`.
    async fn search(&self, term: &str) -> Result<SearchResults, AccessError>;

    /// Every published listing, newest first.
    async fn published_listings(&self) -> Result<Vec<PublishedListing>, AccessError>;
}
