//! Listing use-cases.
//!
//! Owner operations authorize through [`OwnershipGuard`] before reading or
//! mutating a listing; public operations only ever expose published listings.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::credential_verifier::map_user_error;
use crate::domain::ownership_guard::{OwnershipGuard, map_property_error};
use crate::domain::ports::{
    CatalogueRepository, CatalogueRepositoryError, CategoryListings, HomePage, ImageFormat,
    ImageStore, ImageStoreError, ListingOperations, MessagePersistenceError, MessageRepository,
    OwnerListing, OwnerListingItem, PropertyForm, PropertyMessages, PropertyPersistenceError,
    PropertyRepository, PublicProperty, PublishedFilter, PublishedListing, SearchResults,
    UserRepository,
};
use crate::domain::{
    AccessError, CallerIdentity, Catalogue, CategoryId, Error, GuardFailure, Message, MessageBody,
    MessageView, OwnedByUser, PageInfo, PageRequest, Property, PropertyDetails,
    PropertyDetailsInput, PropertyId, PropertyValidationError, RequiredState, UserId,
};

/// Number of listings on the landing page.
pub const HOME_LATEST: u32 = 3;

/// Collaborators of [`ListingService`].
pub struct ListingRepositories<P, M, C, I, U> {
    /// Listing storage.
    pub properties: Arc<P>,
    /// Message storage.
    pub messages: Arc<M>,
    /// Lookup tables.
    pub catalogue: Arc<C>,
    /// Image storage.
    pub images: Arc<I>,
    /// User lookup for message senders.
    pub users: Arc<U>,
}

/// Listing service implementing [`ListingOperations`].
#[derive(Clone)]
pub struct ListingService<P, M, C, I, U> {
    guard: OwnershipGuard<P>,
    properties: Arc<P>,
    messages: Arc<M>,
    catalogue: Arc<C>,
    images: Arc<I>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

fn map_message_error(error: MessagePersistenceError) -> Error {
    match error {
        MessagePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("message repository unavailable: {message}"))
        }
        MessagePersistenceError::Query { message } => {
            Error::internal(format!("message repository error: {message}"))
        }
    }
}

fn map_catalogue_error(error: CatalogueRepositoryError) -> Error {
    match error {
        CatalogueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalogue unavailable: {message}"))
        }
        CatalogueRepositoryError::Query { message } => {
            Error::internal(format!("catalogue error: {message}"))
        }
    }
}

fn map_image_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::Io { message } => Error::internal(format!("image store error: {message}")),
    }
}

impl<P, M, C, I, U> ListingService<P, M, C, I, U>
where
    P: PropertyRepository,
    M: MessageRepository,
    C: CatalogueRepository,
    I: ImageStore,
    U: UserRepository,
{
    /// Create a service from its collaborators.
    pub fn new(repos: ListingRepositories<P, M, C, I, U>, clock: Arc<dyn Clock>) -> Self {
        let ListingRepositories {
            properties,
            messages,
            catalogue,
            images,
            users,
        } = repos;
        Self {
            guard: OwnershipGuard::new(Arc::clone(&properties)),
            properties,
            messages,
            catalogue,
            images,
            users,
            clock,
        }
    }

    async fn load_catalogue(&self) -> Result<Catalogue, Error> {
        self.catalogue
            .catalogue()
            .await
            .map_err(map_catalogue_error)
    }

    async fn validate_details(&self, input: PropertyDetailsInput) -> Result<PropertyDetails, Error> {
        let details = PropertyDetails::try_new(input)?;
        let catalogue = self.load_catalogue().await?;
        if catalogue.category(details.category()).is_none() {
            return Err(PropertyValidationError::UnknownCategory.into());
        }
        if catalogue.price(details.price()).is_none() {
            return Err(PropertyValidationError::UnknownPriceRange.into());
        }
        Ok(details)
    }

    async fn insert(&self, property: &Property) -> Result<(), Error> {
        self.properties
            .insert(property)
            .await
            .map_err(map_property_error)
    }

    /// Write back a listing loaded through the guard. A listing deleted in
    /// the meantime stays deleted.
    async fn update(&self, property: &Property) -> Result<(), AccessError> {
        match self.properties.update(property).await {
            Ok(()) => Ok(()),
            Err(PropertyPersistenceError::Missing { .. }) => {
                warn!(property = %property.id(), "listing deleted during update");
                Err(GuardFailure::ResourceNotFound.into())
            }
            Err(err) => Err(map_property_error(err).into()),
        }
    }

    async fn published(&self, id: PropertyId) -> Result<Property, Error> {
        self.properties
            .find_by_id(&id)
            .await
            .map_err(map_property_error)?
            .filter(Property::is_published)
            .ok_or_else(|| Error::not_found("property not found"))
    }

    /// Published listings matching `filter`, joined with the lookup tables.
    async fn browse(
        &self,
        catalogue: &Catalogue,
        filter: PublishedFilter,
    ) -> Result<Vec<PublishedListing>, Error> {
        let properties = self
            .properties
            .list_published(&filter)
            .await
            .map_err(map_property_error)?;
        Ok(properties
            .into_iter()
            .map(|property| {
                let details = property.details();
                PublishedListing {
                    category: catalogue.category(details.category()).cloned(),
                    price: catalogue.price(details.price()).cloned(),
                    property,
                }
            })
            .collect())
    }

    async fn sender_identities(
        &self,
        messages: &[Message],
    ) -> Result<HashMap<UserId, CallerIdentity>, Error> {
        let mut identities = HashMap::new();
        for message in messages {
            if identities.contains_key(&message.sender_id) {
                continue;
            }
            if let Some(user) = self
                .users
                .find_by_id(&message.sender_id)
                .await
                .map_err(map_user_error)?
            {
                identities.insert(message.sender_id, user.identity());
            }
        }
        Ok(identities)
    }
}

#[async_trait]
impl<P, M, C, I, U> ListingOperations for ListingService<P, M, C, I, U>
where
    P: PropertyRepository,
    M: MessageRepository,
    C: CatalogueRepository,
    I: ImageStore,
    U: UserRepository,
{
    async fn owner_listing(
        &self,
        caller: &CallerIdentity,
        page: PageRequest,
    ) -> Result<OwnerListing, AccessError> {
        let total = self
            .properties
            .count_by_owner(caller.id())
            .await
            .map_err(map_property_error)?;
        let properties = self
            .properties
            .list_by_owner(caller.id(), page.limit(), page.offset())
            .await
            .map_err(map_property_error)?;
        let ids: Vec<PropertyId> = properties.iter().map(Property::id).collect();
        let counts = self
            .messages
            .count_for_properties(&ids)
            .await
            .map_err(map_message_error)?;
        let catalogue = self.load_catalogue().await?;

        let items = properties
            .into_iter()
            .map(|property| {
                let details = property.details();
                OwnerListingItem {
                    category: catalogue
                        .category(details.category())
                        .map(|category| category.name.clone()),
                    price: catalogue
                        .price(details.price())
                        .map(|price| price.label.clone()),
                    messages: counts.get(&property.id()).copied().unwrap_or(0),
                    property,
                }
            })
            .collect();

        Ok(OwnerListing {
            items,
            page: PageInfo::new(page, total),
        })
    }

    async fn catalogue(&self) -> Result<Catalogue, AccessError> {
        Ok(self.load_catalogue().await?)
    }

    async fn create(
        &self,
        caller: &CallerIdentity,
        input: PropertyDetailsInput,
    ) -> Result<Property, AccessError> {
        let details = self.validate_details(input).await?;
        let property = Property::create(*caller.id(), details, self.clock.utc());
        self.insert(&property).await?;
        info!(owner = %caller.id(), property = %property.id(), "listing created");
        Ok(property)
    }

    async fn image_form(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
    ) -> Result<Property, AccessError> {
        self.guard
            .authorize(caller, id, RequiredState::Unpublished)
            .await
    }

    async fn attach_image(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
        bytes: Vec<u8>,
        format: ImageFormat,
    ) -> Result<Property, AccessError> {
        let mut property = self
            .guard
            .authorize(caller, id, RequiredState::Unpublished)
            .await?;
        let image = self
            .images
            .store(&bytes, format)
            .await
            .map_err(map_image_error)?;
        property.attach_image(image.clone());
        if let Err(err) = self.update(&property).await {
            if let Err(cleanup) = self.images.remove(&image).await {
                warn!(image = %image.as_str(), error = %cleanup, "orphaned image left behind");
            }
            return Err(err);
        }
        info!(property = %id, image = %image.as_str(), "listing published with image");
        Ok(property)
    }

    async fn edit_form(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
    ) -> Result<PropertyForm, AccessError> {
        let property = self.guard.authorize(caller, id, RequiredState::Any).await?;
        let catalogue = self.load_catalogue().await?;
        Ok(PropertyForm {
            property,
            catalogue,
        })
    }

    async fn edit(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
        input: PropertyDetailsInput,
    ) -> Result<Property, AccessError> {
        let mut property = self.guard.authorize(caller, id, RequiredState::Any).await?;
        let details = self.validate_details(input).await?;
        property.apply(details);
        self.update(&property).await?;
        info!(property = %id, "listing updated");
        Ok(property)
    }

    async fn delete(&self, caller: &CallerIdentity, id: PropertyId) -> Result<(), AccessError> {
        let property = self.guard.authorize(caller, id, RequiredState::Any).await?;
        self.properties
            .delete(&id)
            .await
            .map_err(map_property_error)?;
        if let Some(image) = property.image() {
            if let Err(err) = self.images.remove(image).await {
                error!(property = %id, image = %image.as_str(), error = %err, "failed to remove listing image");
            }
        }
        info!(property = %id, "listing deleted");
        Ok(())
    }

    async fn toggle_published(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
    ) -> Result<bool, AccessError> {
        let mut property = self.guard.authorize(caller, id, RequiredState::Any).await?;
        let published = property.toggle_published();
        self.update(&property).await?;
        info!(property = %id, published, "listing visibility changed");
        Ok(published)
    }

    async fn public_view(
        &self,
        viewer: Option<CallerIdentity>,
        id: PropertyId,
    ) -> Result<PublicProperty, AccessError> {
        let property = self.published(id).await?;
        let catalogue = self.load_catalogue().await?;
        let details = property.details();
        let is_seller = viewer
            .as_ref()
            .is_some_and(|viewer| property.is_owned_by(viewer.id()));
        Ok(PublicProperty {
            category: catalogue.category(details.category()).cloned(),
            price: catalogue.price(details.price()).cloned(),
            is_seller,
            viewer,
            property,
        })
    }

    async fn send_message(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
        body: String,
    ) -> Result<(), AccessError> {
        let property = self.published(id).await?;
        if property.is_owned_by(caller.id()) {
            return Err(Error::forbidden("sellers cannot message their own listing").into());
        }
        let body = MessageBody::new(body).map_err(Error::from)?;
        let message = Message::new(id, *caller.id(), body, self.clock.utc());
        self.messages
            .insert(&message)
            .await
            .map_err(map_message_error)?;
        info!(property = %id, sender = %caller.id(), "message sent");
        Ok(())
    }

    async fn messages(
        &self,
        caller: &CallerIdentity,
        id: PropertyId,
    ) -> Result<PropertyMessages, AccessError> {
        let property = self.guard.authorize(caller, id, RequiredState::Any).await?;
        let messages = self
            .messages
            .list_for_property(&id)
            .await
            .map_err(map_message_error)?;
        let senders = self.sender_identities(&messages).await?;
        let messages = messages
            .into_iter()
            .filter_map(|message| {
                let sender = senders.get(&message.sender_id)?.clone();
                Some(MessageView {
                    body: message.body,
                    created_at: message.created_at,
                    sender,
                })
            })
            .collect();
        Ok(PropertyMessages { property, messages })
    }

    async fn home(&self) -> Result<HomePage, AccessError> {
        let catalogue = self.load_catalogue().await?;
        let filter = PublishedFilter {
            limit: Some(HOME_LATEST),
            ..PublishedFilter::default()
        };
        let latest = self.browse(&catalogue, filter).await?;
        Ok(HomePage { catalogue, latest })
    }

    async fn category_listings(&self, id: CategoryId) -> Result<CategoryListings, AccessError> {
        let catalogue = self.load_catalogue().await?;
        let category = catalogue
            .category(id)
            .cloned()
            .ok_or_else(|| Error::not_found("category not found"))?;
        let filter = PublishedFilter {
            category: Some(id),
            ..PublishedFilter::default()
        };
        let listings = self.browse(&catalogue, filter).await?;
        Ok(CategoryListings { category, listings })
    }

    async fn search(&self, term: &str) -> Result<SearchResults, AccessError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(Error::invalid_request("search term is required").into());
        }
        let catalogue = self.load_catalogue().await?;
        let filter = PublishedFilter {
            title: Some(term.to_owned()),
            ..PublishedFilter::default()
        };
        let listings = self.browse(&catalogue, filter).await?;
        Ok(SearchResults {
            term: term.to_owned(),
            listings,
        })
    }

    async fn published_listings(&self) -> Result<Vec<PublishedListing>, AccessError> {
        let catalogue = self.load_catalogue().await?;
        Ok(self.browse(&catalogue, PublishedFilter::default()).await?)
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
