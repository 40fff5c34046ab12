//! PostgreSQL-backed `PropertyRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PropertyPersistenceError, PropertyRepository, PublishedFilter};
use crate::domain::{
    CategoryId, ImageName, OwnedByUser, PriceRangeId, Property, PropertyDetails,
    PropertyDetailsInput, PropertyDraft, PropertyId, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{PropertyChangeset, PropertyRow};
use super::pool::{DbPool, PoolError};
use super::schema::properties;

/// Diesel-backed implementation of the `PropertyRepository` port.
#[derive(Clone)]
pub struct DieselPropertyRepository {
    pool: DbPool,
}

impl DieselPropertyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PropertyPersistenceError {
    map_basic_pool_error(error, PropertyPersistenceError::connection)
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in `term` escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn map_diesel_error(error: diesel::result::Error) -> PropertyPersistenceError {
    map_basic_diesel_error(
        error,
        PropertyPersistenceError::query,
        PropertyPersistenceError::connection,
    )
}

fn row_to_property(row: PropertyRow) -> Result<Property, PropertyPersistenceError> {
    let details = PropertyDetails::try_new(PropertyDetailsInput {
        title: row.title,
        description: row.description,
        category: CategoryId::new(row.category_id),
        price: PriceRangeId::new(row.price_id),
        rooms: row.rooms,
        parking: row.parking,
        wc: row.wc,
        street: row.street,
        lat: row.lat,
        lng: row.lng,
    })
    .map_err(|err| PropertyPersistenceError::query(format!("invalid stored property: {err}")))?;
    let image = row
        .image
        .map(ImageName::new)
        .transpose()
        .map_err(|err| PropertyPersistenceError::query(err.to_string()))?;

    Ok(Property::from(PropertyDraft {
        id: PropertyId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        details,
        image,
        published: row.published,
        created_at: row.created_at,
    }))
}

fn changeset(property: &Property) -> PropertyChangeset<'_> {
    let details = property.details();
    let location = details.location();
    PropertyChangeset {
        id: *property.id().as_uuid(),
        owner_id: *property.owner_id().as_uuid(),
        category_id: details.category().get(),
        price_id: details.price().get(),
        title: details.title(),
        description: details.description(),
        rooms: details.rooms(),
        parking: details.parking(),
        wc: details.wc(),
        street: details.street(),
        lat: location.lat,
        lng: location.lng,
        image: property.image().map(ImageName::as_str),
        published: property.is_published(),
        created_at: property.created_at(),
    }
}

#[async_trait]
impl PropertyRepository for DieselPropertyRepository {
    async fn find_by_id(
        &self,
        id: &PropertyId,
    ) -> Result<Option<Property>, PropertyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PropertyRow> = properties::table
            .find(*id.as_uuid())
            .select(PropertyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_property).transpose()
    }

    async fn insert(&self, property: &Property) -> Result<(), PropertyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(properties::table)
            .values(&changeset(property))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, property: &Property) -> Result<(), PropertyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(properties::table.find(*property.id().as_uuid()))
            .set(&changeset(property))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(PropertyPersistenceError::missing(property.id().to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &PropertyId) -> Result<(), PropertyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(properties::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Property>, PropertyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PropertyRow> = properties::table
            .filter(properties::owner_id.eq(*owner.as_uuid()))
            .order((properties::created_at.desc(), properties::id.asc()))
            .limit(i64::from(limit))
            .offset(i64::from(offset))
            .select(PropertyRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_property).collect()
    }

    async fn count_by_owner(&self, owner: &UserId) -> Result<u64, PropertyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = properties::table
            .filter(properties::owner_id.eq(*owner.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(count)
            .map_err(|_| PropertyPersistenceError::query("negative listing count"))
    }

    async fn list_published(
        &self,
        filter: &PublishedFilter,
    ) -> Result<Vec<Property>, PropertyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = properties::table
            .filter(properties::published.eq(true))
            .order((properties::created_at.desc(), properties::id.asc()))
            .select(PropertyRow::as_select())
            .into_boxed();
        if let Some(category) = filter.category {
            query = query.filter(properties::category_id.eq(category.get()));
        }
        if let Some(term) = &filter.title {
            query = query.filter(properties::title.ilike(like_pattern(term)));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(i64::from(limit));
        }
        let rows: Vec<PropertyRow> = query
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_property).collect()
    }
}
