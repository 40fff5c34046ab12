//! PostgreSQL-backed `CatalogueRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CatalogueRepository, CatalogueRepositoryError};
use crate::domain::{Catalogue, Category, CategoryId, PriceRange, PriceRangeId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CategoryRow, PriceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{categories, prices};

/// Diesel-backed implementation of the `CatalogueRepository` port.
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogueRepositoryError {
    map_basic_pool_error(error, CatalogueRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogueRepositoryError {
    map_basic_diesel_error(
        error,
        CatalogueRepositoryError::query,
        CatalogueRepositoryError::connection,
    )
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn catalogue(&self) -> Result<Catalogue, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let category_rows: Vec<CategoryRow> = categories::table
            .order(categories::id.asc())
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let price_rows: Vec<PriceRow> = prices::table
            .order(prices::id.asc())
            .select(PriceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Catalogue {
            categories: category_rows
                .into_iter()
                .map(|row| Category {
                    id: CategoryId::new(row.id),
                    name: row.name,
                })
                .collect(),
            prices: price_rows
                .into_iter()
                .map(|row| PriceRange {
                    id: PriceRangeId::new(row.id),
                    label: row.label,
                })
                .collect(),
        })
    }
}
