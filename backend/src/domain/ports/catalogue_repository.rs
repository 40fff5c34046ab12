//! Read-side port for the category and price lookup tables.

use async_trait::async_trait;

use crate::domain::{Catalogue, Category, CategoryId, PriceRange, PriceRangeId};

use super::define_port_error;

define_port_error! {
    /// Errors raised when reading the lookup tables.
    pub enum CatalogueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalogue read connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "catalogue read query failed: {message}",
    }
}

/// Port for reading categories and price ranges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// Both lookup tables, each ordered by id.
    async fn catalogue(&self) -> Result<Catalogue, CatalogueRepositoryError>;
}

const CATEGORIES: [(i32, &str); 5] = [
    (1, "Casa"),
    (2, "Departamento"),
    (3, "Bodega"),
    (4, "Terreno"),
    (5, "Cabaña"),
];

const PRICES: [(i32, &str); 10] = [
    (1, "0 - $10,000 USD"),
    (2, "$10,000 - $30,000 USD"),
    (3, "$30,000 - $50,000 USD"),
    (4, "$50,000 - $75,000 USD"),
    (5, "$75,000 - $100,000 USD"),
    (6, "$100,000 - $150,000 USD"),
    (7, "$150,000 - $200,000 USD"),
    (8, "$200,000 - $300,000 USD"),
    (9, "$300,000 - $500,000 USD"),
    (10, "+ $500,000 USD"),
];

/// Fixture catalogue mirroring the rows seeded by the migrations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogueRepository;

#[async_trait]
impl CatalogueRepository for FixtureCatalogueRepository {
    async fn catalogue(&self) -> Result<Catalogue, CatalogueRepositoryError> {
        Ok(Catalogue {
            categories: CATEGORIES
                .iter()
                .map(|(id, name)| Category {
                    id: CategoryId::new(*id),
                    name: (*name).to_owned(),
                })
                .collect(),
            prices: PRICES
                .iter()
                .map(|(id, label)| PriceRange {
                    id: PriceRangeId::new(*id),
                    label: (*label).to_owned(),
                })
                .collect(),
        })
    }
}
