//! Read-only lookup tables referenced by listings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of a property category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryId(i32);

impl CategoryId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Identifier of a price range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PriceRangeId(i32);

impl PriceRangeId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Property category such as "house" or "warehouse".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

/// Price bracket a listing falls into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceRange {
    /// Identifier.
    pub id: PriceRangeId,
    /// Display label.
    pub label: String,
}

/// Both lookup tables, as shown on the create and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Catalogue {
    /// All categories ordered by id.
    pub categories: Vec<Category>,
    /// All price ranges ordered by id.
    pub prices: Vec<PriceRange>,
}

impl Catalogue {
    /// Look up a category by id.
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Look up a price range by id.
    #[must_use]
    pub fn price(&self, id: PriceRangeId) -> Option<&PriceRange> {
        self.prices.iter().find(|price| price.id == id)
    }
}
