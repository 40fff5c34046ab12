//! In-memory `PropertyRepository`.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{PropertyPersistenceError, PropertyRepository, PublishedFilter};
use crate::domain::{OwnedByUser, Property, PropertyId, UserId};

use super::poisoned;

/// Listings kept in a map keyed by property id.
#[derive(Debug, Default)]
pub struct InMemoryPropertyRepository {
    properties: Mutex<HashMap<PropertyId, Property>>,
}

impl InMemoryPropertyRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_properties<T>(
        &self,
        f: impl FnOnce(&mut HashMap<PropertyId, Property>) -> T,
    ) -> Result<T, PropertyPersistenceError> {
        let mut properties = self
            .properties
            .lock()
            .map_err(|_| poisoned(PropertyPersistenceError::query))?;
        Ok(f(&mut properties))
    }
}

fn matches(property: &Property, filter: &PublishedFilter) -> bool {
    let details = property.details();
    property.is_published()
        && filter
            .category
            .is_none_or(|category| details.category() == category)
        && filter.title.as_ref().is_none_or(|term| {
            details.title().to_lowercase().contains(&term.to_lowercase())
        })
}

fn newest_first(properties: &mut [Property]) {
    properties.sort_by_key(|property| (Reverse(property.created_at()), *property.id().as_uuid()));
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn find_by_id(
        &self,
        id: &PropertyId,
    ) -> Result<Option<Property>, PropertyPersistenceError> {
        self.with_properties(|properties| properties.get(id).cloned())
    }

    async fn insert(&self, property: &Property) -> Result<(), PropertyPersistenceError> {
        self.with_properties(|properties| {
            properties.insert(property.id(), property.clone());
        })
    }

    async fn update(&self, property: &Property) -> Result<(), PropertyPersistenceError> {
        self.with_properties(|properties| match properties.get_mut(&property.id()) {
            Some(stored) => {
                *stored = property.clone();
                Ok(())
            }
            None => Err(PropertyPersistenceError::missing(property.id().to_string())),
        })?
    }

    async fn delete(&self, id: &PropertyId) -> Result<(), PropertyPersistenceError> {
        self.with_properties(|properties| {
            properties.remove(id);
        })
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Property>, PropertyPersistenceError> {
        self.with_properties(|properties| {
            let mut owned: Vec<Property> = properties
                .values()
                .filter(|property| property.is_owned_by(owner))
                .cloned()
                .collect();
            newest_first(&mut owned);
            owned
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect()
        })
    }

    async fn count_by_owner(&self, owner: &UserId) -> Result<u64, PropertyPersistenceError> {
        self.with_properties(|properties| {
            properties
                .values()
                .filter(|property| property.is_owned_by(owner))
                .count() as u64
        })
    }

    async fn list_published(
        &self,
        filter: &PublishedFilter,
    ) -> Result<Vec<Property>, PropertyPersistenceError> {
        self.with_properties(|properties| {
            let mut published: Vec<Property> = properties
                .values()
                .filter(|property| matches(property, filter))
                .cloned()
                .collect();
            newest_first(&mut published);
            if let Some(limit) = filter.limit {
                published.truncate(limit as usize);
            }
            published
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::rstest;

    use super::*;
    use crate::domain::{CategoryId, PropertyDraft};
    use crate::domain::test_helpers::{details, fixed_time, identity};

    fn listing(owner: &UserId, minutes: i64) -> Property {
        draft(owner, minutes, false)
    }

    fn draft(owner: &UserId, minutes: i64, published: bool) -> Property {
        Property::from(PropertyDraft {
            id: PropertyId::random(),
            owner_id: *owner,
            details: details(),
            image: None,
            published,
            created_at: fixed_time() + Duration::minutes(minutes),
        })
    }

    #[rstest]
    #[tokio::test]
    async fn owner_listing_is_newest_first_and_paged() {
        let repo = InMemoryPropertyRepository::new();
        let owner = identity("Ada");
        let other = identity("Grace");
        for minutes in 0..3 {
            repo.insert(&listing(owner.id(), minutes)).await.expect("save");
        }
        repo.insert(&listing(other.id(), 10)).await.expect("save");

        assert_eq!(repo.count_by_owner(owner.id()).await.expect("count"), 3);
        let page = repo
            .list_by_owner(owner.id(), 2, 1)
            .await
            .expect("list");
        let times: Vec<_> = page.iter().map(Property::created_at).collect();
        assert_eq!(
            times,
            vec![fixed_time() + Duration::minutes(1), fixed_time()]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = InMemoryPropertyRepository::new();
        let stored = listing(identity("Ada").id(), 0);
        repo.insert(&stored).await.expect("save");

        repo.delete(&stored.id()).await.expect("first delete");
        repo.delete(&stored.id()).await.expect("second delete");
        assert!(repo.find_by_id(&stored.id()).await.expect("lookup").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn update_does_not_resurrect_deleted_listing() {
        let repo = InMemoryPropertyRepository::new();
        let stored = listing(identity("Ada").id(), 0);
        repo.insert(&stored).await.expect("insert");
        let mut loaded = repo
            .find_by_id(&stored.id())
            .await
            .expect("lookup")
            .expect("present");

        repo.delete(&stored.id()).await.expect("delete");
        let _ = loaded.toggle_published();

        let err = repo.update(&loaded).await.expect_err("deleted listing");
        assert!(matches!(err, PropertyPersistenceError::Missing { .. }));
        assert!(repo.find_by_id(&stored.id()).await.expect("lookup").is_none());
    }

    #[rstest]
    #[case::everything(PublishedFilter::default(), vec![2, 0])]
    #[case::limited(PublishedFilter { limit: Some(1), ..PublishedFilter::default() }, vec![2])]
    #[case::title(PublishedFilter { title: Some("JARDÍN".into()), ..PublishedFilter::default() }, vec![2, 0])]
    #[case::other_title(PublishedFilter { title: Some("loft".into()), ..PublishedFilter::default() }, vec![])]
    #[case::category(PublishedFilter { category: Some(CategoryId::new(1)), ..PublishedFilter::default() }, vec![2, 0])]
    #[case::other_category(PublishedFilter { category: Some(CategoryId::new(9)), ..PublishedFilter::default() }, vec![])]
    #[tokio::test]
    async fn published_listings_are_filtered_newest_first(
        #[case] filter: PublishedFilter,
        #[case] expected_minutes: Vec<i64>,
    ) {
        let repo = InMemoryPropertyRepository::new();
        let owner = identity("Ada");
        repo.insert(&draft(owner.id(), 0, true)).await.expect("insert");
        repo.insert(&draft(owner.id(), 1, false)).await.expect("insert");
        repo.insert(&draft(owner.id(), 2, true)).await.expect("insert");

        let found = repo.list_published(&filter).await.expect("list");

        let times: Vec<_> = found.iter().map(Property::created_at).collect();
        let expected: Vec<_> = expected_minutes
            .into_iter()
            .map(|minutes| fixed_time() + Duration::minutes(minutes))
            .collect();
        assert_eq!(times, expected);
    }
}
