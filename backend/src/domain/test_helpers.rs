//! Builders shared by the domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    CallerIdentity, CategoryId, DisplayName, Email, PasswordHash, PriceRangeId, Property,
    PropertyDetails, PropertyDetailsInput, PropertyDraft, PropertyId, User, UserDraft, UserId,
};

pub(crate) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid fixture time")
}

pub(crate) fn user(display_name: &str, confirmed: bool) -> User {
    User::from(UserDraft {
        id: UserId::random(),
        display_name: DisplayName::new(display_name).expect("fixture display name"),
        email: Email::new(format!("{}@example.com", display_name.to_lowercase()))
            .expect("fixture email"),
        password_hash: PasswordHash::new("hashed:secret1"),
        token: None,
        confirmed,
    })
}

pub(crate) fn identity(display_name: &str) -> CallerIdentity {
    user(display_name, true).identity()
}

pub(crate) fn details_input() -> PropertyDetailsInput {
    PropertyDetailsInput {
        title: "Casa con jardín".into(),
        description: "Three bedrooms near the park".into(),
        category: CategoryId::new(1),
        price: PriceRangeId::new(2),
        rooms: 3,
        parking: 1,
        wc: 2,
        street: "Av. Reforma 1".into(),
        lat: 19.43,
        lng: -99.13,
    }
}

pub(crate) fn details() -> PropertyDetails {
    PropertyDetails::try_new(details_input()).expect("fixture details")
}

pub(crate) fn property(owner: &UserId, published: bool) -> Property {
    Property::from(PropertyDraft {
        id: PropertyId::random(),
        owner_id: *owner,
        details: details(),
        image: None,
        published,
        created_at: fixed_time(),
    })
}

/// Clock frozen at [`fixed_time`].
pub(crate) struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        fixed_time().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        fixed_time()
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock)
}
