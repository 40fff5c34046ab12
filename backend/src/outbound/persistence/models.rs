//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{categories, messages, prices, properties, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub token: Option<String>,
    pub confirmed: bool,
}

/// Insertable and changeset struct for user records.
///
/// `treat_none_as_null` lets a cleared token overwrite the stored value.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub token: Option<&'a str>,
    pub confirmed: bool,
}

/// Row struct for reading from the categories table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: i32,
    pub name: String,
}

/// Row struct for reading from the prices table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PriceRow {
    pub id: i32,
    pub label: String,
}

/// Row struct for reading from the properties table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PropertyRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: i32,
    pub price_id: i32,
    pub title: String,
    pub description: String,
    pub rooms: i16,
    pub parking: i16,
    pub wc: i16,
    pub street: String,
    pub lat: f64,
    pub lng: f64,
    pub image: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable and changeset struct for property records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = properties)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PropertyChangeset<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: i32,
    pub price_id: i32,
    pub title: &'a str,
    pub description: &'a str,
    pub rooms: i16,
    pub parking: i16,
    pub wc: i16,
    pub street: &'a str,
    pub lat: f64,
    pub lng: f64,
    pub image: Option<&'a str>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub property_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating message records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub property_id: Uuid,
    pub sender_id: Uuid,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
}
