//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! Regenerate with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Public name, at most 60 characters.
        display_name -> Varchar,
        /// Unique, lower-cased login address.
        email -> Varchar,
        /// PHC-formatted Argon2id hash.
        password_hash -> Text,
        /// Pending confirmation or password reset token.
        token -> Nullable<Varchar>,
        confirmed -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Property categories.
    categories (id) {
        id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    /// Price brackets.
    prices (id) {
        id -> Int4,
        label -> Varchar,
    }
}

diesel::table! {
    /// Listings.
    properties (id) {
        id -> Uuid,
        owner_id -> Uuid,
        category_id -> Int4,
        price_id -> Int4,
        title -> Varchar,
        description -> Varchar,
        rooms -> Int2,
        parking -> Int2,
        wc -> Int2,
        street -> Varchar,
        lat -> Float8,
        lng -> Float8,
        /// Stored image file name, set when the image is attached.
        image -> Nullable<Varchar>,
        published -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Inquiries left on listings.
    messages (id) {
        id -> Uuid,
        property_id -> Uuid,
        sender_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(properties -> users (owner_id));
diesel::joinable!(properties -> categories (category_id));
diesel::joinable!(properties -> prices (price_id));
diesel::joinable!(messages -> properties (property_id));
diesel::joinable!(messages -> users (sender_id));

diesel::allow_tables_to_appear_in_same_query!(categories, messages, prices, properties, users);
