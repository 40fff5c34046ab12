//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM.
//! - **memory**: in-process repositories used without a database.
//! - **jwt**, **argon2_hasher**: credential signing and password hashing.
//! - **images**: uploaded listing images on disk.
//! - **mailer**: account emails.
//!
//! Adapters translate between domain types and infrastructure and contain no
//! business rules.

pub mod argon2_hasher;
pub mod images;
pub mod jwt;
pub mod mailer;
pub mod memory;
pub mod persistence;
