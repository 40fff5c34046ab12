//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel row structs and domain types and
//! map database failures onto the port error enums. Row structs and the
//! schema stay private to this module.
//!
//! ```ignore
//! use listings::outbound::persistence::{DbPool, DieselPropertyRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/listings")).await?;
//! let properties = DieselPropertyRepository::new(pool.clone());
//! ```

mod diesel_basic_error_mapping;
mod diesel_catalogue_repository;
mod diesel_message_repository;
mod diesel_property_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_property_repository::DieselPropertyRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
