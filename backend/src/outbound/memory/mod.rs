//! In-process adapters used when no database is configured.
//!
//! State lives behind `std::sync::Mutex`; a poisoned lock surfaces as a query
//! error rather than a panic.

mod images;
mod messages;
mod properties;
mod users;

pub use images::InMemoryImageStore;
pub use messages::InMemoryMessageRepository;
pub use properties::InMemoryPropertyRepository;
pub use users::InMemoryUserRepository;

fn poisoned<E>(query: impl FnOnce(String) -> E) -> E {
    query("in-memory store lock poisoned".to_owned())
}
