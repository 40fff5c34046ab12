//! HTTP inbound adapter.
//!
//! Handlers extract a [`gate::Caller`] (or [`gate::Viewer`] for public pages),
//! parse forms, and delegate to the driving ports held in [`state::HttpState`].

pub mod accounts;
pub mod cookies;
pub mod credential_config;
pub mod error;
pub mod gate;
pub mod health;
pub mod listings;
pub mod public;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
