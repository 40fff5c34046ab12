//! Request middleware.

pub mod same_origin;
pub mod trace;

pub use same_origin::SameOrigin;
pub use trace::Trace;
