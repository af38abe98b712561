//! Backend access for the fleet map
//!
//! [`HttpFleetSource`] talks to the REST API; [`CachedDrivers`] wraps any
//! source to keep the driver list for the whole session.

pub mod cache;
pub mod http;
pub mod wire;

pub use cache::CachedDrivers;
pub use http::HttpFleetSource;
