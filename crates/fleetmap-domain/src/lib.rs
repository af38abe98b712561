//! Fleet domain: reconciliation of telemetry with reference data, route
//! bookkeeping, and the contract the backend client fulfils.

pub mod model;
pub mod repository;
pub mod route_store;
pub mod service;

pub use route_store::RouteStore;
