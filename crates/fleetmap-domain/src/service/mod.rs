//! Domain services

pub mod reconciler;

pub use reconciler::{find_driver_for_truck, find_route_for_driver, latest_readings, reconcile};
