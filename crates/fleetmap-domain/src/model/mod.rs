//! Domain model types

pub mod enriched_truck;
pub mod stats;

pub use enriched_truck::{AssignedRoute, EnrichedTruck};
pub use stats::{FleetStats, RouteStats};
