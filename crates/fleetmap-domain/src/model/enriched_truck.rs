//! Render-ready truck record built once per poll tick

use serde::Serialize;

use fleetmap_types::{Driver, GeoPoint, Reading, RouteId, Truck};

/// The route a truck is driving, by way of its driver
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedRoute {
    pub id: RouteId,
    pub name: String,
}

/// Truck + latest reading + driver + route.
///
/// Rebuilt from scratch on every tick and dropped after rendering; never
/// patched in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTruck {
    pub truck: Truck,
    pub reading: Reading,
    pub driver: Option<Driver>,
    /// `None` is the valid "unassigned" state
    pub assigned_route: Option<AssignedRoute>,
}

impl EnrichedTruck {
    pub fn id(&self) -> &str {
        &self.truck.id
    }

    /// Position of the latest reading, if it can be drawn
    pub fn location(&self) -> Option<GeoPoint> {
        self.reading.location.and_then(GeoPoint::validated)
    }

    pub fn driver_first_name(&self) -> &str {
        self.driver
            .as_ref()
            .map(|d| d.name.first_name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
    }

    pub fn route_name(&self) -> &str {
        self.assigned_route
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or("No Route Assigned")
    }
}
