//! Aggregate counters shown above the map

use std::collections::HashSet;

use serde::Serialize;

use fleetmap_types::{Route, Truck, TruckState};

/// Fleet totals by operational state.
///
/// Computed from the truck list alone, so trucks that have not reported
/// yet still count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStats {
    pub total: usize,
    pub available: usize,
    pub in_route: usize,
    pub maintenance: usize,
    pub out_of_service: usize,
}

impl FleetStats {
    pub fn from_trucks(trucks: &[Truck]) -> Self {
        let mut stats = FleetStats {
            total: trucks.len(),
            ..Default::default()
        };
        for truck in trucks {
            match truck.state {
                TruckState::Available => stats.available += 1,
                TruckState::InRoute => stats.in_route += 1,
                TruckState::InMaintenance => stats.maintenance += 1,
                TruckState::OutOfService => stats.out_of_service += 1,
                TruckState::Unknown => {}
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub total_routes: usize,
    pub active_today: usize,
    pub total_stores: usize,
    pub assigned_drivers: usize,
}

impl RouteStats {
    /// `today` uses backend numbering, 0 = Sunday
    pub fn from_routes(routes: &[Route], today: u8) -> Self {
        let mut stores = HashSet::new();
        let mut drivers = HashSet::new();
        for route in routes {
            for stop in &route.stops {
                stores.insert(stop.store.id.as_str());
            }
            if let Some(driver) = &route.driver {
                drivers.insert(driver.id.as_str());
            }
        }
        RouteStats {
            total_routes: routes.len(),
            active_today: routes.iter().filter(|r| r.runs_on(today)).count(),
            total_stores: stores.len(),
            assigned_drivers: drivers.len(),
        }
    }
}
