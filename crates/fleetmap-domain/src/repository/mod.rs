//! Contract for the remote fleet backend

use std::sync::Arc;

use async_trait::async_trait;

use fleetmap_types::{DayFilter, Driver, Reading, Result, Route, Truck};

/// Source of fleet data.
///
/// Every call is one stateless round-trip. Implementations do not retry;
/// the poll loop decides when to try again.
#[async_trait]
pub trait FleetSource: Send + Sync {
    /// All raw sensor readings
    async fn fetch_readings(&self) -> Result<Vec<Reading>>;

    /// Truck reference data
    async fn fetch_trucks(&self) -> Result<Vec<Truck>>;

    /// Drivers, with their default truck
    async fn fetch_drivers(&self) -> Result<Vec<Driver>>;

    /// Routes delivering on the given day
    async fn fetch_routes(&self, day: DayFilter) -> Result<Vec<Route>>;

    /// Delete a route by id
    async fn delete_route(&self, route_id: &str) -> Result<()>;
}

#[async_trait]
impl<S: FleetSource + ?Sized> FleetSource for Arc<S> {
    async fn fetch_readings(&self) -> Result<Vec<Reading>> {
        (**self).fetch_readings().await
    }

    async fn fetch_trucks(&self) -> Result<Vec<Truck>> {
        (**self).fetch_trucks().await
    }

    async fn fetch_drivers(&self) -> Result<Vec<Driver>> {
        (**self).fetch_drivers().await
    }

    async fn fetch_routes(&self, day: DayFilter) -> Result<Vec<Route>> {
        (**self).fetch_routes(day).await
    }

    async fn delete_route(&self, route_id: &str) -> Result<()> {
        (**self).delete_route(route_id).await
    }
}
