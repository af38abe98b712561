//! Session cache for the driver list

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use fleetmap_domain::repository::FleetSource;
use fleetmap_types::{DayFilter, Driver, Reading, Result, Route, Truck};

/// Wraps a source and fetches drivers once per session.
///
/// There is no invalidation: a driver added or reassigned on the server
/// is not seen until the process restarts. Only a successful fetch is
/// cached, so a failed first attempt is retried on the next call.
pub struct CachedDrivers<S> {
    inner: S,
    drivers: Mutex<Option<Vec<Driver>>>,
}

impl<S> CachedDrivers<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            drivers: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn cached(&self) -> Option<Vec<Driver>> {
        self.drivers.lock().ok().and_then(|d| d.clone())
    }
}

#[async_trait]
impl<S: FleetSource> FleetSource for CachedDrivers<S> {
    async fn fetch_readings(&self) -> Result<Vec<Reading>> {
        self.inner.fetch_readings().await
    }

    async fn fetch_trucks(&self) -> Result<Vec<Truck>> {
        self.inner.fetch_trucks().await
    }

    async fn fetch_drivers(&self) -> Result<Vec<Driver>> {
        if let Some(drivers) = self.cached() {
            debug!(count = drivers.len(), "drivers served from cache");
            return Ok(drivers);
        }
        let drivers = self.inner.fetch_drivers().await?;
        if let Ok(mut slot) = self.drivers.lock() {
            *slot = Some(drivers.clone());
        }
        Ok(drivers)
    }

    async fn fetch_routes(&self, day: DayFilter) -> Result<Vec<Route>> {
        self.inner.fetch_routes(day).await
    }

    async fn delete_route(&self, route_id: &str) -> Result<()> {
        self.inner.delete_route(route_id).await
    }
}
