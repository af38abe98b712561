//! REST implementation of [`FleetSource`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, info};

use crate::wire::{decode_list, describe_error_body, RawDriver, RawReading, RawRoute, RawTruck};
use fleetmap_domain::repository::FleetSource;
use fleetmap_types::{DayFilter, Driver, Error, Reading, Result, Route, Truck};

/// Fleet backend over HTTP.
///
/// Holds one pooled client; every request carries the configured timeout
/// so a hung call fails as a network error instead of stalling a tick.
#[derive(Debug, Clone)]
pub struct HttpFleetSource {
    client: Client,
    base_url: String,
}

impl HttpFleetSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the API root
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        let response = check_status(response).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| Error::DataShape(format!("{} returned invalid JSON: {}", path, e)))
    }
}

/// Relative API path for a day filter
pub fn routes_path(day: DayFilter) -> String {
    match day {
        DayFilter::All => "Route".to_string(),
        DayFilter::Today => "Route/today".to_string(),
        DayFilter::Day(d) => format!("Route/days/{}", d),
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Network(format!("request timed out: {}", e))
    } else {
        Error::Network(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    let body = response.text().await.unwrap_or_default();

    Err(Error::Http {
        status: status.as_u16(),
        message: describe_error_body(is_json, &body),
    })
}

#[async_trait]
impl FleetSource for HttpFleetSource {
    async fn fetch_readings(&self) -> Result<Vec<Reading>> {
        let value = self.get_json("Reading").await?;
        decode_list::<RawReading, _>(value, "reading")
    }

    async fn fetch_trucks(&self) -> Result<Vec<Truck>> {
        let value = self.get_json("Truck").await?;
        decode_list::<RawTruck, _>(value, "truck")
    }

    async fn fetch_drivers(&self) -> Result<Vec<Driver>> {
        let value = self.get_json("User/Drivers").await?;
        decode_list::<RawDriver, _>(value, "driver")
    }

    async fn fetch_routes(&self, day: DayFilter) -> Result<Vec<Route>> {
        let value = self.get_json(&routes_path(day)).await?;
        decode_list::<RawRoute, _>(value, "route")
    }

    async fn delete_route(&self, route_id: &str) -> Result<()> {
        let url = self.url(&format!("Route/{}", route_id));
        debug!(%url, "DELETE");
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await?;
        info!(route_id, "route deleted");
        Ok(())
    }
}
