//! Popup content for truck markers

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use fleetmap_domain::model::EnrichedTruck;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckPopup {
    pub license_plate: String,
    pub driver_name: String,
    pub avatar_url: String,
    /// Used when `avatar_url` does not resolve
    pub avatar_fallback_url: String,
    pub vehicle: String,
    pub route_name: String,
    pub route_color: &'static str,
    pub status: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub door_open: bool,
    pub updated_at: DateTime<Utc>,
}

impl TruckPopup {
    pub fn new(truck: &EnrichedTruck, route_color: &'static str) -> Self {
        let driver_id = truck.driver.as_ref().map(|d| d.id.as_str());
        Self {
            license_plate: truck.truck.license_plate.clone(),
            driver_name: truck.driver_first_name().to_string(),
            avatar_url: avatar_url(driver_id),
            avatar_fallback_url: avatar_fallback_url(driver_id),
            vehicle: truck.truck.vehicle(),
            route_name: truck.route_name().to_string(),
            route_color,
            status: truck.truck.state_text().to_string(),
            temperature: truck.reading.temperature,
            humidity: truck.reading.humidity,
            door_open: truck.reading.door_open,
            updated_at: truck.reading.recorded_at,
        }
    }
}

impl fmt::Display for TruckPopup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reading = |v: Option<f64>, unit: &str| {
            v.map(|v| format!("{:.1}{}", v, unit))
                .unwrap_or_else(|| "N/A".to_string())
        };
        writeln!(f, "{} ({})", self.license_plate, self.vehicle)?;
        writeln!(f, "  Driver:  {}", self.driver_name)?;
        writeln!(f, "  Route:   {}", self.route_name)?;
        writeln!(f, "  Status:  {}", self.status)?;
        writeln!(
            f,
            "  Sensors: {} | {} | Door {}",
            reading(self.temperature, "°C"),
            reading(self.humidity, "%"),
            if self.door_open { "Open" } else { "Closed" }
        )?;
        write!(f, "  Updated: {}", self.updated_at.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Local photo for a driver, or the shared placeholder
pub fn avatar_url(driver_id: Option<&str>) -> String {
    match driver_id {
        Some(id) if !id.is_empty() => format!("photos/drivers/{}.jpg", id),
        _ => "photos/drivers/default.jpg".to_string(),
    }
}

/// Generated portrait picked deterministically from the driver id
pub fn avatar_fallback_url(driver_id: Option<&str>) -> String {
    let hash = driver_id.map(id_hash).unwrap_or(0);
    let photo = hash % 100 + 1;
    let gender = if hash % 2 == 0 { "men" } else { "women" };
    format!("https://randomuser.me/api/portraits/{}/{}.jpg", gender, photo)
}

/// 31-multiplier string hash over UTF-16 units with 32-bit wraparound,
/// absolute value. Matches the portraits the web console shows.
fn id_hash(id: &str) -> u64 {
    let mut hash: i32 = 0;
    for unit in id.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    (hash as i64).unsigned_abs()
}
