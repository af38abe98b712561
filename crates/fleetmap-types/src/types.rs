//! Fleet data types shared by every layer
//!
//! These are the normalized shapes. The backend's raw JSON is decoded into
//! them by `fleetmap-infra`; nothing here knows about wire spellings.

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TruckId = String;
pub type DriverId = String;
pub type RouteId = String;

/// Weekday names indexed 0 = Sunday, as the backend numbers delivery days
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Name of a delivery day, `None` outside 0..=6
pub fn day_name(day: u8) -> Option<&'static str> {
    DAY_NAMES.get(day as usize).copied()
}

/// Today's weekday in backend numbering (0 = Sunday), by the local clock
pub fn today_weekday() -> u8 {
    weekday_index(&Local::now())
}

/// Weekday of `at` in its own time zone, 0 = Sunday
pub fn weekday_index<Tz: TimeZone>(at: &DateTime<Tz>) -> u8 {
    at.weekday().num_days_from_sunday() as u8
}

/// A latitude/longitude pair as received. May be out of range or NaN;
/// callers that draw it must check [`GeoPoint::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite, lat in [-90, 90], lon in [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Returns the point only if it can be drawn
    pub fn validated(self) -> Option<Self> {
        self.is_valid().then_some(self)
    }
}

/// Operational state of a truck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TruckState {
    Available,
    InRoute,
    InMaintenance,
    OutOfService,
    /// A state code this build does not know. Counted in totals only.
    Unknown,
}

impl TruckState {
    /// Decode the backend's two-letter state code
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "AV" => TruckState::Available,
            "IR" => TruckState::InRoute,
            "IM" => TruckState::InMaintenance,
            "OS" => TruckState::OutOfService,
            _ => TruckState::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TruckState::Available => "AV",
            TruckState::InRoute => "IR",
            TruckState::InMaintenance => "IM",
            TruckState::OutOfService => "OS",
            TruckState::Unknown => "??",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TruckState::Available => "Available",
            TruckState::InRoute => "In Route",
            TruckState::InMaintenance => "In Maintenance",
            TruckState::OutOfService => "Out of Service",
            TruckState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TruckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    pub id: TruckId,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub state: TruckState,
    /// Server-side description of the state, when it sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_description: Option<String>,
}

impl Truck {
    pub fn state_text(&self) -> &str {
        self.state_description
            .as_deref()
            .unwrap_or_else(|| self.state.label())
    }

    pub fn vehicle(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }
}

/// One sensor report from a truck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub truck_id: TruckId,
    /// Truck snapshot the backend embeds in some reading payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truck: Option<Truck>,
    pub recorded_at: DateTime<Utc>,
    /// °C
    pub temperature: Option<f64>,
    /// %
    pub humidity: Option<f64>,
    pub door_open: bool,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl PersonName {
    /// Full name as sent, else "first last"
    pub fn display(&self) -> String {
        match self.full_name.as_deref().map(str::trim) {
            Some(full) if !full.is_empty() => full.to_string(),
            _ => format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: DriverId,
    pub name: PersonName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_truck_id: Option<TruckId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStop {
    pub store: Store,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub stops: Vec<StoreStop>,
    pub waypoints: Vec<GeoPoint>,
    /// Weekdays, 0 = Sunday
    pub delivery_days: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,
}

impl Route {
    pub fn driver_name(&self) -> String {
        self.driver
            .as_ref()
            .map(|d| d.name.display())
            .unwrap_or_else(|| "Unassigned".to_string())
    }

    pub fn runs_on(&self, day: u8) -> bool {
        self.delivery_days.contains(&day)
    }

    /// Stops ordered by sequence number
    pub fn sorted_stops(&self) -> Vec<&StoreStop> {
        let mut stops: Vec<&StoreStop> = self.stops.iter().collect();
        stops.sort_by_key(|s| s.sequence);
        stops
    }
}

/// Which routes to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "day")]
pub enum DayFilter {
    All,
    #[default]
    Today,
    Day(u8),
}

impl FromStr for DayFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "all" | "-1" => return Ok(DayFilter::All),
            "today" => return Ok(DayFilter::Today),
            _ => {}
        }
        if let Ok(day) = s.parse::<u8>() {
            if day < 7 {
                return Ok(DayFilter::Day(day));
            }
            return Err(format!("day out of range (0-6): {}", day));
        }
        DAY_NAMES
            .iter()
            .position(|name| {
                let name = name.to_lowercase();
                name == s || (s.len() >= 3 && name.starts_with(&s))
            })
            .map(|i| DayFilter::Day(i as u8))
            .ok_or_else(|| format!("unknown day: {}", s))
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => write!(f, "all"),
            DayFilter::Today => write!(f, "today"),
            DayFilter::Day(d) => write!(f, "{}", day_name(*d).unwrap_or("?")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_follows_local_offset() {
        // Monday 17:30 in Tijuana is already Tuesday in UTC
        let pdt = chrono::FixedOffset::west_opt(7 * 3600).unwrap();
        let evening = pdt.with_ymd_and_hms(2024, 5, 6, 17, 30, 0).unwrap();
        assert_eq!(weekday_index(&evening), 1);
        assert_eq!(weekday_index(&evening.with_timezone(&Utc)), 2);
    }

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(32.5027, -117.0382).is_valid());
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(90.1, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_truck_state_codes() {
        assert_eq!(TruckState::from_code("AV"), TruckState::Available);
        assert_eq!(TruckState::from_code("ir"), TruckState::InRoute);
        assert_eq!(TruckState::from_code("IM"), TruckState::InMaintenance);
        assert_eq!(TruckState::from_code("OS"), TruckState::OutOfService);
        assert_eq!(TruckState::from_code("XX"), TruckState::Unknown);
        assert_eq!(TruckState::InRoute.code(), "IR");
    }

    #[test]
    fn test_person_name_display() {
        let name = PersonName {
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            full_name: None,
        };
        assert_eq!(name.display(), "Ana Ruiz");

        let name = PersonName {
            full_name: Some("Ana María Ruiz".into()),
            ..name
        };
        assert_eq!(name.display(), "Ana María Ruiz");
    }

    #[test]
    fn test_day_filter_parse() {
        assert_eq!("all".parse::<DayFilter>().unwrap(), DayFilter::All);
        assert_eq!("today".parse::<DayFilter>().unwrap(), DayFilter::Today);
        assert_eq!("3".parse::<DayFilter>().unwrap(), DayFilter::Day(3));
        assert_eq!("Monday".parse::<DayFilter>().unwrap(), DayFilter::Day(1));
        assert_eq!("sat".parse::<DayFilter>().unwrap(), DayFilter::Day(6));
        assert!("7".parse::<DayFilter>().is_err());
        assert!("someday".parse::<DayFilter>().is_err());
    }

    #[test]
    fn test_sorted_stops() {
        let stop = |name: &str, sequence| StoreStop {
            store: Store {
                id: name.to_string(),
                name: name.to_string(),
                phone: None,
                location: None,
                address: None,
            },
            sequence,
        };
        let route = Route {
            id: "r1".into(),
            name: "North Loop".into(),
            stops: vec![stop("c", 3), stop("a", 1), stop("b", 2)],
            waypoints: vec![],
            delivery_days: vec![1, 3],
            driver: None,
        };
        let names: Vec<_> = route.sorted_stops().iter().map(|s| s.store.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(route.driver_name(), "Unassigned");
        assert!(route.runs_on(3));
        assert!(!route.runs_on(0));
    }
}
