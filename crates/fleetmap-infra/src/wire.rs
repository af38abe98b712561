//! Backend JSON shapes and their normalization
//!
//! The API answers either with a bare array or with `{ "data": [...] }`, and
//! over time has used more than one spelling for several reading fields.
//! Everything here is lenient per record: one malformed record is logged and
//! skipped, the rest of the list survives.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use fleetmap_types::{
    Driver, Error, GeoPoint, PersonName, Reading, Result, Route, Store, StoreStop, Truck,
    TruckState,
};

/// Unwrap the list from either envelope shape
pub fn envelope_items(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(Error::DataShape(format!(
                "expected a list in \"data\", got {}",
                json_kind(&other)
            ))),
        },
        Value::Null => Ok(Vec::new()),
        other => Err(Error::DataShape(format!(
            "expected a list or {{ data: [...] }}, got {}",
            json_kind(&other)
        ))),
    }
}

/// Decode every item of an envelope, skipping the ones that do not fit
pub fn decode_list<R, T>(value: Value, what: &str) -> Result<Vec<T>>
where
    R: DeserializeOwned + TryInto<T, Error = Error>,
{
    let items = envelope_items(value)?;
    let total = items.len();
    let mut out = Vec::with_capacity(total);

    for (i, item) in items.into_iter().enumerate() {
        let decoded = serde_json::from_value::<R>(item)
            .map_err(|e| Error::DataShape(e.to_string()))
            .and_then(|raw: R| -> Result<T> { raw.try_into() });
        match decoded {
            Ok(record) => out.push(record),
            Err(e) => warn!(index = i, kind = what, error = %e, "skipping malformed record"),
        }
    }

    if out.len() < total {
        warn!(kind = what, kept = out.len(), total, "some records were skipped");
    }
    Ok(out)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A coordinate sent as a number or as a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Coord {
    Number(f64),
    Text(String),
}

impl Coord {
    /// Unparsable text becomes NaN, which later fails validation
    fn value(&self) -> f64 {
        match self {
            Coord::Number(n) => *n,
            Coord::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

fn point(latitude: Option<&Coord>, longitude: Option<&Coord>) -> Option<GeoPoint> {
    Some(GeoPoint::new(latitude?.value(), longitude?.value()))
}

#[derive(Debug, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub latitude: Option<Coord>,
    #[serde(default)]
    pub longitude: Option<Coord>,
    #[serde(default)]
    pub address: Option<String>,
}

impl RawLocation {
    fn point(&self) -> Option<GeoPoint> {
        point(self.latitude.as_ref(), self.longitude.as_ref())
    }
}

#[derive(Debug, Deserialize)]
pub struct RawState {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawIdRef {
    #[serde(alias = "Id")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTruck {
    pub id: String,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub state: Option<RawState>,
}

impl TryFrom<RawTruck> for Truck {
    type Error = Error;

    fn try_from(raw: RawTruck) -> Result<Self> {
        let license_plate = raw
            .license_plate
            .ok_or_else(|| Error::DataShape(format!("truck {} has no licensePlate", raw.id)))?;
        let (state, state_description) = match raw.state {
            Some(s) => (TruckState::from_code(&s.id), s.description.or(s.message)),
            None => (TruckState::Unknown, None),
        };
        Ok(Truck {
            id: raw.id,
            license_plate,
            brand: raw.brand.unwrap_or_default(),
            model: raw.model.unwrap_or_default(),
            state,
            state_description,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReading {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub id_truck: Option<String>,
    #[serde(default)]
    pub truck: Option<RawTruck>,
    pub date: String,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub perc_humidity: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default, alias = "door_state")]
    pub door_state: Option<bool>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default)]
    pub latitude: Option<Coord>,
    #[serde(default)]
    pub longitude: Option<Coord>,
}

impl TryFrom<RawReading> for Reading {
    type Error = Error;

    fn try_from(raw: RawReading) -> Result<Self> {
        let truck_id = raw
            .truck
            .as_ref()
            .map(|t| t.id.clone())
            .or(raw.id_truck)
            .ok_or_else(|| Error::DataShape("reading without truck reference".to_string()))?;
        let recorded_at = parse_timestamp(&raw.date)?;

        let location = raw
            .location
            .as_ref()
            .and_then(RawLocation::point)
            .or_else(|| point(raw.latitude.as_ref(), raw.longitude.as_ref()));

        // Only a full snapshot can stand in for the truck list entry.
        let truck = raw
            .truck
            .filter(|t| t.license_plate.is_some())
            .and_then(|t| Truck::try_from(t).ok());

        Ok(Reading {
            id: raw.id,
            truck_id,
            truck,
            recorded_at,
            temperature: raw.temp.or(raw.temperature),
            humidity: raw.perc_humidity.or(raw.humidity),
            door_open: raw.door_state.unwrap_or(false),
            location,
        })
    }
}

/// RFC 3339, or a zone-less ISO timestamp taken as UTC
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::DataShape(format!("unrecognized timestamp: {}", text)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawName {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDriver {
    pub id: String,
    #[serde(default)]
    pub name: Option<RawName>,
    #[serde(default, alias = "defaultTruck")]
    pub truck_default: Option<RawIdRef>,
}

impl TryFrom<RawDriver> for Driver {
    type Error = Error;

    fn try_from(raw: RawDriver) -> Result<Self> {
        let name = raw.name.unwrap_or_default();
        Ok(Driver {
            id: raw.id,
            name: PersonName {
                first_name: name.first_name.unwrap_or_default(),
                last_name: name.last_name.unwrap_or_default(),
                full_name: name.full_name,
            },
            default_truck_id: raw.truck_default.map(|t| t.id),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStore {
    #[serde(default, alias = "Id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
}

#[derive(Debug, Deserialize)]
pub struct RawStop {
    #[serde(default)]
    pub store: Option<RawStore>,
    #[serde(default)]
    pub sequence: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoute {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stores: Option<Vec<RawStop>>,
    #[serde(default)]
    pub waypoints: Option<Vec<RawLocation>>,
    #[serde(default)]
    pub deliver_days: Option<Vec<i64>>,
    #[serde(default)]
    pub driver: Option<RawDriver>,
}

impl TryFrom<RawRoute> for Route {
    type Error = Error;

    fn try_from(raw: RawRoute) -> Result<Self> {
        let mut stops = Vec::new();
        for (i, stop) in raw.stores.unwrap_or_default().into_iter().enumerate() {
            let Some(store) = stop.store else {
                warn!(route_id = %raw.id, index = i, "route stop without store, skipped");
                continue;
            };
            let Some(store_id) = store.id else {
                warn!(route_id = %raw.id, index = i, "route stop store without id, skipped");
                continue;
            };
            let location = store.location.as_ref().and_then(RawLocation::point);
            let address = store.location.and_then(|l| l.address);
            stops.push(StoreStop {
                sequence: stop.sequence.unwrap_or(i as u32 + 1),
                store: Store {
                    id: store_id,
                    name: store.name.unwrap_or_else(|| "N/A".to_string()),
                    phone: store.phone,
                    location,
                    address,
                },
            });
        }

        let waypoints = raw
            .waypoints
            .unwrap_or_default()
            .iter()
            .filter_map(RawLocation::point)
            .collect();

        let mut delivery_days: Vec<u8> = raw
            .deliver_days
            .unwrap_or_default()
            .into_iter()
            .filter_map(|d| u8::try_from(d).ok())
            .filter(|d| *d < 7)
            .collect();
        delivery_days.sort_unstable();
        delivery_days.dedup();

        Ok(Route {
            id: raw.id,
            name: raw
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unnamed Route".to_string()),
            stops,
            waypoints,
            delivery_days,
            driver: raw.driver.map(Driver::try_from).transpose()?,
        })
    }
}

/// Fold a non-2xx response body into a readable message.
///
/// JSON problem bodies contribute `title`, `detail` and `message` joined
/// with " - ", followed by field validation errors; any other body is used
/// as plain text.
pub fn describe_error_body(is_json: bool, body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if !is_json {
        return Some(body.to_string());
    }

    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return Some(body.to_string());
    };

    let text = |key: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut message = ["title", "detail", "message"]
        .iter()
        .filter_map(|k| text(k))
        .collect::<Vec<_>>()
        .join(" - ");

    if let Some(Value::Object(errors)) = map.get("errors") {
        let fields: BTreeMap<&String, String> = errors
            .iter()
            .map(|(field, messages)| (field, validation_text(messages)))
            .collect();
        if !fields.is_empty() {
            let lines: Vec<String> = fields.iter().map(|(f, m)| format!("{}: {}", f, m)).collect();
            message.push_str(&format!("\nValidation errors:\n{}", lines.join("\n")));
        }
    }

    let message = message.trim();
    if message.is_empty() {
        Some(body.to_string())
    } else {
        Some(message.to_string())
    }
}

fn validation_text(messages: &Value) -> String {
    match messages {
        Value::Array(items) => items
            .iter()
            .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
