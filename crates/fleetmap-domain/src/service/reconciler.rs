//! Reconciliation of telemetry with truck, driver and route reference data

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::model::{AssignedRoute, EnrichedTruck};
use fleetmap_types::{Driver, Reading, Route, Truck};

/// Latest reading per truck, in order of each truck's first appearance.
///
/// A reading replaces the running latest only if its timestamp is strictly
/// greater, so the first reading seen with the maximum timestamp wins.
pub fn latest_readings(readings: &[Reading]) -> Vec<&Reading> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<&Reading> = Vec::new();

    for reading in readings {
        match index.get(reading.truck_id.as_str()) {
            Some(&i) => {
                if reading.recorded_at > latest[i].recorded_at {
                    latest[i] = reading;
                }
            }
            None => {
                index.insert(reading.truck_id.as_str(), latest.len());
                latest.push(reading);
            }
        }
    }

    latest
}

/// Build one [`EnrichedTruck`] per truck that has reported at least once.
///
/// Trucks come from `trucks` first, in their order. A reading for a truck
/// missing from `trucks` still produces a record when it carries its own
/// truck snapshot; otherwise it is dropped.
pub fn reconcile(
    readings: &[Reading],
    trucks: &[Truck],
    drivers: &[Driver],
    routes: &[Route],
) -> Vec<EnrichedTruck> {
    let latest = latest_readings(readings);
    let by_truck: HashMap<&str, &Reading> =
        latest.iter().map(|r| (r.truck_id.as_str(), *r)).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut enriched = Vec::with_capacity(latest.len());

    for truck in trucks {
        if !seen.insert(truck.id.as_str()) {
            warn!(truck_id = %truck.id, "duplicate truck id in truck list, keeping first");
            continue;
        }
        if let Some(reading) = by_truck.get(truck.id.as_str()) {
            enriched.push(enrich(truck, reading, drivers, routes));
        }
    }

    for reading in &latest {
        if seen.contains(reading.truck_id.as_str()) {
            continue;
        }
        match &reading.truck {
            Some(snapshot) => {
                seen.insert(reading.truck_id.as_str());
                enriched.push(enrich(snapshot, reading, drivers, routes));
            }
            None => debug!(truck_id = %reading.truck_id, "reading for unknown truck, skipped"),
        }
    }

    enriched
}

fn enrich(truck: &Truck, reading: &Reading, drivers: &[Driver], routes: &[Route]) -> EnrichedTruck {
    let driver = find_driver_for_truck(&truck.id, drivers);
    let assigned_route = driver
        .and_then(|d| find_route_for_driver(&d.id, routes))
        .map(|r| AssignedRoute {
            id: r.id.clone(),
            name: r.name.clone(),
        });

    EnrichedTruck {
        truck: truck.clone(),
        reading: reading.clone(),
        driver: driver.cloned(),
        assigned_route,
    }
}

/// First driver whose default truck is `truck_id`
pub fn find_driver_for_truck<'a>(truck_id: &str, drivers: &'a [Driver]) -> Option<&'a Driver> {
    let mut matches = drivers
        .iter()
        .filter(|d| d.default_truck_id.as_deref() == Some(truck_id));
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        warn!(
            truck_id,
            driver_id = %first.id,
            extra,
            "several drivers default to the same truck, keeping first"
        );
    }
    Some(first)
}

/// First route driven by `driver_id`
pub fn find_route_for_driver<'a>(driver_id: &str, routes: &'a [Route]) -> Option<&'a Route> {
    routes
        .iter()
        .find(|r| r.driver.as_ref().is_some_and(|d| d.id == driver_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fleetmap_types::{GeoPoint, PersonName, TruckState};

    fn truck(id: &str) -> Truck {
        Truck {
            id: id.to_string(),
            license_plate: format!("TIJ-{}-RF", id),
            brand: "Freightliner".to_string(),
            model: "Cascadia 2022".to_string(),
            state: TruckState::InRoute,
            state_description: None,
        }
    }

    fn reading(truck_id: &str, hour: u32, minute: u32, temp: f64) -> Reading {
        Reading {
            id: None,
            truck_id: truck_id.to_string(),
            truck: None,
            recorded_at: Utc.with_ymd_and_hms(2024, 7, 15, hour, minute, 0).unwrap(),
            temperature: Some(temp),
            humidity: Some(78.0),
            door_open: false,
            location: Some(GeoPoint::new(32.5149, -117.0382)),
        }
    }

    fn driver(id: &str, truck_id: Option<&str>) -> Driver {
        Driver {
            id: id.to_string(),
            name: PersonName {
                first_name: format!("Driver{}", id),
                last_name: "Ruiz".to_string(),
                full_name: None,
            },
            default_truck_id: truck_id.map(str::to_string),
        }
    }

    fn route(id: &str, name: &str, driver_id: Option<&str>) -> Route {
        Route {
            id: id.to_string(),
            name: name.to_string(),
            stops: vec![],
            waypoints: vec![],
            delivery_days: vec![1],
            driver: driver_id.map(|d| driver(d, None)),
        }
    }

    #[test]
    fn test_latest_reading_wins() {
        let readings = vec![reading("T1", 10, 0, 2.0), reading("T1", 10, 5, 3.0)];
        let latest = latest_readings(&readings);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].temperature, Some(3.0));
    }

    #[test]
    fn test_latest_reading_out_of_order() {
        let readings = vec![
            reading("T1", 10, 5, 3.0),
            reading("T2", 9, 0, 1.0),
            reading("T1", 10, 0, 2.0),
        ];
        let latest = latest_readings(&readings);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].truck_id, "T1");
        assert_eq!(latest[0].temperature, Some(3.0));
        assert_eq!(latest[1].truck_id, "T2");
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let readings = vec![reading("T1", 10, 5, 3.0), reading("T1", 10, 5, 9.0)];
        let latest = latest_readings(&readings);
        assert_eq!(latest[0].temperature, Some(3.0));
    }

    #[test]
    fn test_selected_timestamp_is_group_max() {
        let readings = vec![
            reading("T1", 8, 0, 1.0),
            reading("T2", 11, 0, 1.0),
            reading("T1", 12, 30, 1.0),
            reading("T2", 7, 0, 1.0),
            reading("T1", 9, 45, 1.0),
        ];
        for selected in latest_readings(&readings) {
            let max = readings
                .iter()
                .filter(|r| r.truck_id == selected.truck_id)
                .map(|r| r.recorded_at)
                .max()
                .unwrap();
            assert_eq!(selected.recorded_at, max);
        }
    }

    #[test]
    fn test_truck_without_reading_is_excluded() {
        let trucks = vec![truck("T1"), truck("T2")];
        let readings = vec![reading("T1", 10, 0, 2.0)];
        let enriched = reconcile(&readings, &trucks, &[], &[]);
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].id(), "T1");
    }

    #[test]
    fn test_driver_and_route_resolution() {
        let trucks = vec![truck("T1"), truck("T2")];
        let readings = vec![reading("T1", 10, 0, 2.0), reading("T2", 10, 0, 4.0)];
        let drivers = vec![driver("D1", Some("T1")), driver("D2", Some("T2"))];
        let routes = vec![route("R1", "North Loop", Some("D1"))];

        let enriched = reconcile(&readings, &trucks, &drivers, &routes);
        let t1 = enriched.iter().find(|e| e.id() == "T1").unwrap();
        let t2 = enriched.iter().find(|e| e.id() == "T2").unwrap();

        assert_eq!(t1.driver.as_ref().unwrap().id, "D1");
        assert_eq!(t1.assigned_route.as_ref().unwrap().id, "R1");
        assert_eq!(t1.route_name(), "North Loop");
        assert_eq!(t2.driver.as_ref().unwrap().id, "D2");
        assert!(t2.assigned_route.is_none());
        assert_eq!(t2.route_name(), "No Route Assigned");
    }

    #[test]
    fn test_duplicate_default_driver_keeps_first() {
        let drivers = vec![driver("D1", Some("T1")), driver("D2", Some("T1"))];
        assert_eq!(find_driver_for_truck("T1", &drivers).unwrap().id, "D1");
        assert!(find_driver_for_truck("T9", &drivers).is_none());
    }

    #[test]
    fn test_reading_with_embedded_truck_snapshot() {
        let mut orphan = reading("T7", 10, 0, 2.0);
        orphan.truck = Some(truck("T7"));
        let dropped = reading("T8", 10, 0, 2.0);

        let enriched = reconcile(&[orphan, dropped], &[], &[], &[]);
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].truck.license_plate, "TIJ-T7-RF");
    }

    #[test]
    fn test_one_record_per_truck_and_idempotent() {
        let trucks = vec![truck("T1"), truck("T2"), truck("T3")];
        let readings = vec![
            reading("T2", 10, 0, 2.0),
            reading("T1", 10, 0, 2.0),
            reading("T2", 10, 10, 5.0),
            reading("T1", 9, 0, 1.0),
        ];
        let drivers = vec![driver("D1", Some("T1"))];
        let routes = vec![route("R1", "North Loop", Some("D1"))];

        let first = reconcile(&readings, &trucks, &drivers, &routes);
        let second = reconcile(&readings, &trucks, &drivers, &routes);

        let keyed = |v: &[EnrichedTruck]| {
            v.iter()
                .map(|e| (e.id().to_string(), e.clone()))
                .collect::<HashMap<_, _>>()
        };
        assert_eq!(first.len(), 2);
        assert_eq!(keyed(&first), keyed(&second));
    }

    #[test]
    fn test_invalid_location_hidden_from_map() {
        let mut bad = reading("T1", 10, 0, 2.0);
        bad.location = Some(GeoPoint::new(123.0, -117.0));
        let enriched = reconcile(&[bad], &[truck("T1")], &[], &[]);
        assert_eq!(enriched.len(), 1);
        assert!(enriched[0].location().is_none());
    }
}
