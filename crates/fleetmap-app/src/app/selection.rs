//! Truck and route selection

use serde::Serialize;
use tracing::debug;

use fleetmap_domain::model::EnrichedTruck;
use fleetmap_domain::RouteStore;
use fleetmap_map::{MapBackend, MapRenderer};
use fleetmap_types::{day_name, Route, RouteId, TruckId};

/// One stop as listed in a route detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDetail {
    pub sequence: u32,
    pub store_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Everything the route detail view shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDetail {
    pub id: RouteId,
    pub name: String,
    pub driver_name: String,
    pub delivery_days: Vec<&'static str>,
    pub stops: Vec<StopDetail>,
    pub color: &'static str,
}

impl RouteDetail {
    pub fn new(route: &Route, color: &'static str) -> Self {
        Self {
            id: route.id.clone(),
            name: route.name.clone(),
            driver_name: route.driver_name(),
            delivery_days: route.delivery_days.iter().filter_map(|d| day_name(*d)).collect(),
            stops: route
                .sorted_stops()
                .into_iter()
                .map(|stop| StopDetail {
                    sequence: stop.sequence,
                    store_name: stop.store.name.clone(),
                    phone: stop.store.phone.clone(),
                    address: stop.store.address.clone(),
                })
                .collect(),
            color,
        }
    }

    pub fn days_text(&self) -> String {
        if self.delivery_days.is_empty() {
            "Not assigned".to_string()
        } else {
            self.delivery_days.join(", ")
        }
    }
}

/// Which truck is selected. The selected route lives in the [`RouteStore`]
/// and is only changed through here.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected_truck_id: Option<TruckId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a truck and, through its assigned route, highlight that
    /// route. Returns the route id when there was one. A truck without a
    /// loaded route leaves no route selected.
    pub fn select_truck<B: MapBackend>(
        &mut self,
        truck_id: &str,
        trucks: &[EnrichedTruck],
        routes: &mut RouteStore,
        renderer: &mut MapRenderer<B>,
    ) -> Option<RouteId> {
        let truck = trucks.iter().find(|t| t.id() == truck_id)?;
        self.selected_truck_id = Some(truck.id().to_string());

        match truck.assigned_route.as_ref().map(|r| r.id.clone()) {
            Some(route_id) if routes.select(&route_id) => {
                renderer.highlight(&route_id);
                Some(route_id)
            }
            assigned => {
                if let Some(route_id) = assigned {
                    debug!(truck_id, %route_id, "assigned route not loaded");
                }
                routes.clear_selection();
                renderer.clear_highlight();
                None
            }
        }
    }

    /// Select and highlight a loaded route, along with the truck driving
    /// it. `None` for unknown ids.
    pub fn select_route<B: MapBackend>(
        &mut self,
        route_id: &str,
        trucks: &[EnrichedTruck],
        routes: &mut RouteStore,
        renderer: &mut MapRenderer<B>,
    ) -> Option<RouteDetail> {
        if !routes.select(route_id) {
            debug!(route_id, "select ignored, route not loaded");
            return None;
        }
        renderer.highlight(route_id);
        self.selected_truck_id = routes
            .truck_for_route(route_id, trucks)
            .map(|t| t.id().to_string());

        let color = routes.color_for(route_id);
        routes.get(route_id).map(|route| RouteDetail::new(route, color))
    }

    pub fn clear(&mut self, routes: &mut RouteStore) {
        self.selected_truck_id = None;
        routes.clear_selection();
    }

    /// Truck markers were rebuilt; the truck selection does not carry over
    pub fn clear_truck(&mut self) {
        self.selected_truck_id = None;
    }

    pub fn selected_truck_id(&self) -> Option<&str> {
        self.selected_truck_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fleetmap_domain::model::AssignedRoute;
    use fleetmap_map::Scene;
    use fleetmap_types::{
        DayFilter, Driver, GeoPoint, PersonName, Reading, Store, StoreStop, Truck, TruckState,
    };

    fn stop(name: &str, sequence: u32) -> StoreStop {
        StoreStop {
            store: Store {
                id: name.to_lowercase(),
                name: name.into(),
                phone: Some("664-000-0000".into()),
                location: Some(GeoPoint::new(32.5, -117.0)),
                address: None,
            },
            sequence,
        }
    }

    fn north_loop() -> Route {
        Route {
            id: "R1".into(),
            name: "North Loop".into(),
            stops: vec![stop("Oxxo Centro", 2), stop("Calimax", 1)],
            waypoints: vec![],
            delivery_days: vec![1, 3],
            driver: Some(Driver {
                id: "D1".into(),
                name: PersonName {
                    first_name: "Ana".into(),
                    last_name: "Lopez".into(),
                    full_name: None,
                },
                default_truck_id: Some("T1".into()),
            }),
        }
    }

    fn truck(route: Option<&str>) -> EnrichedTruck {
        EnrichedTruck {
            truck: Truck {
                id: "T1".into(),
                license_plate: "BC-1234".into(),
                brand: "Isuzu".into(),
                model: "ELF".into(),
                state: TruckState::InRoute,
                state_description: None,
            },
            reading: Reading {
                id: None,
                truck_id: "T1".into(),
                truck: None,
                recorded_at: Utc::now(),
                temperature: None,
                humidity: None,
                door_open: false,
                location: Some(GeoPoint::new(32.5, -117.0)),
            },
            driver: None,
            assigned_route: route.map(|id| AssignedRoute {
                id: id.into(),
                name: "North Loop".into(),
            }),
        }
    }

    fn setup() -> (RouteStore, MapRenderer<Scene>) {
        let mut routes = RouteStore::new();
        routes.load_for_day(DayFilter::Day(1), vec![north_loop()]);
        let mut renderer = MapRenderer::new(Scene::new());
        renderer.render_routes(&routes.colored_routes());
        (routes, renderer)
    }

    #[test]
    fn test_route_detail() {
        let detail = RouteDetail::new(&north_loop(), "#16a34a");
        assert_eq!(detail.driver_name, "Ana Lopez");
        assert_eq!(detail.days_text(), "Monday, Wednesday");
        assert_eq!(detail.stops[0].store_name, "Calimax");
        assert_eq!(detail.stops[1].sequence, 2);

        let mut unassigned = north_loop();
        unassigned.driver = None;
        unassigned.delivery_days.clear();
        let detail = RouteDetail::new(&unassigned, "#16a34a");
        assert_eq!(detail.driver_name, "Unassigned");
        assert_eq!(detail.days_text(), "Not assigned");
    }

    #[test]
    fn test_select_truck_highlights_assigned_route() {
        let (mut routes, mut renderer) = setup();
        let mut selection = SelectionController::new();

        let picked = selection.select_truck("T1", &[truck(Some("R1"))], &mut routes, &mut renderer);
        assert_eq!(picked.as_deref(), Some("R1"));
        assert_eq!(routes.selected_route_id(), Some("R1"));
        assert!(renderer.backend().route("R1").unwrap().style.is_emphasized());
        assert_eq!(selection.selected_truck_id(), Some("T1"));
    }

    #[test]
    fn test_select_unassigned_truck() {
        let (mut routes, mut renderer) = setup();
        let mut selection = SelectionController::new();

        assert!(selection
            .select_truck("T1", &[truck(None)], &mut routes, &mut renderer)
            .is_none());
        assert_eq!(selection.selected_truck_id(), Some("T1"));
        assert!(routes.selected_route_id().is_none());
        assert_eq!(renderer.backend().view_changes(), 0);
    }

    #[test]
    fn test_select_route_and_clear() {
        let (mut routes, mut renderer) = setup();
        let mut selection = SelectionController::new();
        let trucks = [truck(Some("R1"))];

        let detail = selection
            .select_route("R1", &trucks, &mut routes, &mut renderer)
            .unwrap();
        assert_eq!(detail.name, "North Loop");
        assert_eq!(detail.color, "#16a34a");
        assert_eq!(selection.selected_truck_id(), Some("T1"));
        assert!(selection
            .select_route("R404", &trucks, &mut routes, &mut renderer)
            .is_none());
        assert_eq!(routes.selected_route_id(), Some("R1"));

        selection.clear(&mut routes);
        assert!(routes.selected_route_id().is_none());
        assert!(selection.selected_truck_id().is_none());
    }

    #[test]
    fn test_select_route_without_truck() {
        let (mut routes, mut renderer) = setup();
        let mut selection = SelectionController::new();

        selection.select_truck("T1", &[truck(Some("R1"))], &mut routes, &mut renderer);
        selection.select_route("R1", &[], &mut routes, &mut renderer).unwrap();
        assert!(selection.selected_truck_id().is_none());
    }

    #[test]
    fn test_truck_with_unloaded_route_drops_route_selection() {
        let (mut routes, mut renderer) = setup();
        let mut selection = SelectionController::new();
        selection.select_route("R1", &[], &mut routes, &mut renderer).unwrap();

        let mut elsewhere = truck(Some("R9"));
        elsewhere.truck.id = "T2".into();
        assert!(selection
            .select_truck("T2", &[elsewhere], &mut routes, &mut renderer)
            .is_none());
        assert_eq!(selection.selected_truck_id(), Some("T2"));
        assert!(routes.selected_route_id().is_none());
        assert!(renderer.highlighted().is_none());
        assert!(!renderer.backend().route("R1").unwrap().style.is_emphasized());
    }
}
