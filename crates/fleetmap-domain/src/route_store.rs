//! Currently loaded routes, the search-filtered view, and the selection

use tracing::debug;

use crate::model::EnrichedTruck;
use fleetmap_types::{DayFilter, Route, RouteId};

/// Route colors, assigned by position in the filtered list
pub const ROUTE_COLORS: [&str; 10] = [
    "#16a34a", "#dc2626", "#d97706", "#7c3aed", "#db2777", "#0891b2", "#ea580c", "#7c2d12",
    "#1e40af", "#059669",
];

/// Color for trucks and routes with no position in the filtered list
pub const NEUTRAL_COLOR: &str = "#6b7280";

#[derive(Debug, Default)]
pub struct RouteStore {
    day: DayFilter,
    all_routes: Vec<Route>,
    filtered_routes: Vec<Route>,
    search_term: String,
    selected_route_id: Option<RouteId>,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every route with a freshly fetched day.
    ///
    /// The filter is reset and a selection whose route disappeared is
    /// cleared, never remapped.
    pub fn load_for_day(&mut self, day: DayFilter, routes: Vec<Route>) {
        debug!(%day, count = routes.len(), "routes loaded");
        self.day = day;
        self.all_routes = routes;
        self.filtered_routes = self.all_routes.clone();
        self.search_term.clear();

        let still_there = self
            .selected_route_id
            .as_ref()
            .is_some_and(|id| self.all_routes.iter().any(|r| &r.id == id));
        if !still_there {
            self.selected_route_id = None;
        }
    }

    /// Case-insensitive substring search over route name, driver name and
    /// store names. Always recomputed from the full list.
    pub fn filter(&mut self, search_term: &str) {
        let term = search_term.trim().to_lowercase();
        self.search_term = term.clone();

        if term.is_empty() {
            self.filtered_routes = self.all_routes.clone();
            return;
        }

        self.filtered_routes = self
            .all_routes
            .iter()
            .filter(|route| route_matches(route, &term))
            .cloned()
            .collect();
    }

    /// Palette color by position in the filtered list. Only valid until the
    /// next load or filter.
    pub fn color_for(&self, route_id: &str) -> &'static str {
        self.filtered_routes
            .iter()
            .position(|r| r.id == route_id)
            .map(|i| ROUTE_COLORS[i % ROUTE_COLORS.len()])
            .unwrap_or(NEUTRAL_COLOR)
    }

    /// Filtered routes paired with their colors for one render pass
    pub fn colored_routes(&self) -> Vec<(&Route, &'static str)> {
        self.filtered_routes
            .iter()
            .enumerate()
            .map(|(i, r)| (r, ROUTE_COLORS[i % ROUTE_COLORS.len()]))
            .collect()
    }

    pub fn get(&self, route_id: &str) -> Option<&Route> {
        self.all_routes.iter().find(|r| r.id == route_id)
    }

    /// First loaded route driven by `driver_id`
    pub fn route_for_driver(&self, driver_id: &str) -> Option<&Route> {
        crate::service::find_route_for_driver(driver_id, &self.all_routes)
    }

    /// Truck currently driving `route_id`, from the last reconciliation
    pub fn truck_for_route<'a>(
        &self,
        route_id: &str,
        trucks: &'a [EnrichedTruck],
    ) -> Option<&'a EnrichedTruck> {
        trucks.iter().find(|t| {
            t.assigned_route
                .as_ref()
                .is_some_and(|r| r.id == route_id)
        })
    }

    /// Select a loaded route. Unknown ids leave the selection untouched.
    pub fn select(&mut self, route_id: &str) -> bool {
        if self.get(route_id).is_none() {
            return false;
        }
        self.selected_route_id = Some(route_id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_route_id = None;
    }

    pub fn selected_route_id(&self) -> Option<&str> {
        self.selected_route_id.as_deref()
    }

    pub fn day(&self) -> DayFilter {
        self.day
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn all_routes(&self) -> &[Route] {
        &self.all_routes
    }

    pub fn filtered_routes(&self) -> &[Route] {
        &self.filtered_routes
    }
}

fn route_matches(route: &Route, term: &str) -> bool {
    let contains = |s: &str| s.to_lowercase().contains(term);

    if contains(&route.name) {
        return true;
    }
    if let Some(driver) = &route.driver {
        let name = &driver.name;
        if contains(&name.display()) || contains(&name.first_name) || contains(&name.last_name) {
            return true;
        }
    }
    route.stops.iter().any(|stop| contains(&stop.store.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmap_types::{Driver, PersonName, Store, StoreStop};

    fn route(id: &str, name: &str) -> Route {
        Route {
            id: id.to_string(),
            name: name.to_string(),
            stops: vec![],
            waypoints: vec![],
            delivery_days: vec![1],
            driver: None,
        }
    }

    fn store_stop(name: &str) -> StoreStop {
        StoreStop {
            store: Store {
                id: name.to_lowercase(),
                name: name.to_string(),
                phone: None,
                location: None,
                address: None,
            },
            sequence: 1,
        }
    }

    #[test]
    fn test_filter_by_name() {
        let mut store = RouteStore::new();
        store.load_for_day(
            DayFilter::Day(1),
            vec![route("r1", "North Loop"), route("r2", "South Loop")],
        );
        store.filter("north");
        let names: Vec<_> = store.filtered_routes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["North Loop"]);
        assert_eq!(store.all_routes().len(), 2);
    }

    #[test]
    fn test_filter_by_driver_and_store() {
        let mut by_driver = route("r1", "Route A");
        by_driver.driver = Some(Driver {
            id: "d1".to_string(),
            name: PersonName {
                first_name: "Carlos".to_string(),
                last_name: "Mendoza".to_string(),
                full_name: None,
            },
            default_truck_id: None,
        });
        let mut by_store = route("r2", "Route B");
        by_store.stops.push(store_stop("OXXO Otay"));

        let mut store = RouteStore::new();
        store.load_for_day(DayFilter::All, vec![by_driver, by_store, route("r3", "Route C")]);

        store.filter("MENDOZA");
        assert_eq!(store.filtered_routes().len(), 1);
        assert_eq!(store.filtered_routes()[0].id, "r1");

        // recomputed from all routes, not narrowed from the previous result
        store.filter("otay");
        assert_eq!(store.filtered_routes().len(), 1);
        assert_eq!(store.filtered_routes()[0].id, "r2");

        store.filter("");
        assert_eq!(store.filtered_routes().len(), 3);
    }

    #[test]
    fn test_route_for_driver_ignores_filter() {
        let mut driven = route("r2", "South Loop");
        driven.driver = Some(Driver {
            id: "d7".to_string(),
            name: PersonName {
                first_name: "Luis".to_string(),
                last_name: "Soto".to_string(),
                full_name: None,
            },
            default_truck_id: Some("t7".to_string()),
        });
        let mut store = RouteStore::new();
        store.load_for_day(DayFilter::All, vec![route("r1", "North Loop"), driven]);
        store.filter("north");

        assert_eq!(store.route_for_driver("d7").map(|r| r.id.as_str()), Some("r2"));
        assert!(store.route_for_driver("d8").is_none());
    }

    #[test]
    fn test_color_is_positional_and_stable() {
        let mut store = RouteStore::new();
        store.load_for_day(
            DayFilter::All,
            vec![route("r1", "North Loop"), route("r2", "South Loop")],
        );
        assert_eq!(store.color_for("r2"), store.color_for("r2"));
        assert_eq!(store.color_for("r1"), ROUTE_COLORS[0]);
        assert_eq!(store.color_for("r2"), ROUTE_COLORS[1]);
        assert_eq!(store.color_for("missing"), NEUTRAL_COLOR);

        store.filter("south");
        assert_eq!(store.color_for("r2"), ROUTE_COLORS[0]);
        assert_eq!(store.color_for("r1"), NEUTRAL_COLOR);
    }

    #[test]
    fn test_palette_cycles() {
        let routes: Vec<_> = (0..12).map(|i| route(&format!("r{}", i), "Loop")).collect();
        let mut store = RouteStore::new();
        store.load_for_day(DayFilter::All, routes);
        assert_eq!(store.color_for("r10"), ROUTE_COLORS[0]);
        assert_eq!(store.color_for("r11"), ROUTE_COLORS[1]);
    }

    #[test]
    fn test_reload_clears_missing_selection() {
        let mut store = RouteStore::new();
        store.load_for_day(DayFilter::Day(1), vec![route("r1", "A"), route("r2", "B")]);
        assert!(store.select("r2"));
        assert!(!store.select("nope"));
        assert_eq!(store.selected_route_id(), Some("r2"));

        store.load_for_day(DayFilter::Day(1), vec![route("r2", "B"), route("r3", "C")]);
        assert_eq!(store.selected_route_id(), Some("r2"));

        store.load_for_day(DayFilter::Day(2), vec![route("r3", "C")]);
        assert_eq!(store.selected_route_id(), None);
        assert_eq!(store.day(), DayFilter::Day(2));
    }

    #[test]
    fn test_reload_resets_filter() {
        let mut store = RouteStore::new();
        store.load_for_day(DayFilter::All, vec![route("r1", "North"), route("r2", "South")]);
        store.filter("north");
        store.load_for_day(DayFilter::All, vec![route("r1", "North"), route("r2", "South")]);
        assert_eq!(store.filtered_routes().len(), 2);
        assert_eq!(store.search_term(), "");
    }
}
