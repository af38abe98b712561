//! Draws trucks and routes onto a [`MapBackend`]

use tracing::{debug, warn};

use fleetmap_domain::model::EnrichedTruck;
use fleetmap_domain::route_store::NEUTRAL_COLOR;
use fleetmap_domain::RouteStore;
use fleetmap_types::{GeoPoint, Route, RouteId};

use crate::backend::MapBackend;
use crate::bounds::Bounds;
use crate::layer::{DepotMarker, RouteGroup, RoutePolyline, RouteStyle, StoreMarker, TruckIcon, TruckMarker};
use crate::popup::TruckPopup;
use crate::{DEFAULT_CENTER, DEFAULT_ZOOM, HIGHLIGHT_PADDING};

const ROUTE_DASH: &str = "10, 5";

/// Owns the backend and the truck and route layer groups drawn on it.
///
/// Both layers are rebuilt from scratch on every render call.
pub struct MapRenderer<B> {
    backend: B,
    /// Drawn route groups with their extent
    drawn_routes: Vec<(RouteId, Option<Bounds>)>,
    highlighted: Option<RouteId>,
    trucks_visible: bool,
    routes_visible: bool,
}

impl<B: MapBackend> MapRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            drawn_routes: Vec::new(),
            highlighted: None,
            trucks_visible: true,
            routes_visible: true,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Replace the truck layer. Trucks without a drawable position are
    /// left out. Returns the number of markers drawn.
    pub fn render_trucks(&mut self, trucks: &[EnrichedTruck], routes: &RouteStore) -> usize {
        self.backend.clear_trucks();

        let mut drawn = 0;
        for truck in trucks {
            let Some(position) = truck.location() else {
                debug!(truck_id = truck.id(), "truck has no drawable location");
                continue;
            };
            let color = truck
                .assigned_route
                .as_ref()
                .map(|r| routes.color_for(&r.id))
                .unwrap_or(NEUTRAL_COLOR);

            self.backend.add_truck_marker(TruckMarker {
                truck_id: truck.id().to_string(),
                position,
                icon: TruckIcon::for_state(truck.truck.state),
                route_id: truck.assigned_route.as_ref().map(|r| r.id.clone()),
                popup: TruckPopup::new(truck, color),
            });
            drawn += 1;
        }

        debug!(drawn, total = trucks.len(), "trucks rendered");
        drawn
    }

    /// Replace every route group and place the depot. Returns the number of
    /// groups drawn.
    pub fn render_routes(&mut self, routes: &[(&Route, &'static str)]) -> usize {
        self.backend.clear_routes();
        self.drawn_routes.clear();
        self.highlighted = None;

        self.backend.set_depot(DepotMarker::default());

        for &(route, color) in routes {
            let group = build_route_group(route, color);
            if group.is_empty() {
                debug!(route_id = %route.id, "route has nothing to draw");
                continue;
            }
            self.drawn_routes.push((route.id.clone(), group.bounds()));
            self.backend.add_route_group(group);
        }

        debug!(drawn = self.drawn_routes.len(), total = routes.len(), "routes rendered");
        self.drawn_routes.len()
    }

    /// Emphasize one route and fit the view to it. An id with no drawn
    /// group changes nothing.
    pub fn highlight(&mut self, route_id: &str) -> bool {
        let Some(bounds) = self
            .drawn_routes
            .iter()
            .find(|(id, _)| id == route_id)
            .map(|(_, bounds)| *bounds)
        else {
            debug!(route_id, "highlight ignored, route not drawn");
            return false;
        };

        for (id, _) in &self.drawn_routes {
            self.backend.set_route_style(id, RouteStyle::BASELINE);
        }
        self.backend.set_route_style(route_id, RouteStyle::EMPHASIZED);
        self.highlighted = Some(route_id.to_string());

        if let Some(bounds) = bounds {
            self.backend.fit_bounds(bounds.pad(HIGHLIGHT_PADDING));
        }
        true
    }

    /// Drop the emphasis without moving the view
    pub fn clear_highlight(&mut self) {
        if let Some(route_id) = self.highlighted.take() {
            self.backend.set_route_style(&route_id, RouteStyle::BASELINE);
        }
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Back to the default center and zoom
    pub fn center(&mut self) {
        self.backend.set_view(DEFAULT_CENTER, DEFAULT_ZOOM);
    }

    pub fn set_trucks_visible(&mut self, visible: bool) {
        self.trucks_visible = visible;
        self.backend.set_trucks_visible(visible);
    }

    pub fn set_routes_visible(&mut self, visible: bool) {
        self.routes_visible = visible;
        self.backend.set_routes_visible(visible);
    }

    pub fn trucks_visible(&self) -> bool {
        self.trucks_visible
    }

    pub fn routes_visible(&self) -> bool {
        self.routes_visible
    }

    pub fn detach(&mut self) {
        self.drawn_routes.clear();
        self.highlighted = None;
        self.backend.detach();
    }
}

fn build_route_group(route: &Route, color: &'static str) -> RouteGroup {
    let stores = route
        .stops
        .iter()
        .filter_map(|stop| {
            let store = &stop.store;
            match store.location.and_then(GeoPoint::validated) {
                Some(position) => Some(StoreMarker {
                    store_id: store.id.clone(),
                    name: store.name.clone(),
                    position,
                    sequence: stop.sequence,
                    phone: store.phone.clone(),
                    address: store.address.clone(),
                }),
                None => {
                    warn!(route_id = %route.id, store = %store.name, "store skipped, invalid coordinates");
                    None
                }
            }
        })
        .collect();

    let points: Vec<GeoPoint> = route
        .waypoints
        .iter()
        .copied()
        .filter_map(GeoPoint::validated)
        .collect();
    let line = (points.len() >= 2).then_some(RoutePolyline {
        points,
        dash_array: ROUTE_DASH,
    });

    RouteGroup {
        route_id: route.id.clone(),
        name: route.name.clone(),
        color,
        stores,
        line,
        style: RouteStyle::BASELINE,
    }
}
