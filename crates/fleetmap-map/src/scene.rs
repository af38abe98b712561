//! In-memory map backend

use serde::Serialize;
use tracing::debug;

use fleetmap_types::GeoPoint;

use crate::backend::MapBackend;
use crate::bounds::Bounds;
use crate::layer::{DepotMarker, RouteGroup, RouteStyle, TruckMarker};
use crate::{DEFAULT_CENTER, DEFAULT_ZOOM};

/// What the map is currently looking at
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Viewport {
    Center { center: GeoPoint, zoom: u8 },
    Fit { bounds: Bounds },
}

/// Records everything drawn on it. Serializes to the full scene.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    trucks: Vec<TruckMarker>,
    routes: Vec<RouteGroup>,
    depot: Option<DepotMarker>,
    trucks_visible: bool,
    routes_visible: bool,
    viewport: Viewport,
    /// Number of times the view was moved
    view_changes: usize,
    detached: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            trucks: Vec::new(),
            routes: Vec::new(),
            depot: None,
            trucks_visible: true,
            routes_visible: true,
            viewport: Viewport::Center {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            },
            view_changes: 0,
            detached: false,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trucks(&self) -> &[TruckMarker] {
        &self.trucks
    }

    pub fn truck(&self, truck_id: &str) -> Option<&TruckMarker> {
        self.trucks.iter().find(|m| m.truck_id == truck_id)
    }

    pub fn routes(&self) -> &[RouteGroup] {
        &self.routes
    }

    pub fn route(&self, route_id: &str) -> Option<&RouteGroup> {
        self.routes.iter().find(|g| g.route_id == route_id)
    }

    pub fn depot(&self) -> Option<&DepotMarker> {
        self.depot.as_ref()
    }

    pub fn trucks_visible(&self) -> bool {
        self.trucks_visible
    }

    pub fn routes_visible(&self) -> bool {
        self.routes_visible
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn view_changes(&self) -> usize {
        self.view_changes
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    fn move_view(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.view_changes += 1;
    }
}

impl MapBackend for Scene {
    fn clear_trucks(&mut self) {
        self.trucks.clear();
    }

    fn add_truck_marker(&mut self, marker: TruckMarker) {
        if self.detached {
            return;
        }
        self.trucks.push(marker);
    }

    fn set_trucks_visible(&mut self, visible: bool) {
        self.trucks_visible = visible;
    }

    fn clear_routes(&mut self) {
        self.routes.clear();
        self.depot = None;
    }

    fn add_route_group(&mut self, group: RouteGroup) {
        if self.detached {
            return;
        }
        self.routes.push(group);
    }

    fn set_route_style(&mut self, route_id: &str, style: RouteStyle) -> bool {
        match self.routes.iter_mut().find(|g| g.route_id == route_id) {
            Some(group) => {
                group.style = style;
                true
            }
            None => false,
        }
    }

    fn set_routes_visible(&mut self, visible: bool) {
        self.routes_visible = visible;
    }

    fn set_depot(&mut self, depot: DepotMarker) {
        if self.detached {
            return;
        }
        self.depot = Some(depot);
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        if self.detached {
            return;
        }
        self.move_view(Viewport::Fit { bounds });
    }

    fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        if self.detached {
            return;
        }
        self.move_view(Viewport::Center { center, zoom });
    }

    fn detach(&mut self) {
        debug!("scene detached");
        self.trucks.clear();
        self.routes.clear();
        self.depot = None;
        self.detached = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str) -> RouteGroup {
        RouteGroup {
            route_id: id.into(),
            name: id.into(),
            color: "#16a34a",
            stores: vec![],
            line: None,
            style: RouteStyle::BASELINE,
        }
    }

    #[test]
    fn test_starts_at_default_view() {
        let scene = Scene::new();
        assert_eq!(
            scene.viewport(),
            Viewport::Center {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM
            }
        );
        assert_eq!(scene.view_changes(), 0);
        assert!(scene.trucks_visible() && scene.routes_visible());
    }

    #[test]
    fn test_set_route_style() {
        let mut scene = Scene::new();
        scene.add_route_group(group("R1"));
        assert!(scene.set_route_style("R1", RouteStyle::EMPHASIZED));
        assert!(!scene.set_route_style("R9", RouteStyle::EMPHASIZED));
        assert!(scene.route("R1").unwrap().style.is_emphasized());
    }

    #[test]
    fn test_detach_drops_everything() {
        let mut scene = Scene::new();
        scene.add_route_group(group("R1"));
        scene.set_depot(DepotMarker::default());
        scene.detach();
        scene.add_route_group(group("R2"));
        scene.set_view(DEFAULT_CENTER, 5);
        assert!(scene.routes().is_empty());
        assert!(scene.depot().is_none());
        assert_eq!(scene.view_changes(), 0);
        assert!(scene.is_detached());
    }
}
