//! Primitive operations a map surface must support

use fleetmap_types::GeoPoint;

use crate::bounds::Bounds;
use crate::layer::{DepotMarker, RouteGroup, RouteStyle, TruckMarker};

/// The library-agnostic primitive set the renderer draws through.
///
/// Trucks and routes live in two independent layer groups; clearing or
/// hiding one never touches the other.
pub trait MapBackend: Send {
    /// Remove every truck marker
    fn clear_trucks(&mut self);

    fn add_truck_marker(&mut self, marker: TruckMarker);

    fn set_trucks_visible(&mut self, visible: bool);

    /// Remove every route group and the depot marker
    fn clear_routes(&mut self);

    fn add_route_group(&mut self, group: RouteGroup);

    /// Restyle an existing group; returns false if no such group is drawn
    fn set_route_style(&mut self, route_id: &str, style: RouteStyle) -> bool;

    fn set_routes_visible(&mut self, visible: bool);

    fn set_depot(&mut self, depot: DepotMarker);

    fn fit_bounds(&mut self, bounds: Bounds);

    fn set_view(&mut self, center: GeoPoint, zoom: u8);

    /// Release the surface. Later calls are ignored by implementations
    /// that cannot draw after detaching.
    fn detach(&mut self);
}
