//! Layer primitives handed to a map backend

use serde::Serialize;

use crate::bounds::Bounds;
use crate::popup::TruckPopup;
use fleetmap_types::{GeoPoint, RouteId, TruckId, TruckState};

/// Marker glyph and CSS-ish class, keyed by truck state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TruckIcon {
    pub class: &'static str,
    pub glyph: &'static str,
}

impl TruckIcon {
    pub fn for_state(state: TruckState) -> Self {
        match state {
            TruckState::InRoute => TruckIcon {
                class: "in-route",
                glyph: "fa-truck-moving",
            },
            TruckState::InMaintenance => TruckIcon {
                class: "maintenance",
                glyph: "fa-truck-pickup",
            },
            TruckState::OutOfService => TruckIcon {
                class: "out-of-service",
                glyph: "fa-truck-monster",
            },
            TruckState::Available | TruckState::Unknown => TruckIcon {
                class: "available",
                glyph: "fa-truck",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckMarker {
    pub truck_id: TruckId,
    pub position: GeoPoint,
    pub icon: TruckIcon,
    /// Route a click on this marker selects
    pub route_id: Option<RouteId>,
    pub popup: TruckPopup,
}

/// Stroke settings for one route group
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStyle {
    pub store_radius: f64,
    pub store_weight: f64,
    pub line_weight: f64,
    pub line_opacity: f64,
}

impl RouteStyle {
    pub const BASELINE: RouteStyle = RouteStyle {
        store_radius: 8.0,
        store_weight: 2.0,
        line_weight: 3.0,
        line_opacity: 0.7,
    };

    pub const EMPHASIZED: RouteStyle = RouteStyle {
        store_radius: 12.0,
        store_weight: 4.0,
        line_weight: 5.0,
        line_opacity: 1.0,
    };

    pub fn is_emphasized(&self) -> bool {
        *self == Self::EMPHASIZED
    }
}

/// Circle marker for a store on a route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMarker {
    pub store_id: String,
    pub name: String,
    pub position: GeoPoint,
    pub sequence: u32,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePolyline {
    pub points: Vec<GeoPoint>,
    pub dash_array: &'static str,
}

/// Everything drawn for one route. Only built with at least one primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGroup {
    pub route_id: RouteId,
    pub name: String,
    pub color: &'static str,
    pub stores: Vec<StoreMarker>,
    pub line: Option<RoutePolyline>,
    pub style: RouteStyle,
}

impl RouteGroup {
    pub fn bounds(&self) -> Option<Bounds> {
        let stores = self.stores.iter().map(|s| &s.position);
        let line = self.line.iter().flat_map(|l| l.points.iter());
        Bounds::from_points(stores.chain(line))
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty() && self.line.is_none()
    }
}

/// The distribution center every route starts from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepotMarker {
    pub position: GeoPoint,
    pub name: &'static str,
    pub description: &'static str,
}

impl Default for DepotMarker {
    fn default() -> Self {
        DepotMarker {
            position: GeoPoint::new(32.45900929216648, -116.97966765227373),
            name: "Grupo Lala - Pacifico",
            description: "Main distribution center",
        }
    }
}
