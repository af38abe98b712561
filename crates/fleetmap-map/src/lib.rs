//! Fleet map rendering
//!
//! [`MapRenderer`] turns enriched trucks and routes into layer primitives
//! and hands them to a [`MapBackend`]. The backend is whatever draws maps;
//! [`Scene`] is the in-memory one used by the CLI and by tests.

pub mod backend;
pub mod bounds;
pub mod layer;
pub mod popup;
pub mod renderer;
pub mod scene;

pub use backend::MapBackend;
pub use bounds::Bounds;
pub use layer::{DepotMarker, RouteGroup, RoutePolyline, RouteStyle, StoreMarker, TruckIcon, TruckMarker};
pub use renderer::MapRenderer;
pub use scene::{Scene, Viewport};

use fleetmap_types::GeoPoint;

/// Default map center (Tijuana)
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    latitude: 32.5027,
    longitude: -117.0382,
};

pub const DEFAULT_ZOOM: u8 = 11;

/// Padding applied around a highlighted route before fitting the view
pub const HIGHLIGHT_PADDING: f64 = 0.1;
