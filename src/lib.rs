//! # smoothmap
//!
//! A headless, Leaflet-style map core with eased mouse-wheel zoom.
//!
//! A [`MapContainer`] mounts a [`Map`] into a fixed-size element and drives it from a
//! cooperative event loop. With `smoothWheelZoom` enabled, wheel events move a goal
//! zoom and the view glides toward it one display frame at a time, keeping the point
//! under the pointer (or the view center) fixed.

pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod ui;
#[cfg(feature = "wasm")]
pub mod web;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{FitBoundsOptions, MapContainerOptions, MapOptions, SmoothWheelZoomMode},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use layers::{base::Overlay, tile::TileLayer};

pub use input::{
    events::{EventHandled, InputEvent, MapEvent},
    handler::{Handler, ScrollWheelZoom},
    smooth_zoom::{SmoothWheelZoom, ZoomAnchor},
};

pub use runtime::{EventLoop, Scheduler};

pub use ui::container::{ContainerElement, MapContainer};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
