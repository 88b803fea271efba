use crate::core::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};

/// Input events delivered to the map's handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Mouse wheel. `delta_y` is in pixels, positive when scrolling down (zoom out).
    Wheel { delta_y: f64, position: Point },
    /// Container resize
    Resize { size: Point },
}

impl InputEvent {
    pub fn wheel(delta_y: f64, position: Point) -> Self {
        InputEvent::Wheel { delta_y, position }
    }
}

/// Page (client) coordinates to container coordinates.
///
/// `origin` is the top-left of the element's bounding rect, `scale` its CSS scale
/// (rendered size over layout size) and `border` the element's left/top border
/// widths. A zero scale component is treated as 1.
pub fn client_to_container_point(
    client: Point,
    origin: Point,
    scale: Point,
    border: Point,
) -> Point {
    let unscale = |value: f64, factor: f64| if factor == 0.0 { value } else { value / factor };
    Point::new(
        unscale(client.x - origin.x, scale.x) - border.x,
        unscale(client.y - origin.y, scale.y) - border.y,
    )
}

/// Whether a handler consumed an event.
///
/// `Handled` means the host should suppress the event's default scroll behaviour
/// and stop it from propagating further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn is_handled(self) -> bool {
        self == EventHandled::Handled
    }
}

/// Notifications fired by the map for overlays and listeners
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The map got its first view
    Load { center: LatLng, zoom: f64 },
    /// The view was redrawn at a new center/zoom; fired every smooth-zoom frame
    ViewReset { center: LatLng, zoom: f64 },
    MoveStart { center: LatLng },
    ZoomStart { zoom: f64 },
    /// Center or zoom changed without a full reset
    Move { center: LatLng, zoom: f64 },
    MoveEnd { center: LatLng },
    /// A zoom interaction finished; clustering-style overlays recompute here
    ZoomEnd { zoom: f64 },
    Resize { size: Point },
    /// The map is being torn down
    Unload,
}

impl MapEvent {
    /// Listener key, matching Leaflet's event names
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::Load { .. } => "load",
            MapEvent::ViewReset { .. } => "viewreset",
            MapEvent::MoveStart { .. } => "movestart",
            MapEvent::ZoomStart { .. } => "zoomstart",
            MapEvent::Move { .. } => "move",
            MapEvent::MoveEnd { .. } => "moveend",
            MapEvent::ZoomEnd { .. } => "zoomend",
            MapEvent::Resize { .. } => "resize",
            MapEvent::Unload => "unload",
        }
    }
}
