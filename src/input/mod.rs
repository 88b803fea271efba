pub mod events;
pub mod handler;
pub mod smooth_zoom;

pub use events::{client_to_container_point, EventHandled, InputEvent, MapEvent};
pub use handler::{EventCallback, EventManager, Handler, ScrollWheelZoom};
pub use smooth_zoom::{ease_zoom, SmoothWheelZoom, WheelGesture, ZoomAnchor};
