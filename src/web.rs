//! Browser wheel-event adapter
//!
//! Converts DOM wheel events into [`InputEvent`]s for a [`MapContainer`] and keeps
//! the page from scrolling when the map consumed the event.

use crate::{
    core::{
        constants::{WHEEL_LINE_HEIGHT, WHEEL_PAGE_HEIGHT},
        geo::Point,
    },
    input::{client_to_container_point, EventHandled, InputEvent},
    ui::container::MapContainer,
};
use web_sys::{HtmlElement, WheelEvent};

/// Vertical wheel delta in pixels, whatever unit the browser reported
pub fn wheel_delta_pixels(event: &WheelEvent) -> f64 {
    let delta_y = event.delta_y();
    match event.delta_mode() {
        WheelEvent::DOM_DELTA_LINE => delta_y * WHEEL_LINE_HEIGHT,
        WheelEvent::DOM_DELTA_PAGE => delta_y * WHEEL_PAGE_HEIGHT,
        _ => delta_y,
    }
}

/// Wheel event positioned relative to the map's container element.
///
/// Works from client coordinates, so the position is right even when the event
/// target is a child of the container (a tile or marker).
pub fn wheel_event_to_input(element: &HtmlElement, event: &WheelEvent) -> InputEvent {
    let rect = element.get_bounding_client_rect();
    let layout_width = element.offset_width() as f64;
    let layout_height = element.offset_height() as f64;
    let scale = Point::new(
        if layout_width > 0.0 { rect.width() / layout_width } else { 1.0 },
        if layout_height > 0.0 { rect.height() / layout_height } else { 1.0 },
    );

    let position = client_to_container_point(
        Point::new(event.client_x() as f64, event.client_y() as f64),
        Point::new(rect.left(), rect.top()),
        scale,
        Point::new(element.client_left() as f64, element.client_top() as f64),
    );
    InputEvent::wheel(wheel_delta_pixels(event), position)
}

/// Dispatches a DOM wheel event; handled events neither scroll the page nor bubble
pub fn dispatch_wheel(
    container: &mut MapContainer,
    element: &HtmlElement,
    event: &WheelEvent,
) -> EventHandled {
    let handled = container.dispatch(wheel_event_to_input(element, event));
    if handled.is_handled() {
        event.prevent_default();
        event.stop_propagation();
    }
    handled
}
