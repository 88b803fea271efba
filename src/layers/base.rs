use crate::{core::map::Map, core::viewport::Viewport, input::MapEvent};
use std::any::Any;

/// Something drawn on top of the map that follows its notifications.
///
/// Overlays are owned by the map they were added to. Rendering is outside this
/// crate; an overlay only keeps whatever derived state it needs in sync.
pub trait Overlay {
    fn id(&self) -> &str;

    /// Called once when attached; the map may or may not have a view yet
    fn on_add(&mut self, _map: &mut Map) {}

    fn on_remove(&mut self, _map: &mut Map) {}

    fn on_map_event(&mut self, event: &MapEvent, viewport: &Viewport);

    fn as_any(&self) -> &dyn Any;
}
