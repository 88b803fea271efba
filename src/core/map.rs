use crate::{
    core::{
        config::{FitBoundsOptions, MapOptions},
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    input::{EventHandled, EventManager, Handler, InputEvent, MapEvent},
    layers::base::Overlay,
    runtime::{Scheduler, Wakeup},
};

/// Callback run once the map has its first view
pub type ReadyCallback = Box<dyn FnOnce(&Map)>;

/// One map instance: a view over a fixed-size container plus the handlers and
/// overlays attached to it.
///
/// A map starts without a view. It becomes loaded on the first [`Map::set_view`]
/// or [`Map::fit_bounds`], and is dead after [`Map::remove`]: every mutating call
/// on a removed map is ignored.
pub struct Map {
    viewport: Viewport,
    options: MapOptions,
    loaded: bool,
    removed: bool,
    event_manager: EventManager,
    handlers: Vec<Box<dyn Handler>>,
    overlays: Vec<Box<dyn Overlay>>,
    attributions: Vec<String>,
    ready_callbacks: Vec<ReadyCallback>,
}

impl Map {
    pub fn new(size: Point, options: &MapOptions) -> Self {
        let viewport = Viewport::with_limits(
            LatLng::default(),
            options.min_zoom,
            size,
            options.min_zoom,
            options.max_zoom,
        );

        Self {
            viewport,
            options: options.clone(),
            loaded: false,
            removed: false,
            event_manager: EventManager::new(),
            handlers: Vec::new(),
            overlays: Vec::new(),
            attributions: Vec::new(),
            ready_callbacks: Vec::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn center(&self) -> LatLng {
        self.viewport.center
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn size(&self) -> Point {
        self.viewport.size
    }

    pub fn min_zoom(&self) -> f64 {
        self.viewport.min_zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.viewport.max_zoom
    }

    pub fn limit_zoom(&self, zoom: f64) -> f64 {
        self.viewport.limit_zoom(zoom)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded && !self.removed
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Container position of the view center
    pub fn center_point(&self) -> Point {
        self.viewport.center_point()
    }

    pub fn project(&self, lat_lng: &LatLng, zoom: f64) -> Point {
        self.viewport.project(lat_lng, Some(zoom))
    }

    pub fn unproject(&self, point: &Point, zoom: f64) -> LatLng {
        self.viewport.unproject(point, Some(zoom))
    }

    pub fn container_point_to_lat_lng(&self, point: &Point) -> LatLng {
        self.viewport.container_point_to_lat_lng(point)
    }

    pub fn lat_lng_to_container_point(&self, lat_lng: &LatLng) -> Point {
        self.viewport.lat_lng_to_container_point(lat_lng)
    }

    /// Resets the view to `center` and `zoom` (clamped) and fires the reset notifications.
    /// A non-finite center or zoom is dropped without any notification.
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        if self.removed {
            return;
        }
        if !center.is_finite() || !zoom.is_finite() {
            log::warn!("ignoring non-finite view ({}, {}) z{}", center.lat, center.lng, zoom);
            return;
        }

        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;
        let first_view = !self.loaded;

        self.viewport.set_view(center, zoom);
        let center = self.viewport.center;
        let zoom = self.viewport.zoom;
        let zoom_changed = first_view || zoom != old_zoom;

        self.fire(MapEvent::MoveStart { center: old_center });
        if zoom_changed {
            self.fire(MapEvent::ZoomStart { zoom: old_zoom });
        }
        self.fire(MapEvent::ViewReset { center, zoom });
        if first_view {
            self.loaded = true;
            self.fire(MapEvent::Load { center, zoom });
        }
        if zoom_changed {
            self.fire(MapEvent::ZoomEnd { zoom });
        }
        self.fire(MapEvent::MoveEnd { center });

        if first_view {
            log::debug!("map loaded at ({:.6}, {:.6}) z{:.2}", center.lat, center.lng, zoom);
            self.run_ready_callbacks();
        }
    }

    /// Sets the largest whole zoom that shows `bounds`, centered on them
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, options: &FitBoundsOptions) {
        if self.removed {
            return;
        }

        let mut zoom = self.viewport.bounds_zoom(bounds, options.padding);
        if let Some(max_zoom) = options.max_zoom {
            zoom = zoom.min(max_zoom);
        }

        let sw = self.project(&bounds.south_west, zoom);
        let ne = self.project(&bounds.north_east, zoom);
        let center = self.unproject(&sw.add(&ne).divide_by(2.0), zoom);

        self.set_view(center, zoom);
    }

    /// Zooms while keeping the geographic point under `point` in place
    pub fn set_zoom_around(&mut self, point: Point, zoom: f64) {
        let zoom = self.limit_zoom(zoom);
        let anchor = self.container_point_to_lat_lng(&point);
        let offset = point.subtract(&self.center_point());
        let center = self.unproject(&self.project(&anchor, zoom).subtract(&offset), zoom);

        self.set_view(center, zoom);
    }

    /// Announces the start of a continuous move/zoom driven by [`Map::move_view`]
    pub fn move_start(&mut self) {
        if self.removed {
            return;
        }
        self.fire(MapEvent::MoveStart {
            center: self.viewport.center,
        });
        self.fire(MapEvent::ZoomStart {
            zoom: self.viewport.zoom,
        });
    }

    /// Applies one intermediate center/zoom as a single view update
    pub fn move_view(&mut self, center: LatLng, zoom: f64) {
        if self.removed || !center.is_finite() || !zoom.is_finite() {
            return;
        }

        self.viewport.set_view(center, zoom);
        self.fire(MapEvent::Move {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
        });
    }

    pub fn resize(&mut self, size: Point) {
        if self.removed || size == self.viewport.size {
            return;
        }
        self.viewport.set_size(size);
        self.fire(MapEvent::Resize { size });
    }

    /// Runs `callback` now if the map has a view, otherwise once it gets one
    pub fn when_ready(&mut self, callback: ReadyCallback) {
        if self.removed {
            return;
        }
        if self.loaded {
            callback(self);
        } else {
            self.ready_callbacks.push(callback);
        }
    }

    fn run_ready_callbacks(&mut self) {
        for callback in std::mem::take(&mut self.ready_callbacks) {
            callback(self);
        }
    }

    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.event_manager.on(event_type, callback);
    }

    pub fn off(&mut self, event_type: &str) {
        self.event_manager.off(event_type);
    }

    /// Queues a notification; delivered by [`Map::process_events`]
    pub fn fire(&mut self, event: MapEvent) {
        if self.removed {
            return;
        }
        self.event_manager.emit(event);
    }

    /// Delivers queued notifications to listeners, then to overlays
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events = self.event_manager.process_events();

        for event in &events {
            for overlay in self.overlays.iter_mut() {
                overlay.on_map_event(event, &self.viewport);
            }
        }

        events
    }

    pub fn pending_events(&self) -> usize {
        self.event_manager.pending_events()
    }

    /// Attaches an interaction handler to this instance only
    pub fn add_handler(&mut self, handler: Box<dyn Handler>) {
        if self.removed {
            return;
        }
        log::debug!("adding handler {}", handler.name());
        self.handlers.push(handler);
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.iter().any(|handler| handler.name() == name)
    }

    /// Typed access to an attached handler
    pub fn handler<T: Handler + 'static>(&self) -> Option<&T> {
        self.handlers
            .iter()
            .find_map(|handler| handler.as_any().downcast_ref::<T>())
    }

    /// Offers the event to each handler in order until one consumes it
    pub fn handle_input(
        &mut self,
        event: &InputEvent,
        scheduler: &mut dyn Scheduler,
    ) -> EventHandled {
        if self.removed {
            return EventHandled::NotHandled;
        }
        if let InputEvent::Resize { size } = event {
            self.resize(*size);
            return EventHandled::Handled;
        }

        let mut handlers = std::mem::take(&mut self.handlers);
        let mut handled = EventHandled::NotHandled;
        for handler in handlers.iter_mut() {
            if handler.handle_input(event, self, scheduler).is_handled() {
                handled = EventHandled::Handled;
                break;
            }
        }
        self.restore_handlers(handlers);

        handled
    }

    /// Routes a fired frame or timer to the handler that scheduled it
    pub fn handle_wakeup(&mut self, wakeup: Wakeup, scheduler: &mut dyn Scheduler) -> bool {
        if self.removed {
            return false;
        }

        let mut handlers = std::mem::take(&mut self.handlers);
        let consumed = handlers
            .iter_mut()
            .any(|handler| handler.handle_wakeup(wakeup, self, scheduler));
        self.restore_handlers(handlers);

        consumed
    }

    fn restore_handlers(&mut self, mut handlers: Vec<Box<dyn Handler>>) {
        // Keep anything registered while the list was taken
        handlers.append(&mut self.handlers);
        self.handlers = handlers;
    }

    pub fn add_overlay(&mut self, mut overlay: Box<dyn Overlay>) {
        if self.removed {
            return;
        }
        overlay.on_add(self);
        self.overlays.push(overlay);
    }

    pub fn remove_overlay(&mut self, id: &str) -> Option<Box<dyn Overlay>> {
        let index = self.overlays.iter().position(|overlay| overlay.id() == id)?;
        let mut overlay = self.overlays.remove(index);
        overlay.on_remove(self);
        Some(overlay)
    }

    pub fn overlay(&self, id: &str) -> Option<&dyn Overlay> {
        self.overlays
            .iter()
            .find(|overlay| overlay.id() == id)
            .map(|overlay| overlay.as_ref())
    }

    /// Typed access to an attached overlay
    pub fn overlay_as<T: Overlay + 'static>(&self, id: &str) -> Option<&T> {
        self.overlay(id)?.as_any().downcast_ref::<T>()
    }

    pub fn list_overlays(&self) -> Vec<String> {
        self.overlays.iter().map(|overlay| overlay.id().to_string()).collect()
    }

    pub fn add_attribution(&mut self, text: &str) {
        if !text.is_empty() && !self.attributions.iter().any(|existing| existing == text) {
            self.attributions.push(text.to_string());
        }
    }

    pub fn remove_attribution(&mut self, text: &str) {
        self.attributions.retain(|existing| existing != text);
    }

    pub fn attributions(&self) -> &[String] {
        &self.attributions
    }

    /// Tears the map down: handlers cancel their frames and timers, overlays are
    /// detached and the final notifications are flushed. Calling it again does nothing.
    pub fn remove(&mut self, scheduler: &mut dyn Scheduler) {
        if self.removed {
            return;
        }

        let mut handlers = std::mem::take(&mut self.handlers);
        for handler in handlers.iter_mut() {
            handler.remove_hooks(self, scheduler);
        }

        for mut overlay in std::mem::take(&mut self.overlays) {
            overlay.on_remove(self);
        }

        self.fire(MapEvent::Unload);
        self.process_events();

        self.removed = true;
        self.event_manager.clear();
        self.ready_callbacks.clear();
        log::info!("map removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::EventLoop;
    use std::{
        cell::Cell,
        rc::Rc,
        sync::{Arc, Mutex},
    };

    fn test_map() -> Map {
        Map::new(Point::new(800.0, 600.0), &MapOptions::default())
    }

    #[test]
    fn test_new_map_has_no_view() {
        let map = test_map();
        assert!(!map.is_loaded());
        assert_eq!(map.size(), Point::new(800.0, 600.0));
        assert_eq!((map.min_zoom(), map.max_zoom()), (0.0, 18.0));
    }

    #[test]
    fn test_set_view_fires_reset_sequence() {
        let mut map = test_map();
        map.set_view(LatLng::new(43.322126, 21.895462), 13.0);

        let types: Vec<_> = map.process_events().iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            ["movestart", "zoomstart", "viewreset", "load", "zoomend", "moveend"]
        );
        assert!(map.is_loaded());

        // Same zoom again: no zoom notifications, no second load
        map.set_view(LatLng::new(43.0, 21.0), 13.0);
        let types: Vec<_> = map.process_events().iter().map(|e| e.event_type()).collect();
        assert_eq!(types, ["movestart", "viewreset", "moveend"]);
    }

    #[test]
    fn test_non_finite_view_is_dropped() {
        let mut map = test_map();
        map.set_view(LatLng::new(f64::NAN, 21.0), 13.0);
        assert!(!map.is_loaded());
        assert!(map.process_events().is_empty());

        map.set_view(LatLng::new(43.3, 21.9), 13.0);
        map.process_events();
        map.set_view(LatLng::new(43.3, 21.9), f64::INFINITY);
        map.move_view(LatLng::new(43.3, f64::NAN), 14.0);
        assert!(map.process_events().is_empty());
        assert_eq!((map.center(), map.zoom()), (LatLng::new(43.3, 21.9), 13.0));
    }

    #[test]
    fn test_set_view_clamps_zoom() {
        let options = MapOptions {
            min_zoom: 3.0,
            max_zoom: 12.0,
            ..MapOptions::default()
        };
        let mut map = Map::new(Point::new(800.0, 600.0), &options);
        map.set_view(LatLng::default(), 20.0);
        assert_eq!(map.zoom(), 12.0);
        map.move_view(LatLng::default(), 1.0);
        assert_eq!(map.zoom(), 3.0);
    }

    #[test]
    fn test_fit_bounds() {
        let mut map = test_map();
        let bounds = LatLngBounds::from_coords(43.2, 21.8, 43.4, 22.0);
        map.fit_bounds(&bounds, &FitBoundsOptions::default());

        assert!(map.is_loaded());
        assert_eq!(map.zoom(), map.zoom().floor());
        let visible = map.viewport().bounds();
        assert!(visible.contains(&bounds.south_west));
        assert!(visible.contains(&bounds.north_east));

        // One level further in would no longer fit
        let mut closer = map.viewport().clone();
        closer.set_zoom(map.zoom() + 1.0);
        let closer_bounds = closer.bounds();
        let fits_closer = closer_bounds.contains(&bounds.south_west)
            && closer_bounds.contains(&bounds.north_east);
        assert!(!fits_closer);

        let capped = FitBoundsOptions {
            max_zoom: Some(5.0),
            ..FitBoundsOptions::default()
        };
        map.fit_bounds(&bounds, &capped);
        assert_eq!(map.zoom(), 5.0);
    }

    #[test]
    fn test_when_ready() {
        let mut map = test_map();
        let calls = Rc::new(Cell::new(0));

        let counter = calls.clone();
        map.when_ready(Box::new(move |_| counter.set(counter.get() + 1)));
        assert_eq!(calls.get(), 0);

        map.set_view(LatLng::default(), 4.0);
        assert_eq!(calls.get(), 1);

        // Already loaded: runs immediately
        let counter = calls.clone();
        map.when_ready(Box::new(move |map| {
            assert_eq!(map.zoom(), 4.0);
            counter.set(counter.get() + 1);
        }));
        assert_eq!(calls.get(), 2);

        map.set_view(LatLng::default(), 5.0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_listeners() {
        let mut map = test_map();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        map.on("zoomend", move |event| {
            if let MapEvent::ZoomEnd { zoom } = event {
                sink.lock().unwrap().push(*zoom);
            }
        });

        map.set_view(LatLng::default(), 2.0);
        map.set_view(LatLng::default(), 7.0);
        map.process_events();
        assert_eq!(*seen.lock().unwrap(), vec![2.0, 7.0]);
    }

    #[test]
    fn test_remove_is_idempotent_and_final() {
        let mut event_loop = EventLoop::new();
        let mut map = test_map();
        map.set_view(LatLng::new(1.0, 2.0), 6.0);
        map.process_events();

        let unloads = Arc::new(Mutex::new(0));
        let counter = unloads.clone();
        map.on("unload", move |_| *counter.lock().unwrap() += 1);

        map.remove(&mut event_loop);
        map.remove(&mut event_loop);
        assert_eq!(*unloads.lock().unwrap(), 1);
        assert!(map.is_removed());
        assert!(!map.is_loaded());

        map.set_view(LatLng::new(10.0, 10.0), 9.0);
        map.move_view(LatLng::new(10.0, 10.0), 9.0);
        assert_eq!(map.center(), LatLng::new(1.0, 2.0));
        assert_eq!(map.zoom(), 6.0);
        assert_eq!(map.pending_events(), 0);
    }

    #[test]
    fn test_resize_input() {
        let mut event_loop = EventLoop::new();
        let mut map = test_map();
        let handled = map.handle_input(
            &InputEvent::Resize {
                size: Point::new(1024.0, 768.0),
            },
            &mut event_loop,
        );
        assert!(handled.is_handled());
        assert_eq!(map.center_point(), Point::new(512.0, 384.0));
    }
}
