//! Host surface for a single map
//!
//! [`MapContainer`] plays the part of the page element a map is mounted into: it
//! owns the event loop the map's handlers schedule on, applies the container
//! options once at mount time and tears everything down on unmount.

use crate::{
    core::{
        config::MapContainerOptions,
        geo::Point,
        map::{Map, ReadyCallback},
    },
    input::{EventHandled, InputEvent, MapEvent, ScrollWheelZoom, SmoothWheelZoom},
    layers::base::Overlay,
    runtime::{EventLoop, Scheduler},
    Result,
};
use std::time::Duration;

/// The element a map is mounted into
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerElement {
    pub id: Option<String>,
    pub class_name: Option<String>,
    /// Size in CSS pixels
    pub size: Point,
}

impl ContainerElement {
    pub fn new(size: Point) -> Self {
        Self {
            id: None,
            class_name: None,
            size,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Mounts a map into a container and drives its frames and timers.
///
/// Options are read once when mounting; later changes go through the map itself.
/// Notifications queued by input or wakeups are delivered on the next
/// [`MapContainer::advance`] or [`MapContainer::process_events`].
pub struct MapContainer {
    event_loop: EventLoop,
    element: Option<ContainerElement>,
    map: Option<Map>,
    children: Vec<Box<dyn Overlay>>,
    when_ready: Option<ReadyCallback>,
}

impl MapContainer {
    pub fn new() -> Self {
        Self::with_event_loop(EventLoop::new())
    }

    pub fn with_event_loop(event_loop: EventLoop) -> Self {
        Self {
            event_loop,
            element: None,
            map: None,
            children: Vec::new(),
            when_ready: None,
        }
    }

    /// Runs `callback` once the mounted map has its first view
    pub fn when_ready<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&Map) + 'static,
    {
        self.when_ready = Some(Box::new(callback));
        self
    }

    /// Adds an overlay that is attached when the map is mounted
    pub fn with_child(mut self, overlay: Box<dyn Overlay>) -> Self {
        self.add_child(overlay);
        self
    }

    /// Attaches an overlay now, or at mount time if nothing is mounted yet
    pub fn add_child(&mut self, overlay: Box<dyn Overlay>) {
        match self.map.as_mut() {
            Some(map) => map.add_overlay(overlay),
            None => self.children.push(overlay),
        }
    }

    /// Creates the map inside `element`.
    ///
    /// Mounting twice keeps the first map. Options are validated before anything is
    /// created, so a failed mount leaves the container empty.
    pub fn mount(
        &mut self,
        mut element: ContainerElement,
        options: MapContainerOptions,
    ) -> Result<()> {
        if self.map.is_some() {
            log::warn!("map container already mounted, ignoring mount");
            return Ok(());
        }
        options.validate()?;

        if element.id.is_none() {
            element.id = options.id.clone();
        }
        if element.class_name.is_none() {
            element.class_name = options.class_name.clone();
        }

        let mut map = Map::new(element.size, &options.map);

        match SmoothWheelZoom::from_mode(options.smooth_wheel_zoom, options.smooth_sensitivity) {
            Some(smooth) => {
                if !options.map.scroll_wheel_zoom {
                    log::debug!(
                        "smooth wheel zoom implies wheel zoom, ignoring scrollWheelZoom = false"
                    );
                }
                map.add_handler(Box::new(smooth));
            }
            None if options.map.scroll_wheel_zoom => {
                map.add_handler(Box::new(ScrollWheelZoom::new(options.map.zoom_delta)));
            }
            None => {}
        }

        for overlay in self.children.drain(..) {
            map.add_overlay(overlay);
        }
        if let Some(callback) = self.when_ready.take() {
            map.when_ready(callback);
        }

        match (options.center, options.zoom, options.bounds) {
            (Some(center), Some(zoom), _) => map.set_view(center, zoom),
            (_, _, Some(bounds)) => map.fit_bounds(&bounds, &options.bounds_options),
            _ => log::debug!("mounted without an initial view"),
        }
        map.process_events();

        log::info!(
            "mounted map{} ({}x{}) at z{:.2}",
            element.id.as_deref().map(|id| format!(" #{id}")).unwrap_or_default(),
            element.size.x,
            element.size.y,
            map.zoom()
        );

        self.element = Some(element);
        self.map = Some(map);
        Ok(())
    }

    /// Removes the map and drops every frame and timer it still had pending.
    /// Unmounting an empty container does nothing.
    pub fn unmount(&mut self) {
        let Some(mut map) = self.map.take() else {
            return;
        };
        map.remove(&mut self.event_loop);
        self.event_loop.clear();
        self.element = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.map.is_some()
    }

    pub fn element(&self) -> Option<&ContainerElement> {
        self.element.as_ref()
    }

    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut Map> {
        self.map.as_mut()
    }

    pub fn with_map<R>(&mut self, f: impl FnOnce(&mut Map) -> R) -> Option<R> {
        self.map.as_mut().map(f)
    }

    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }

    /// Current event loop time
    pub fn now(&self) -> Duration {
        self.event_loop.now()
    }

    /// Hands a host event to the map's handlers
    pub fn dispatch(&mut self, event: InputEvent) -> EventHandled {
        match self.map.as_mut() {
            Some(map) => map.handle_input(&event, &mut self.event_loop),
            None => EventHandled::NotHandled,
        }
    }

    /// Runs everything due within the next `dt`
    pub fn advance(&mut self, dt: Duration) -> Vec<MapEvent> {
        let until = self.event_loop.now() + dt;
        self.advance_to(until)
    }

    /// Runs every frame and timer due up to `until`, in deadline order, delivering
    /// the notifications each one produces before the next runs
    pub fn advance_to(&mut self, until: Duration) -> Vec<MapEvent> {
        let mut events = self.process_events();

        while let Some(wakeup) = self.event_loop.next_wakeup(until) {
            let Some(map) = self.map.as_mut() else {
                continue;
            };
            if !map.handle_wakeup(wakeup, &mut self.event_loop) {
                log::trace!("no handler claimed {wakeup:?}");
            }
            events.extend(map.process_events());
        }

        events
    }

    /// Advances until nothing is pending or `limit` of loop time has passed
    pub fn run_until_idle(&mut self, limit: Duration) -> Vec<MapEvent> {
        let until = self.event_loop.now() + limit;
        let mut events = self.process_events();

        while let Some(deadline) = self.event_loop.next_deadline() {
            if deadline > until {
                log::warn!("event loop still busy after {limit:?}");
                break;
            }
            events.extend(self.advance_to(deadline));
        }

        events
    }

    /// Drives the loop against the wall clock for `duration`, one tick per frame
    #[cfg(feature = "tokio-runtime")]
    pub async fn run_realtime(&mut self, duration: Duration) -> Vec<MapEvent> {
        use tokio::time::{interval, Instant, MissedTickBehavior};

        let started = Instant::now();
        let origin = self.event_loop.now();
        let mut ticker = interval(self.event_loop.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut events = Vec::new();
        loop {
            ticker.tick().await;
            let elapsed = started.elapsed().min(duration);
            events.extend(self.advance_to(origin + elapsed));
            if elapsed >= duration {
                break;
            }
        }

        events
    }

    /// Delivers queued map notifications
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.map
            .as_mut()
            .map(|map| map.process_events())
            .unwrap_or_default()
    }
}

impl Default for MapContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MapContainer {
    fn drop(&mut self) {
        self.unmount();
    }
}
