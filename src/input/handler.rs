use crate::{
    core::map::Map,
    input::events::{EventHandled, InputEvent, MapEvent},
    prelude::{HashMap, VecDeque},
    runtime::{Scheduler, Wakeup},
};
use std::any::Any;

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Queued map notifications and their listeners
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event type
    listeners: HashMap<String, Vec<EventCallback>>,
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Drops every listener for `event_type`
    pub fn off(&mut self, event_type: &str) {
        self.listeners.remove(event_type);
    }

    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Delivers all queued events to their listeners, in emission order
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.event_type()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    pub fn clear(&mut self) {
        self.event_queue.clear();
        self.listeners.clear();
    }

    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

/// An interaction attached to a single map instance.
///
/// Handlers are owned by the map they were added to and receive it mutably for the
/// duration of each call, so they never hold references to it between events.
pub trait Handler {
    fn name(&self) -> &'static str;

    fn handle_input(
        &mut self,
        event: &InputEvent,
        map: &mut Map,
        scheduler: &mut dyn Scheduler,
    ) -> EventHandled;

    /// Returns true when the wakeup belonged to this handler
    fn handle_wakeup(
        &mut self,
        _wakeup: Wakeup,
        _map: &mut Map,
        _scheduler: &mut dyn Scheduler,
    ) -> bool {
        false
    }

    /// Cancels anything the handler scheduled; called once when the map is removed
    fn remove_hooks(&mut self, _map: &mut Map, _scheduler: &mut dyn Scheduler) {}

    fn as_any(&self) -> &dyn Any;
}

/// Instant wheel zoom: every wheel event zooms one step around the pointer
#[derive(Debug, Clone)]
pub struct ScrollWheelZoom {
    pub zoom_delta: f64,
}

impl ScrollWheelZoom {
    pub const NAME: &'static str = "scrollWheelZoom";

    pub fn new(zoom_delta: f64) -> Self {
        Self { zoom_delta }
    }
}

impl Default for ScrollWheelZoom {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Handler for ScrollWheelZoom {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handle_input(
        &mut self,
        event: &InputEvent,
        map: &mut Map,
        _scheduler: &mut dyn Scheduler,
    ) -> EventHandled {
        let InputEvent::Wheel { delta_y, position } = *event else {
            return EventHandled::NotHandled;
        };
        if !map.is_loaded() || delta_y == 0.0 {
            return EventHandled::NotHandled;
        }
        if !delta_y.is_finite() || !position.is_finite() {
            return EventHandled::NotHandled;
        }

        let zoom = map.limit_zoom(map.zoom() - delta_y.signum() * self.zoom_delta);
        if zoom != map.zoom() {
            map.set_zoom_around(position, zoom);
        }
        EventHandled::Handled
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
