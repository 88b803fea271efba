//! Eased mouse-wheel zoom
//!
//! Wheel events only move a floating goal zoom; a per-frame loop then closes a
//! fixed fraction of the remaining distance each display frame while holding the
//! geographic point under the pointer in place. A gesture ends after a quiet
//! period with no wheel events.
//!
//! The loop stops on its own when something else moves the view between two
//! frames, so it never fights a pan or a programmatic `set_view`.

use crate::{
    core::{
        config::SmoothWheelZoomMode,
        constants::{
            SMOOTH_ZOOM_EASING, SMOOTH_ZOOM_QUANTUM, WHEEL_DEBOUNCE_MS, WHEEL_ZOOM_PER_PIXEL,
        },
        geo::{LatLng, Point},
        map::Map,
    },
    input::{
        events::{EventHandled, InputEvent, MapEvent},
        handler::Handler,
    },
    runtime::{FrameHandle, Scheduler, TimerHandle, Wakeup},
};
use std::{any::Any, time::Duration};

/// Which point stays fixed while zooming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomAnchor {
    /// The geographic point under the pointer when the gesture started
    Pointer,
    /// The view center when the gesture started
    Center,
}

/// State of one continuous burst of wheel events
#[derive(Debug, Clone, PartialEq)]
pub struct WheelGesture {
    /// False once the debounce fired; the animation may still be finishing
    pub is_wheeling: bool,
    pub mouse_position: Point,
    pub center_point: Point,
    pub start_lat_lng: LatLng,
    pub wheel_start_lat_lng: LatLng,
    pub start_zoom: f64,
    /// Unclamped accumulation, clamped only when it leaves the zoom range
    pub goal_zoom: f64,
    prev_center: LatLng,
    prev_zoom: f64,
    moved: bool,
}

/// Smooth wheel zoom for one map instance
#[derive(Debug)]
pub struct SmoothWheelZoom {
    anchor: ZoomAnchor,
    sensitivity: f64,
    debounce: Duration,
    gesture: Option<WheelGesture>,
    timeout: Option<TimerHandle>,
    animation_frame: Option<FrameHandle>,
}

impl SmoothWheelZoom {
    pub const NAME: &'static str = "smoothWheelZoom";

    pub fn new(anchor: ZoomAnchor, sensitivity: f64) -> Self {
        Self {
            anchor,
            sensitivity,
            debounce: Duration::from_millis(WHEEL_DEBOUNCE_MS),
            gesture: None,
            timeout: None,
            animation_frame: None,
        }
    }

    /// Builds the handler for an enabled mode, `None` when the mode is off
    pub fn from_mode(mode: SmoothWheelZoomMode, sensitivity: f64) -> Option<Self> {
        match mode {
            SmoothWheelZoomMode::Off => None,
            SmoothWheelZoomMode::Cursor => Some(Self::new(ZoomAnchor::Pointer, sensitivity)),
            SmoothWheelZoomMode::Center => Some(Self::new(ZoomAnchor::Center, sensitivity)),
        }
    }

    pub fn anchor(&self) -> ZoomAnchor {
        self.anchor
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn gesture(&self) -> Option<&WheelGesture> {
        self.gesture.as_ref()
    }

    pub fn is_wheeling(&self) -> bool {
        self.gesture.as_ref().is_some_and(|gesture| gesture.is_wheeling)
    }

    pub fn is_animating(&self) -> bool {
        self.animation_frame.is_some()
    }

    pub fn on_wheel(
        &mut self,
        delta_y: f64,
        position: Point,
        map: &mut Map,
        scheduler: &mut dyn Scheduler,
    ) -> EventHandled {
        if !map.is_loaded() || !delta_y.is_finite() || !position.is_finite() {
            return EventHandled::NotHandled;
        }

        if !self.is_wheeling() {
            self.start_gesture(position, map, scheduler);
        }

        if let Some(gesture) = self.gesture.as_mut() {
            gesture.goal_zoom -= delta_y * WHEEL_ZOOM_PER_PIXEL * self.sensitivity;
            if gesture.goal_zoom < map.min_zoom() || gesture.goal_zoom > map.max_zoom() {
                gesture.goal_zoom = map.limit_zoom(gesture.goal_zoom);
            }
            gesture.mouse_position = position;
        }

        if let Some(timeout) = self.timeout.take() {
            scheduler.clear_timeout(timeout);
        }
        self.timeout = Some(scheduler.set_timeout(self.debounce));

        EventHandled::Handled
    }

    fn start_gesture(&mut self, position: Point, map: &Map, scheduler: &mut dyn Scheduler) {
        // A tail from the previous gesture is superseded; its zoom end folds into this one
        if let Some(frame) = self.animation_frame.take() {
            scheduler.cancel_animation_frame(frame);
        }

        let center_point = map.center_point();
        let gesture = WheelGesture {
            is_wheeling: true,
            mouse_position: position,
            center_point,
            start_lat_lng: map.container_point_to_lat_lng(&center_point),
            wheel_start_lat_lng: map.container_point_to_lat_lng(&position),
            start_zoom: map.zoom(),
            goal_zoom: map.zoom(),
            prev_center: map.center(),
            prev_zoom: map.zoom(),
            moved: false,
        };
        log::debug!(
            "wheel gesture started at z{:.2}, pointer ({:.0}, {:.0})",
            gesture.start_zoom,
            position.x,
            position.y
        );

        self.gesture = Some(gesture);
        self.animation_frame = Some(scheduler.request_animation_frame());
    }

    /// One animation step
    pub fn on_animation_frame(
        &mut self,
        frame: FrameHandle,
        map: &mut Map,
        scheduler: &mut dyn Scheduler,
    ) -> bool {
        if self.animation_frame != Some(frame) {
            return false;
        }
        self.animation_frame = None;

        let anchor = self.anchor;
        let Some(gesture) = self.gesture.as_mut() else {
            return true;
        };

        if map.center() != gesture.prev_center || map.zoom() != gesture.prev_zoom {
            log::debug!("view changed outside the wheel animation, stopping");
            self.halt(map, scheduler);
            return true;
        }

        let zoom = ease_zoom(map.zoom(), gesture.goal_zoom);

        let delta = gesture.mouse_position.subtract(&gesture.center_point);
        if delta.is_zero() {
            self.halt(map, scheduler);
            return true;
        }

        let center = match anchor {
            ZoomAnchor::Center => gesture.start_lat_lng,
            ZoomAnchor::Pointer => {
                let anchored = map.project(&gesture.wheel_start_lat_lng, zoom).subtract(&delta);
                map.unproject(&anchored, zoom)
            }
        };

        if !gesture.moved {
            map.move_start();
            gesture.moved = true;
        }

        map.move_view(center, zoom);
        gesture.prev_center = map.center();
        gesture.prev_zoom = map.zoom();
        map.fire(MapEvent::ViewReset {
            center: gesture.prev_center,
            zoom: gesture.prev_zoom,
        });
        log::trace!("wheel zoom frame z{:.2} -> goal {:.4}", gesture.prev_zoom, gesture.goal_zoom);

        if !gesture.is_wheeling && gesture.prev_zoom == gesture.goal_zoom {
            self.finish(map, scheduler);
        } else {
            self.animation_frame = Some(scheduler.request_animation_frame());
        }
        true
    }

    /// Debounce expiry: the gesture is over
    pub fn on_timeout(
        &mut self,
        timeout: TimerHandle,
        map: &mut Map,
        scheduler: &mut dyn Scheduler,
    ) -> bool {
        if self.timeout != Some(timeout) {
            return false;
        }
        self.timeout = None;

        let Some(gesture) = self.gesture.as_mut() else {
            return true;
        };
        gesture.is_wheeling = false;

        let converged = map.zoom() == gesture.goal_zoom;
        if self.animation_frame.is_none() || converged {
            self.finish(map, scheduler);
        } else {
            log::trace!("wheel gesture ended, animation tail continues");
        }
        true
    }

    /// Stops animating; the gesture itself only ends when the debounce fires
    fn halt(&mut self, map: &mut Map, scheduler: &mut dyn Scheduler) {
        if !self.is_wheeling() {
            self.finish(map, scheduler);
        }
    }

    fn finish(&mut self, map: &mut Map, scheduler: &mut dyn Scheduler) {
        if let Some(frame) = self.animation_frame.take() {
            scheduler.cancel_animation_frame(frame);
        }
        if self.gesture.take().is_some() {
            log::debug!("wheel gesture finished at z{:.2}", map.zoom());
            // Lets clustering-style overlays recompute
            map.fire(MapEvent::ZoomEnd { zoom: map.zoom() });
        }
    }
}

impl Handler for SmoothWheelZoom {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handle_input(
        &mut self,
        event: &InputEvent,
        map: &mut Map,
        scheduler: &mut dyn Scheduler,
    ) -> EventHandled {
        match *event {
            InputEvent::Wheel { delta_y, position } => {
                self.on_wheel(delta_y, position, map, scheduler)
            }
            _ => EventHandled::NotHandled,
        }
    }

    fn handle_wakeup(
        &mut self,
        wakeup: Wakeup,
        map: &mut Map,
        scheduler: &mut dyn Scheduler,
    ) -> bool {
        match wakeup {
            Wakeup::Frame(frame) => self.on_animation_frame(frame, map, scheduler),
            Wakeup::Timer(timeout) => self.on_timeout(timeout, map, scheduler),
        }
    }

    fn remove_hooks(&mut self, _map: &mut Map, scheduler: &mut dyn Scheduler) {
        if let Some(timeout) = self.timeout.take() {
            scheduler.clear_timeout(timeout);
        }
        if let Some(frame) = self.animation_frame.take() {
            scheduler.cancel_animation_frame(frame);
        }
        self.gesture = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Moves `current` a fixed fraction of the way to `goal`, quantised to hundredths.
///
/// The quantisation rounds toward the goal and is capped at it, so repeated calls
/// reach `goal` exactly in a finite number of steps from either side and every step
/// strictly shrinks the remaining distance.
pub fn ease_zoom(current: f64, goal: f64) -> f64 {
    // Absorbs float noise such as 13.27 * 100 = 1327.0000000000002
    const SNAP: f64 = 1e-9;

    let remaining = goal - current;
    if remaining == 0.0 {
        return goal;
    }

    let eased = (current + remaining * SMOOTH_ZOOM_EASING) * SMOOTH_ZOOM_QUANTUM;
    let quantised = if remaining > 0.0 {
        (eased - SNAP).ceil()
    } else {
        (eased + SNAP).floor()
    } / SMOOTH_ZOOM_QUANTUM;

    let progressed = (quantised - current) * remaining > 0.0;
    let overshot = (goal - quantised) * remaining <= 0.0;
    if !progressed || overshot {
        goal
    } else {
        quantised
    }
}
