//! Cooperative single-threaded event loop
//!
//! Stands in for the browser's `requestAnimationFrame` / `setTimeout` pair so that
//! map interactions can be driven deterministically. Nothing here runs callbacks:
//! the loop only hands back [`Wakeup`] tokens in deadline order and the owner
//! dispatches them to whoever holds the matching handle.

use crate::core::constants::FRAME_INTERVAL_MS;
use fxhash::FxHashMap;
use std::{collections::BTreeMap, time::Duration};

/// Handle to a pending animation frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Handle to a pending timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// A task that became due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    Frame(FrameHandle),
    Timer(TimerHandle),
}

/// Frame and timer scheduling as seen by map handlers
pub trait Scheduler {
    /// Current time since the loop started
    fn now(&self) -> Duration;

    fn request_animation_frame(&mut self) -> FrameHandle;

    /// Cancelling a fired or unknown handle does nothing
    fn cancel_animation_frame(&mut self, handle: FrameHandle);

    fn set_timeout(&mut self, delay: Duration) -> TimerHandle;

    /// Clearing a fired or unknown handle does nothing
    fn clear_timeout(&mut self, handle: TimerHandle);
}

/// Virtual-clock event loop.
///
/// Frames fire on the first interval boundary strictly after they were requested, so a
/// frame requested from inside a frame runs on the next one. Tasks sharing a deadline
/// fire in request order.
#[derive(Debug)]
pub struct EventLoop {
    now: Duration,
    frame_interval: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Wakeup>,
    deadlines: FxHashMap<u64, Duration>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::with_frame_interval(Duration::from_millis(FRAME_INTERVAL_MS))
    }

    /// A zero interval falls back to the default frame interval.
    pub fn with_frame_interval(frame_interval: Duration) -> Self {
        let frame_interval = if frame_interval.is_zero() {
            log::warn!("zero frame interval, using {FRAME_INTERVAL_MS} ms");
            Duration::from_millis(FRAME_INTERVAL_MS)
        } else {
            frame_interval
        };
        Self {
            now: Duration::ZERO,
            frame_interval,
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: FxHashMap::default(),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Number of tasks still waiting
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Deadline of the earliest pending task
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pops the earliest task due no later than `until` and moves the clock to its
    /// deadline. When nothing is due the clock moves to `until` instead.
    pub fn next_wakeup(&mut self, until: Duration) -> Option<Wakeup> {
        let due = self
            .queue
            .first_key_value()
            .map(|(&(deadline, _), _)| deadline <= until)
            .unwrap_or(false);

        if !due {
            self.now = self.now.max(until);
            return None;
        }

        let ((deadline, id), wakeup) = self.queue.pop_first()?;
        self.deadlines.remove(&id);
        self.now = self.now.max(deadline);
        Some(wakeup)
    }

    /// Drops every pending task
    pub fn clear(&mut self) {
        if !self.queue.is_empty() {
            log::debug!("dropping {} pending event loop tasks", self.queue.len());
        }
        self.queue.clear();
        self.deadlines.clear();
    }

    fn next_frame_boundary(&self) -> Duration {
        let interval = self.frame_interval.as_nanos();
        let ticks = self.now.as_nanos() / interval + 1;
        Duration::from_nanos((ticks * interval) as u64)
    }

    fn schedule(&mut self, deadline: Duration, wakeup: impl FnOnce(u64) -> Wakeup) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.insert((deadline, id), wakeup(id));
        self.deadlines.insert(id, deadline);
        id
    }

    fn cancel(&mut self, id: u64) {
        if let Some(deadline) = self.deadlines.remove(&id) {
            self.queue.remove(&(deadline, id));
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for EventLoop {
    fn now(&self) -> Duration {
        self.now
    }

    fn request_animation_frame(&mut self) -> FrameHandle {
        let deadline = self.next_frame_boundary();
        FrameHandle(self.schedule(deadline, |id| Wakeup::Frame(FrameHandle(id))))
    }

    fn cancel_animation_frame(&mut self, handle: FrameHandle) {
        self.cancel(handle.0);
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerHandle {
        let deadline = self.now + delay;
        TimerHandle(self.schedule(deadline, |id| Wakeup::Timer(TimerHandle(id))))
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.cancel(handle.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_zero_frame_interval_falls_back() {
        let mut event_loop = EventLoop::with_frame_interval(Duration::ZERO);
        assert_eq!(event_loop.frame_interval(), ms(FRAME_INTERVAL_MS));

        let frame = event_loop.request_animation_frame();
        assert_eq!(event_loop.next_wakeup(ms(100)), Some(Wakeup::Frame(frame)));
        assert_eq!(event_loop.now(), ms(FRAME_INTERVAL_MS));
    }

    #[test]
    fn test_frames_fire_on_next_boundary() {
        let mut event_loop = EventLoop::new();
        let frame = event_loop.request_animation_frame();

        assert_eq!(event_loop.next_wakeup(ms(15)), None);
        assert_eq!(event_loop.now(), ms(15));
        assert_eq!(event_loop.next_wakeup(ms(100)), Some(Wakeup::Frame(frame)));
        assert_eq!(event_loop.now(), ms(16));

        // Requested from inside a frame: runs on the following boundary
        let next = event_loop.request_animation_frame();
        assert_eq!(event_loop.next_deadline(), Some(ms(32)));
        assert_eq!(event_loop.next_wakeup(ms(100)), Some(Wakeup::Frame(next)));
        assert!(event_loop.is_idle());
    }

    #[test]
    fn test_timers_and_frames_interleave_by_deadline() {
        let mut event_loop = EventLoop::new();
        let timer = event_loop.set_timeout(ms(20));
        let frame = event_loop.request_animation_frame();

        assert_eq!(event_loop.next_wakeup(ms(50)), Some(Wakeup::Frame(frame)));
        assert_eq!(event_loop.next_wakeup(ms(50)), Some(Wakeup::Timer(timer)));
        assert_eq!(event_loop.now(), ms(20));
        assert_eq!(event_loop.next_wakeup(ms(50)), None);
        assert_eq!(event_loop.now(), ms(50));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut event_loop = EventLoop::new();
        let frame = event_loop.request_animation_frame();
        let timer = event_loop.set_timeout(ms(200));
        assert_eq!(event_loop.pending(), 2);

        event_loop.cancel_animation_frame(frame);
        event_loop.cancel_animation_frame(frame);
        event_loop.clear_timeout(timer);
        event_loop.clear_timeout(timer);

        assert!(event_loop.is_idle());
        assert_eq!(event_loop.next_wakeup(ms(1_000)), None);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut event_loop = EventLoop::new();
        event_loop.request_animation_frame();
        event_loop.set_timeout(ms(5));
        event_loop.clear();
        assert!(event_loop.is_idle());
    }
}
