//! Frame scheduling port
//!
//! The map never sleeps or spawns: it asks a [`FrameScheduler`] for the next frame
//! and the host calls [`crate::Map::on_frame`] when that frame arrives.

use instant::{Duration, Instant};
use std::cell::RefCell;
use std::rc::Rc;

/// Ticket for a requested frame, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

pub trait FrameScheduler {
    /// Asks the host to call back on the next frame
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraws a request; unknown or already fired handles are ignored
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Clock animations are timed against
    fn now(&self) -> Instant;
}

#[derive(Debug)]
struct ManualState {
    start: Instant,
    elapsed: Duration,
    next_id: u64,
    pending: Vec<FrameHandle>,
}

/// Scheduler whose clock only moves when told to.
///
/// Clones share state, so a host (or a test) can keep one clone to drive time
/// while the map owns another.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ManualState {
                start: Instant::now(),
                elapsed: Duration::ZERO,
                next_id: 0,
                pending: Vec::new(),
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.state.borrow_mut().elapsed += by;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn elapsed(&self) -> Duration {
        self.state.borrow().elapsed
    }

    /// Number of frames requested and not yet fired
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending() > 0
    }

    /// Takes every pending request, as if the frame had been delivered
    pub fn fire(&self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let handle = FrameHandle(state.next_id);
        state.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.state.borrow_mut().pending.retain(|h| *h != handle);
    }

    fn now(&self) -> Instant {
        let state = self.state.borrow();
        state.start + state.elapsed
    }
}

/// Scheduler on the wall clock for hosts with their own render loop.
///
/// Requests are not queued anywhere: the host calls [`crate::Map::on_frame`]
/// once per rendered frame for as long as [`crate::Map::is_animating`] holds.
#[derive(Debug, Default)]
pub struct WallClockScheduler {
    next_id: u64,
}

impl WallClockScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameScheduler for WallClockScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        FrameHandle(self.next_id)
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) {}

    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_shares_state() {
        let driver = ManualScheduler::new();
        let mut owned = driver.clone();

        let start = owned.now();
        let handle = owned.request_frame();
        assert_eq!(driver.pending(), 1);

        driver.advance_ms(40);
        assert_eq!(owned.now() - start, Duration::from_millis(40));

        owned.cancel_frame(handle);
        assert!(!driver.has_pending());
    }

    #[test]
    fn test_fire_drains_requests() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        assert_ne!(a, b);
        assert_eq!(scheduler.fire(), vec![a, b]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_wall_clock_handles_are_unique() {
        let mut scheduler = WallClockScheduler::new();
        let a = scheduler.request_frame();
        scheduler.cancel_frame(a);
        assert_ne!(scheduler.request_frame(), a);
    }
}
