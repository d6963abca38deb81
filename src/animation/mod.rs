pub mod animator;
pub mod easing;
pub mod fly;
pub mod pan;
pub mod scheduler;

// Re-export commonly used types and functions for convenience
pub use animator::{AnimationState, AnimationStep, Animator, SessionEnd};
pub use easing::{EasingFunction, Interpolatable};
pub use fly::{FlyFrame, FlyPath};
pub use pan::{PanFrame, PanSession};
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler, WallClockScheduler};

use instant::{Duration, Instant};

/// Time since `start`, zero if the clock reads earlier than `start`
pub(crate) fn elapsed_since(start: Instant, now: Instant) -> Duration {
    if now > start {
        now.duration_since(start)
    } else {
        Duration::ZERO
    }
}
