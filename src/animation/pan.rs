use super::easing::{EasingFunction, Interpolatable};
use crate::core::point::PixelPoint;
use instant::{Duration, Instant};

/// Eased pan of the camera center by a fixed pixel offset at one zoom level
#[derive(Debug, Clone, PartialEq)]
pub struct PanSession {
    /// World pixel of the center when the pan started
    start: PixelPoint,
    offset: PixelPoint,
    zoom: f64,
    duration: Duration,
    easing: EasingFunction,
    started_at: Instant,
}

/// Camera position for one pan frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanFrame {
    pub center: PixelPoint,
    pub zoom: f64,
    pub progress: f64,
    pub finished: bool,
}

impl PanSession {
    pub fn new(
        start: PixelPoint,
        offset: PixelPoint,
        zoom: f64,
        duration_secs: f64,
        ease_linearity: f64,
        started_at: Instant,
    ) -> Self {
        Self {
            start,
            offset,
            zoom,
            duration: Duration::from_secs_f64(duration_secs.max(0.0)),
            easing: EasingFunction::pan(ease_linearity),
            started_at,
        }
    }

    pub fn target(&self) -> PixelPoint {
        self.start + self.offset
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Eased progress at `now`; `None` once the duration has elapsed
    pub fn progress(&self, now: Instant) -> Option<f64> {
        let elapsed = super::elapsed_since(self.started_at, now);
        if elapsed < self.duration {
            let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
            Some(self.easing.apply(t))
        } else {
            None
        }
    }

    /// Position at `now`; the last frame lands exactly on the target
    pub fn frame(&self, now: Instant) -> PanFrame {
        let (progress, finished) = match self.progress(now) {
            Some(progress) => (progress, false),
            None => (1.0, true),
        };

        PanFrame {
            center: self.start.lerp(&self.target(), progress),
            zoom: self.zoom,
            progress,
            finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_frames_ease_out() {
        let start = Instant::now();
        let pan = PanSession::new(
            PixelPoint::new(100.0, 100.0),
            PixelPoint::new(200.0, 0.0),
            3.0,
            0.25,
            0.5,
            start,
        );

        let first = pan.frame(start);
        assert_eq!(first.center, PixelPoint::new(100.0, 100.0));
        assert!(!first.finished);

        // Halfway in time with power 2 covers three quarters of the distance
        let half = pan.frame(start + Duration::from_millis(125));
        assert!((half.center.x - 250.0).abs() < 1e-6);

        let last = pan.frame(start + Duration::from_millis(250));
        assert!(last.finished);
        assert_eq!(last.progress, 1.0);
        assert_eq!(last.center, PixelPoint::new(300.0, 100.0));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let start = Instant::now();
        let pan = PanSession::new(PixelPoint::ZERO, PixelPoint::new(5.0, 5.0), 0.0, 0.0, 0.5, start);
        assert!(pan.frame(start).finished);
    }
}
