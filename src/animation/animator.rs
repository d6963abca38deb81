use super::fly::FlyPath;
use super::pan::PanSession;
use super::scheduler::{FrameHandle, FrameScheduler};
use crate::core::geo::GeoPoint;
use crate::projection::crs::Crs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    /// An eased pan is running
    Animating,
    /// A fly-to flight is running
    Flying,
}

#[derive(Debug, Clone)]
enum Session {
    Pan(PanSession),
    Fly(FlyPath),
}

#[derive(Debug, Clone)]
struct ActiveSession {
    session: Session,
    frame: Option<FrameHandle>,
    zoom_changed: bool,
}

/// How a session ended: finished, stopped or replaced by a newer one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnd {
    pub zoom_changed: bool,
}

/// Result of processing one animation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationStep {
    /// Camera moved, more frames follow
    Frame { center: GeoPoint, zoom: f64 },
    /// Last frame: the camera is on the target and the session is over
    Finished {
        center: GeoPoint,
        zoom: f64,
        end: SessionEnd,
    },
}

/// Camera animation state machine.
///
/// At most one session runs at a time. Starting a new one cancels the old one and
/// hands back its [`SessionEnd`] so the caller can announce it exactly once.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    active: Option<ActiveSession>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AnimationState {
        match &self.active {
            None => AnimationState::Idle,
            Some(ActiveSession {
                session: Session::Pan(_),
                ..
            }) => AnimationState::Animating,
            Some(ActiveSession {
                session: Session::Fly(_),
                ..
            }) => AnimationState::Flying,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn start_pan(
        &mut self,
        pan: PanSession,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<SessionEnd> {
        log::debug!("Starting pan animation towards {:?}", pan.target());
        self.start(Session::Pan(pan), false, scheduler)
    }

    pub fn start_fly(
        &mut self,
        path: FlyPath,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<SessionEnd> {
        let (center, zoom) = path.target();
        log::debug!(
            "Starting flight to {} at zoom {} ({:?})",
            center,
            zoom,
            path.duration()
        );
        let zoom_changed = path.start_zoom() != zoom;
        self.start(Session::Fly(path), zoom_changed, scheduler)
    }

    fn start(
        &mut self,
        session: Session,
        zoom_changed: bool,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<SessionEnd> {
        let superseded = self.stop(scheduler);
        self.active = Some(ActiveSession {
            session,
            frame: Some(scheduler.request_frame()),
            zoom_changed,
        });
        superseded
    }

    /// Cancels the running session, leaving the camera where the last frame put it
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) -> Option<SessionEnd> {
        let active = self.active.take()?;
        if let Some(handle) = active.frame {
            scheduler.cancel_frame(handle);
        }
        log::debug!("Animation stopped");
        Some(SessionEnd {
            zoom_changed: active.zoom_changed,
        })
    }

    /// Advances the running session to the scheduler's current time
    pub fn tick(
        &mut self,
        crs: &Crs,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<AnimationStep> {
        let now = scheduler.now();
        let active = self.active.as_mut()?;
        active.frame = None;

        let (center, zoom, finished) = match &active.session {
            Session::Pan(pan) => {
                let frame = pan.frame(now);
                (
                    crs.pixel_to_geo(&frame.center, frame.zoom),
                    frame.zoom,
                    frame.finished,
                )
            }
            Session::Fly(path) => {
                let frame = path.frame(now);
                (frame.center, frame.zoom, frame.finished)
            }
        };

        if finished {
            let end = SessionEnd {
                zoom_changed: active.zoom_changed,
            };
            self.active = None;
            log::debug!("Animation finished at {} zoom {}", center, zoom);
            return Some(AnimationStep::Finished { center, zoom, end });
        }

        log::trace!("Animation frame: {} zoom {}", center, zoom);
        active.frame = Some(scheduler.request_frame());
        Some(AnimationStep::Frame { center, zoom })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::scheduler::ManualScheduler;
    use crate::core::point::PixelPoint;
    use crate::projection::crs::EPSG3857;

    fn pan(scheduler: &ManualScheduler) -> PanSession {
        PanSession::new(
            PixelPoint::new(256.0, 256.0),
            PixelPoint::new(64.0, 0.0),
            1.0,
            0.25,
            0.5,
            scheduler.now(),
        )
    }

    #[test]
    fn test_pan_runs_to_completion() {
        let driver = ManualScheduler::new();
        let mut scheduler = driver.clone();
        let mut animator = Animator::new();

        assert_eq!(animator.state(), AnimationState::Idle);
        assert!(animator.start_pan(pan(&driver), &mut scheduler).is_none());
        assert_eq!(animator.state(), AnimationState::Animating);
        assert_eq!(driver.fire().len(), 1);

        driver.advance_ms(100);
        let step = animator.tick(&EPSG3857, &mut scheduler);
        assert!(matches!(step, Some(AnimationStep::Frame { .. })));
        assert_eq!(driver.pending(), 1);
        driver.fire();

        driver.advance_ms(200);
        match animator.tick(&EPSG3857, &mut scheduler) {
            Some(AnimationStep::Finished { center, zoom, end }) => {
                let expected = EPSG3857.pixel_to_geo(&PixelPoint::new(320.0, 256.0), 1.0);
                assert!(center.equals(&expected, 1e-9));
                assert_eq!(zoom, 1.0);
                assert!(!end.zoom_changed);
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(animator.state(), AnimationState::Idle);
        assert!(!driver.has_pending());
        assert!(animator.tick(&EPSG3857, &mut scheduler).is_none());
    }

    #[test]
    fn test_new_session_supersedes_old_one() {
        let driver = ManualScheduler::new();
        let mut scheduler = driver.clone();
        let mut animator = Animator::new();

        animator.start_pan(pan(&driver), &mut scheduler);
        let superseded = animator.start_pan(pan(&driver), &mut scheduler);
        assert_eq!(superseded, Some(SessionEnd { zoom_changed: false }));
        // The first session's frame was withdrawn
        assert_eq!(driver.pending(), 1);
    }

    #[test]
    fn test_stop_ends_once() {
        let driver = ManualScheduler::new();
        let mut scheduler = driver.clone();
        let mut animator = Animator::new();

        let here = GeoPoint::new(10.0, 10.0);
        let path = FlyPath::new(
            &EPSG3857,
            &here,
            4.0,
            GeoPoint::new(20.0, 20.0),
            6.0,
            PixelPoint::new(400.0, 300.0),
            None,
            driver.now(),
        )
        .unwrap();
        animator.start_fly(path, &mut scheduler);
        assert_eq!(animator.state(), AnimationState::Flying);

        assert_eq!(
            animator.stop(&mut scheduler),
            Some(SessionEnd { zoom_changed: true })
        );
        assert_eq!(animator.stop(&mut scheduler), None);
        assert!(!driver.has_pending());
    }
}
