//! Hyperbolic zoom-out / pan / zoom-in flight between two views
//!
//! Follows van Wijk & Nuij, "Smooth and efficient zooming and panning": the
//! camera travels along a curve where `w(s)` is the visible width and `u(s)` the
//! distance covered, both in pixels at the starting zoom.

use super::easing::{EasingFunction, Interpolatable};
use crate::core::constants::{FLY_LOG_FLOOR, FLY_RATIO_EPSILON, FLY_RHO, FLY_SPEED_FACTOR};
use crate::core::{geo::GeoPoint, point::PixelPoint};
use crate::projection::crs::Crs;
use instant::{Duration, Instant};

/// Camera position for one flight frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyFrame {
    pub center: GeoPoint,
    pub zoom: f64,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct FlyPath {
    crs: Crs,
    from: PixelPoint,
    to: PixelPoint,
    start_zoom: f64,
    target_center: GeoPoint,
    target_zoom: f64,
    w0: f64,
    u1: f64,
    r0: f64,
    /// Total curve length `S`
    length: f64,
    duration: Duration,
    easing: EasingFunction,
    started_at: Instant,
}

impl FlyPath {
    /// Plans a flight from `(start_center, start_zoom)` to `(target_center, target_zoom)`
    /// in a container of `size`.
    ///
    /// A `duration_secs` that is not a positive number counts as unset, and the
    /// duration then follows the path length.
    ///
    /// Returns `None` when the flight is degenerate (empty container, or a path
    /// with no usable length); the caller should then jump to the target directly.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        crs: &Crs,
        start_center: &GeoPoint,
        start_zoom: f64,
        target_center: GeoPoint,
        target_zoom: f64,
        size: PixelPoint,
        duration_secs: Option<f64>,
        started_at: Instant,
    ) -> Option<Self> {
        let from = crs.geo_to_pixel(start_center, start_zoom);
        let to = crs.geo_to_pixel(&target_center, start_zoom);

        let w0 = size.x.max(size.y);
        if !(w0 > 0.0) {
            return None;
        }
        let w1 = w0 * crs.zoom_scale(start_zoom, target_zoom);
        let distance = to.distance_to(&from);
        let u1 = if distance > 0.0 { distance } else { 1.0 };

        let r0 = curve_r(0, w0, w1, u1);
        let length = (curve_r(1, w0, w1, u1) - r0) / FLY_RHO;

        let duration_ms = match duration_secs {
            Some(secs) if secs > 0.0 && secs.is_finite() => 1000.0 * secs,
            _ => 1000.0 * length * FLY_SPEED_FACTOR,
        };
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            return None;
        }

        Some(Self {
            crs: crs.clone(),
            from,
            to,
            start_zoom,
            target_center,
            target_zoom,
            w0,
            u1,
            r0,
            length,
            duration: Duration::from_secs_f64(duration_ms / 1000.0),
            easing: EasingFunction::fly(),
            started_at,
        })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn start_zoom(&self) -> f64 {
        self.start_zoom
    }

    pub fn target(&self) -> (GeoPoint, f64) {
        (self.target_center, self.target_zoom)
    }

    /// Visible width at curve position `s`
    fn w(&self, s: f64) -> f64 {
        self.w0 * (self.r0.cosh() / (self.r0 + FLY_RHO * s).cosh())
    }

    /// Distance travelled at curve position `s`
    fn u(&self, s: f64) -> f64 {
        let rho2 = FLY_RHO * FLY_RHO;
        self.w0 * (self.r0.cosh() * (self.r0 + FLY_RHO * s).tanh() - self.r0.sinh()) / rho2
    }

    /// Camera at `now`; once the flight time is over it lands exactly on the target
    pub fn frame(&self, now: Instant) -> FlyFrame {
        let elapsed = super::elapsed_since(self.started_at, now);
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();

        if t <= 1.0 {
            let s = self.easing.apply(t) * self.length;
            let pixel = self.from.lerp(&self.to, self.u(s) / self.u1);
            FlyFrame {
                center: self.crs.pixel_to_geo(&pixel, self.start_zoom),
                zoom: self.crs.scale_zoom(self.w0 / self.w(s), self.start_zoom),
                finished: false,
            }
        } else {
            FlyFrame {
                center: self.target_center,
                zoom: self.target_zoom,
                finished: true,
            }
        }
    }
}

/// `r(i)` of the flight curve: log of the zoom-out ratio at either end.
///
/// Ratios too small for a stable log (and NaN) fall back to a fixed floor.
fn curve_r(i: u8, w0: f64, w1: f64, u1: f64) -> f64 {
    let rho2 = FLY_RHO * FLY_RHO;
    let (s1, s2) = if i == 0 { (1.0, w0) } else { (-1.0, w1) };
    let t1 = w1 * w1 - w0 * w0 + s1 * rho2 * rho2 * u1 * u1;
    let b1 = 2.0 * s2 * rho2 * u1;
    let b = t1 / b1;
    let sq = (b * b + 1.0).sqrt() - b;

    if !(sq >= FLY_RATIO_EPSILON) {
        FLY_LOG_FLOOR
    } else {
        sq.ln()
    }
}
