use crate::core::constants::{FLY_EASE_POWER, MIN_EASE_LINEARITY};
use crate::core::{geo::GeoPoint, point::PixelPoint};

/// Interpolation trait for values that can be smoothly transitioned
pub trait Interpolatable {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Interpolatable for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolatable for PixelPoint {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        *self + (*other - *self) * t
    }
}

impl Interpolatable for GeoPoint {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        GeoPoint::new(self.lat.lerp(&other.lat, t), self.lng.lerp(&other.lng, t))
    }
}

/// Easing curves used by camera animations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EasingFunction {
    /// `1 - (1 - t)^power`
    EaseOut { power: f64 },
}

impl EasingFunction {
    /// Ease-out used by panning: power `1 / max(ease_linearity, 0.2)`
    pub fn pan(ease_linearity: f64) -> Self {
        EasingFunction::EaseOut {
            power: 1.0 / ease_linearity.max(MIN_EASE_LINEARITY),
        }
    }

    /// Time easing of a fly-to flight
    pub fn fly() -> Self {
        EasingFunction::EaseOut {
            power: FLY_EASE_POWER,
        }
    }

    /// Apply the easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::EaseOut { power } => 1.0 - (1.0 - t).powf(*power),
        }
    }
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::pan(crate::core::constants::DEFAULT_EASE_LINEARITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [EasingFunction::pan(0.5), EasingFunction::pan(1.0), EasingFunction::fly()] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }

    #[test]
    fn test_pan_ease_power() {
        assert_eq!(EasingFunction::pan(0.5), EasingFunction::EaseOut { power: 2.0 });
        // Linearity below the floor is clamped, capping the power at 5
        assert_eq!(EasingFunction::pan(0.01), EasingFunction::EaseOut { power: 5.0 });
        assert!((EasingFunction::pan(0.5).apply(0.5) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_lerp() {
        let a = PixelPoint::new(0.0, 10.0);
        let b = PixelPoint::new(10.0, 20.0);
        assert_eq!(a.lerp(&b, 0.5), PixelPoint::new(5.0, 15.0));
        assert_eq!(2.0_f64.lerp(&4.0, 0.25), 2.5);
    }
}
