use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const ZERO: PixelPoint = PixelPoint { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Creates a point with both coordinates rounded to the nearest integer
    pub fn rounded(x: f64, y: f64) -> Self {
        Self::new(round_half_up(x), round_half_up(y))
    }

    /// Component-wise multiplication
    pub fn scale_by(&self, other: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.x * other.x, self.y * other.y)
    }

    /// Component-wise division
    pub fn unscale_by(&self, other: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.x / other.x, self.y / other.y)
    }

    /// Rounds halves towards positive infinity, matching browser pixel snapping.
    pub fn round(&self) -> PixelPoint {
        PixelPoint::rounded(self.x, self.y)
    }

    pub fn floor(&self) -> PixelPoint {
        PixelPoint::new(self.x.floor(), self.y.floor())
    }

    pub fn ceil(&self) -> PixelPoint {
        PixelPoint::new(self.x.ceil(), self.y.ceil())
    }

    pub fn trunc(&self) -> PixelPoint {
        PixelPoint::new(self.x.trunc(), self.y.trunc())
    }

    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        self.sq_distance_to(other).sqrt()
    }

    pub fn sq_distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// True when `other` fits inside the box spanned by this point (absolute values).
    pub fn contains(&self, other: &PixelPoint) -> bool {
        other.x.abs() <= self.x.abs() && other.y.abs() <= self.y.abs()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

pub(crate) fn round_half_up(v: f64) -> f64 {
    let floor = v.floor();
    if v - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

impl Add for PixelPoint {
    type Output = PixelPoint;

    fn add(self, rhs: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for PixelPoint {
    fn add_assign(&mut self, rhs: PixelPoint) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for PixelPoint {
    type Output = PixelPoint;

    fn sub(self, rhs: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for PixelPoint {
    fn sub_assign(&mut self, rhs: PixelPoint) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for PixelPoint {
    type Output = PixelPoint;

    fn mul(self, rhs: f64) -> PixelPoint {
        PixelPoint::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for PixelPoint {
    type Output = PixelPoint;

    fn div(self, rhs: f64) -> PixelPoint {
        PixelPoint::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for PixelPoint {
    type Output = PixelPoint;

    fn neg(self) -> PixelPoint {
        PixelPoint::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for PixelPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for PixelPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelPoint({}, {})",
            crate::core::geo::format_num(self.x, 6),
            crate::core::geo::format_num(self.y, 6)
        )
    }
}
