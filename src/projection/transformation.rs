use crate::core::point::PixelPoint;
use serde::{Deserialize, Serialize};

/// Affine map `(a·x + b, c·y + d) · scale` from planar units to pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Transformation {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn transform(&self, point: &PixelPoint, scale: f64) -> PixelPoint {
        PixelPoint::new(
            scale * (self.a * point.x + self.b),
            scale * (self.c * point.y + self.d),
        )
    }

    pub fn untransform(&self, point: &PixelPoint, scale: f64) -> PixelPoint {
        PixelPoint::new(
            (point.x / scale - self.b) / self.a,
            (point.y / scale - self.d) / self.c,
        )
    }
}

impl From<[f64; 4]> for Transformation {
    fn from([a, b, c, d]: [f64; 4]) -> Self {
        Self::new(a, b, c, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_and_back() {
        let t = Transformation::new(2.0, 5.0, -1.0, 3.0);
        let p = PixelPoint::new(1.0, 2.0);

        let transformed = t.transform(&p, 2.0);
        assert_eq!(transformed, PixelPoint::new(14.0, 2.0));
        assert_eq!(t.untransform(&transformed, 2.0), p);
    }
}
