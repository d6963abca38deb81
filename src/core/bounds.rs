use crate::core::point::PixelPoint;
use serde::{Deserialize, Serialize};

/// Represents a bounding box in screen/pixel coordinates
///
/// A freshly created `Bounds::empty()` is invalid (`min` is +∞, `max` is −∞) until
/// the first `extend`; callers must check [`Bounds::is_valid`] before reading corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: PixelPoint,
    pub max: PixelPoint,
}

impl Bounds {
    /// Creates the smallest bounds containing both corners
    pub fn new(a: PixelPoint, b: PixelPoint) -> Self {
        let mut bounds = Self::empty();
        bounds.extend(&a);
        bounds.extend(&b);
        bounds
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(PixelPoint::new(min_x, min_y), PixelPoint::new(max_x, max_y))
    }

    /// Creates bounds covering every point of the iterator
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a PixelPoint>,
    {
        let mut bounds = Self::empty();
        for point in points {
            bounds.extend(point);
        }
        bounds
    }

    /// Creates empty bounds (invalid bounds that can be extended)
    pub fn empty() -> Self {
        Self {
            min: PixelPoint::new(f64::INFINITY, f64::INFINITY),
            max: PixelPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Checks if the bounds were extended at least once
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &PixelPoint) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Extends the bounds to include another bounds; invalid input is ignored
    pub fn extend_bounds(&mut self, other: &Bounds) {
        if !other.is_valid() {
            return;
        }
        self.extend(&other.min);
        self.extend(&other.max);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> PixelPoint {
        self.max - self.min
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn top_left(&self) -> PixelPoint {
        self.min
    }

    pub fn top_right(&self) -> PixelPoint {
        PixelPoint::new(self.max.x, self.min.y)
    }

    pub fn bottom_left(&self) -> PixelPoint {
        PixelPoint::new(self.min.x, self.max.y)
    }

    pub fn bottom_right(&self) -> PixelPoint {
        self.max
    }

    /// Checks if the bounds contain a point (edges included)
    pub fn contains(&self, point: &PixelPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// True if the two bounds share at least one point (touching edges count)
    pub fn intersects(&self, other: &Bounds) -> bool {
        let x_intersects = other.max.x >= self.min.x && other.min.x <= self.max.x;
        let y_intersects = other.max.y >= self.min.y && other.min.y <= self.max.y;
        x_intersects && y_intersects
    }

    /// True if the two bounds share a non-zero area
    pub fn overlaps(&self, other: &Bounds) -> bool {
        let x_overlaps = other.max.x > self.min.x && other.min.x < self.max.x;
        let y_overlaps = other.max.y > self.min.y && other.min.y < self.max.y;
        x_overlaps && y_overlaps
    }

    /// Returns bounds grown by `ratio` of the current extent on every side
    pub fn pad(&self, ratio: f64) -> Bounds {
        let width_buffer = self.width().abs() * ratio;
        let height_buffer = self.height().abs() * ratio;

        Bounds::new(
            PixelPoint::new(self.min.x - width_buffer, self.min.y - height_buffer),
            PixelPoint::new(self.max.x + width_buffer, self.max.y + height_buffer),
        )
    }

    pub fn round(&self) -> Bounds {
        Bounds {
            min: self.min.round(),
            max: self.max.round(),
        }
    }

    /// Returns the bounds translated by `offset`
    pub fn translate(&self, offset: PixelPoint) -> Bounds {
        Bounds {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}
