use crate::core::{bounds::Bounds, point::PixelPoint};
use crate::data::feature::FeatureId;
use crate::geometry::simplify::point_to_segment_distance;

use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};
use std::fmt;

/// Whether an event keeps travelling to the features below
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// Drawn outline of a feature in container pixels
#[derive(Debug, Clone, PartialEq)]
pub enum HitShape {
    Circle {
        center: PixelPoint,
        radius: f64,
    },
    /// Visible parts of a line and half its stroke width
    Polyline {
        parts: Vec<Vec<PixelPoint>>,
        half_width: f64,
    },
    Polygon {
        ring: Vec<PixelPoint>,
        half_width: f64,
    },
}

impl HitShape {
    pub fn bounds(&self) -> Bounds {
        match self {
            HitShape::Circle { center, radius } => {
                let r = PixelPoint::new(*radius, *radius);
                Bounds::new(*center - r, *center + r)
            }
            HitShape::Polyline { parts, half_width } => {
                grow(Bounds::from_points(parts.iter().flatten()), *half_width)
            }
            HitShape::Polygon { ring, half_width } => {
                grow(Bounds::from_points(ring.iter()), *half_width)
            }
        }
    }

    /// True when `point` lies on the shape, allowing `tolerance` extra pixels
    pub fn contains(&self, point: &PixelPoint, tolerance: f64) -> bool {
        match self {
            HitShape::Circle { center, radius } => center.distance_to(point) <= radius + tolerance,
            HitShape::Polyline { parts, half_width } => parts
                .iter()
                .any(|part| near_line(point, part, half_width + tolerance, false)),
            HitShape::Polygon { ring, half_width } => {
                point_in_ring(point, ring) || near_line(point, ring, half_width + tolerance, true)
            }
        }
    }
}

fn grow(bounds: Bounds, by: f64) -> Bounds {
    if !bounds.is_valid() {
        return bounds;
    }
    let pad = PixelPoint::new(by, by);
    Bounds::new(bounds.min - pad, bounds.max + pad)
}

fn near_line(point: &PixelPoint, points: &[PixelPoint], width: f64, closed: bool) -> bool {
    match points {
        [] => false,
        [only] => only.distance_to(point) <= width,
        _ => {
            let closing = closed.then(|| (points[points.len() - 1], points[0]));
            points
                .windows(2)
                .map(|pair| (pair[0], pair[1]))
                .chain(closing)
                .any(|(a, b)| point_to_segment_distance(point, &a, &b) <= width)
        }
    }
}

/// Even-odd ray casting
fn point_in_ring(point: &PixelPoint, ring: &[PixelPoint]) -> bool {
    let mut inside = false;
    let len = ring.len();
    for i in 0..len {
        let a = ring[i];
        let b = ring[if i == 0 { len - 1 } else { i - 1 }];
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
    }
    inside
}

#[derive(Debug, Clone, PartialEq)]
struct HitEntry {
    id: FeatureId,
    shape: HitShape,
    bounds: Bounds,
    /// Draw order; later entries sit on top
    order: usize,
}

impl RTreeObject for HitEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min.x, self.bounds.min.y],
            [self.bounds.max.x, self.bounds.max.y],
        )
    }
}

impl PointDistance for HitEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.bounds.contains(&PixelPoint::new(point[0], point[1]))
    }
}

/// Features drawn in the last frame, indexed by their pixel bounds
///
/// Rebuilt on every render; queries return the topmost feature first.
pub struct HitIndex {
    rtree: RTree<HitEntry>,
    next_order: usize,
}

impl Default for HitIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitIndex")
            .field("len", &self.rtree.size())
            .finish()
    }
}

impl HitIndex {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
            next_order: 0,
        }
    }

    pub fn insert(&mut self, id: FeatureId, shape: HitShape) {
        let bounds = shape.bounds();
        if !bounds.is_valid() {
            return;
        }
        self.rtree.insert(HitEntry {
            id,
            shape,
            bounds,
            order: self.next_order,
        });
        self.next_order += 1;
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn clear(&mut self) {
        self.rtree = RTree::new();
        self.next_order = 0;
    }

    /// Pixel bounds recorded for `id`
    pub fn bounds_of(&self, id: FeatureId) -> Option<Bounds> {
        self.rtree
            .iter()
            .filter(|entry| entry.id == id)
            .map(|entry| entry.bounds)
            .reduce(|mut acc, bounds| {
                acc.extend_bounds(&bounds);
                acc
            })
    }

    /// Features under `point`, topmost first
    pub fn targets_at(&self, point: PixelPoint, tolerance: f64) -> Vec<FeatureId> {
        let envelope = AABB::from_corners(
            [point.x - tolerance, point.y - tolerance],
            [point.x + tolerance, point.y + tolerance],
        );

        let mut hits: Vec<&HitEntry> = self
            .rtree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.shape.contains(&point, tolerance))
            .collect();
        hits.sort_by(|a, b| b.order.cmp(&a.order));

        let mut ids: Vec<FeatureId> = Vec::with_capacity(hits.len());
        for entry in hits {
            if !ids.contains(&entry.id) {
                ids.push(entry.id);
            }
        }
        ids
    }

    /// Hands the features under `point` to `handler`, topmost first, until it
    /// answers [`Propagation::Stop`]. Returns whether propagation was stopped.
    pub fn dispatch<F>(&self, point: PixelPoint, tolerance: f64, mut handler: F) -> bool
    where
        F: FnMut(FeatureId) -> Propagation,
    {
        for id in self.targets_at(point, tolerance) {
            if handler(id) == Propagation::Stop {
                log::trace!("Propagation stopped at feature {}", id);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    fn square(min: f64, max: f64) -> HitShape {
        HitShape::Polygon {
            ring: vec![p(min, min), p(max, min), p(max, max), p(min, max)],
            half_width: 1.5,
        }
    }

    #[test]
    fn test_topmost_first() {
        let mut index = HitIndex::new();
        index.insert(FeatureId(1), square(0.0, 100.0));
        index.insert(FeatureId(2), square(50.0, 150.0));
        index.insert(
            FeatureId(3),
            HitShape::Circle {
                center: p(75.0, 75.0),
                radius: 10.0,
            },
        );

        assert_eq!(
            index.targets_at(p(75.0, 75.0), 0.0),
            vec![FeatureId(3), FeatureId(2), FeatureId(1)]
        );
        assert_eq!(index.targets_at(p(10.0, 10.0), 0.0), vec![FeatureId(1)]);
        assert!(index.targets_at(p(500.0, 500.0), 0.0).is_empty());
    }

    #[test]
    fn test_polyline_hit_uses_stroke_width() {
        let mut index = HitIndex::new();
        index.insert(
            FeatureId(9),
            HitShape::Polyline {
                parts: vec![vec![p(0.0, 0.0), p(100.0, 100.0)]],
                half_width: 1.5,
            },
        );

        assert_eq!(index.targets_at(p(50.0, 51.0), 0.0), vec![FeatureId(9)]);
        // Inside the bounding box but far from the line
        assert!(index.targets_at(p(90.0, 10.0), 0.0).is_empty());
        assert_eq!(index.targets_at(p(50.0, 55.0), 5.0), vec![FeatureId(9)]);
    }

    #[test]
    fn test_dispatch_stops_propagation() {
        let mut index = HitIndex::new();
        index.insert(FeatureId(1), square(0.0, 100.0));
        index.insert(FeatureId(2), square(0.0, 100.0));

        let mut seen = Vec::new();
        let stopped = index.dispatch(p(10.0, 10.0), 0.0, |id| {
            seen.push(id);
            Propagation::Stop
        });
        assert!(stopped);
        assert_eq!(seen, vec![FeatureId(2)]);

        let mut seen = Vec::new();
        let stopped = index.dispatch(p(10.0, 10.0), 0.0, |id| {
            seen.push(id);
            Propagation::Continue
        });
        assert!(!stopped);
        assert_eq!(seen, vec![FeatureId(2), FeatureId(1)]);
    }

    #[test]
    fn test_clear() {
        let mut index = HitIndex::new();
        index.insert(FeatureId(1), square(0.0, 10.0));
        assert_eq!(index.len(), 1);
        assert!(index.bounds_of(FeatureId(1)).is_some());

        index.clear();
        assert!(index.is_empty());
        assert!(index.targets_at(p(5.0, 5.0), 0.0).is_empty());
    }
}
