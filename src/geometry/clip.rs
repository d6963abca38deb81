//! Clipping of pixel-space geometry against the visible rectangle
//!
//! Segments use Cohen–Sutherland outcodes, rings use Sutherland–Hodgman.

use crate::core::{bounds::Bounds, point::PixelPoint};

/// Left of `bounds.min.x`
pub const LEFT: u8 = 1;
/// Right of `bounds.max.x`
pub const RIGHT: u8 = 2;
/// Above `bounds.min.y`
pub const TOP: u8 = 4;
/// Below `bounds.max.y`
pub const BOTTOM: u8 = 8;

/// Each end point crosses at most one vertical and one horizontal edge; a
/// segment still outside after this many moves only grazes a corner.
const MAX_CLIP_STEPS: usize = 4;

/// Slack for intersections that land a rounding error past an edge
const EDGE_TOLERANCE: f64 = 1e-6;

/// Edge order of the polygon passes
const POLYGON_EDGES: [u8; 4] = [LEFT, TOP, RIGHT, BOTTOM];

/// Outcode of `p` relative to `bounds` (0 when inside or on the border)
pub fn bit_code(p: &PixelPoint, bounds: &Bounds) -> u8 {
    let mut code = 0;

    if p.x < bounds.min.x {
        code |= LEFT;
    } else if p.x > bounds.max.x {
        code |= RIGHT;
    }

    if p.y < bounds.min.y {
        code |= TOP;
    } else if p.y > bounds.max.y {
        code |= BOTTOM;
    }

    code
}

/// Intersection of segment `a`-`b` with the bounds edge named by `code`.
///
/// When several bits are set the bottom, top, right, left order decides which
/// edge is used. An intersection that lies on the bounds is never snapped
/// outside of them, so half-pixel edges still clear the outcode.
pub fn edge_intersection(
    a: &PixelPoint,
    b: &PixelPoint,
    code: u8,
    bounds: &Bounds,
    round: bool,
) -> PixelPoint {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let min = bounds.min;
    let max = bounds.max;

    let (x, y) = if code & BOTTOM != 0 {
        (a.x + dx * (max.y - a.y) / dy, max.y)
    } else if code & TOP != 0 {
        (a.x + dx * (min.y - a.y) / dy, min.y)
    } else if code & RIGHT != 0 {
        (max.x, a.y + dy * (max.x - a.x) / dx)
    } else if code & LEFT != 0 {
        (min.x, a.y + dy * (min.x - a.x) / dx)
    } else {
        (a.x, a.y)
    };

    let exact = PixelPoint::new(x, y);
    let point = if round { exact.round() } else { exact };
    PixelPoint::new(
        settle(exact.x, point.x, min.x, max.x),
        settle(exact.y, point.y, min.y, max.y),
    )
}

/// Keeps a coordinate whose exact value lies within `[min, max]` inside that
/// range after snapping.
fn settle(exact: f64, value: f64, min: f64, max: f64) -> f64 {
    if exact >= min - EDGE_TOLERANCE && exact <= max + EDGE_TOLERANCE {
        value.max(min).min(max)
    } else {
        value
    }
}

/// A segment that survived clipping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedSegment {
    pub start: PixelPoint,
    pub end: PixelPoint,
    /// The end point was moved onto the bounds
    pub end_clipped: bool,
}

/// Clips consecutive segments, remembering the outcode of the previous end point.
///
/// The cached code is what makes walking a polyline cheap: each vertex is
/// classified once instead of twice.
#[derive(Debug, Clone, Copy)]
pub struct SegmentClipper<'a> {
    bounds: &'a Bounds,
    round: bool,
    last_code: u8,
}

impl<'a> SegmentClipper<'a> {
    pub fn new(bounds: &'a Bounds, round: bool) -> Self {
        Self {
            bounds,
            round,
            last_code: 0,
        }
    }

    /// Clips `a`-`b`. With `use_last_code`, `a` is assumed to be the `b` of the
    /// previous call and its outcode is not recomputed.
    pub fn clip(
        &mut self,
        a: PixelPoint,
        b: PixelPoint,
        use_last_code: bool,
    ) -> Option<ClippedSegment> {
        let mut code_a = if use_last_code {
            self.last_code
        } else {
            bit_code(&a, self.bounds)
        };
        let mut code_b = bit_code(&b, self.bounds);
        self.last_code = code_b;

        let (mut a, mut b) = (a, b);
        let mut end_clipped = false;

        for _ in 0..=MAX_CLIP_STEPS {
            if code_a | code_b == 0 {
                return Some(ClippedSegment {
                    start: a,
                    end: b,
                    end_clipped,
                });
            }
            if code_a & code_b != 0 {
                return None;
            }

            let code_out = if code_a != 0 { code_a } else { code_b };
            let p = edge_intersection(&a, &b, code_out, self.bounds, self.round);
            let new_code = bit_code(&p, self.bounds);

            if code_out == code_a {
                a = p;
                code_a = new_code;
            } else {
                b = p;
                code_b = new_code;
                end_clipped = true;
            }
        }

        None
    }
}

/// Clips a single segment; `None` when it lies entirely outside
pub fn clip_segment(
    a: PixelPoint,
    b: PixelPoint,
    bounds: &Bounds,
    round: bool,
) -> Option<(PixelPoint, PixelPoint)> {
    SegmentClipper::new(bounds, round)
        .clip(a, b, false)
        .map(|segment| (segment.start, segment.end))
}

/// Splits a polyline into the parts visible inside `bounds`.
///
/// Intersections are rounded to whole pixels. A line that never enters the
/// bounds yields no parts.
pub fn clip_polyline(points: &[PixelPoint], bounds: &Bounds) -> Vec<Vec<PixelPoint>> {
    let mut parts: Vec<Vec<PixelPoint>> = Vec::new();
    let mut current: Vec<PixelPoint> = Vec::new();
    let mut clipper = SegmentClipper::new(bounds, true);
    let len = points.len();

    for j in 0..len.saturating_sub(1) {
        let Some(segment) = clipper.clip(points[j], points[j + 1], j > 0) else {
            continue;
        };

        current.push(segment.start);
        if segment.end_clipped || j == len - 2 {
            current.push(segment.end);
            parts.push(std::mem::take(&mut current));
        }
    }

    parts
}

/// Clips a closed ring against `bounds`, one edge at a time.
///
/// The ring is implicitly closed (last vertex connects to the first). Returns an
/// empty ring when nothing is visible.
pub fn clip_polygon(points: &[PixelPoint], bounds: &Bounds, round: bool) -> Vec<PixelPoint> {
    let mut ring: Vec<(PixelPoint, u8)> = points
        .iter()
        .map(|p| (*p, bit_code(p, bounds)))
        .collect();

    for edge in POLYGON_EDGES {
        let len = ring.len();
        let mut clipped = Vec::with_capacity(len + 2);

        for i in 0..len {
            let j = if i == 0 { len - 1 } else { i - 1 };
            let (a, code_a) = ring[i];
            let (b, code_b) = ring[j];

            if code_a & edge == 0 {
                if code_b & edge != 0 {
                    let p = edge_intersection(&b, &a, edge, bounds, round);
                    clipped.push((p, bit_code(&p, bounds)));
                }
                clipped.push((a, code_a));
            } else if code_b & edge == 0 {
                let p = edge_intersection(&b, &a, edge, bounds, round);
                clipped.push((p, bit_code(&p, bounds)));
            }
        }
        ring = clipped;
    }

    ring.into_iter().map(|(p, _)| p).collect()
}
