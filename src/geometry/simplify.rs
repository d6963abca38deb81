//! Polyline simplification in pixel space
//!
//! A cheap radial-distance pass thins out dense vertices first, then
//! Douglas–Peucker removes the points that deviate less than the tolerance.

use crate::core::point::PixelPoint;

/// Simplifies `points` so that no dropped vertex is farther than `tolerance`
/// pixels from the resulting line.
///
/// The first and last points are always kept. Lines with fewer than three
/// points, or a zero tolerance, come back unchanged.
pub fn simplify(points: &[PixelPoint], tolerance: f64) -> Vec<PixelPoint> {
    if !(tolerance > 0.0) || points.len() <= 2 {
        return points.to_vec();
    }

    let sq_tolerance = tolerance * tolerance;
    let reduced = reduce_points(points, sq_tolerance);
    douglas_peucker(&reduced, sq_tolerance)
}

/// Radial distance pass: drops points closer than the tolerance to the last kept one
pub fn reduce_points(points: &[PixelPoint], sq_tolerance: f64) -> Vec<PixelPoint> {
    let Some((first, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut reduced = vec![*first];
    let mut prev = 0;

    for (i, point) in rest.iter().enumerate() {
        if point.sq_distance_to(&points[prev]) > sq_tolerance {
            reduced.push(*point);
            prev = i + 1;
        }
    }

    if prev < points.len() - 1 {
        reduced.push(points[points.len() - 1]);
    }
    reduced
}

fn douglas_peucker(points: &[PixelPoint], sq_tolerance: f64) -> Vec<PixelPoint> {
    let len = points.len();
    if len <= 2 {
        return points.to_vec();
    }

    let mut markers = vec![false; len];
    markers[0] = true;
    markers[len - 1] = true;
    mark_points(points, &mut markers, sq_tolerance, 0, len - 1);

    points
        .iter()
        .zip(markers)
        .filter_map(|(point, keep)| keep.then_some(*point))
        .collect()
}

fn mark_points(
    points: &[PixelPoint],
    markers: &mut [bool],
    sq_tolerance: f64,
    first: usize,
    last: usize,
) {
    let mut max_sq_dist = 0.0;
    let mut index = None;

    for i in (first + 1)..last {
        let sq_dist = sq_closest_point_on_segment(&points[i], &points[first], &points[last]);
        if sq_dist > max_sq_dist {
            max_sq_dist = sq_dist;
            index = Some(i);
        }
    }

    if let Some(index) = index {
        if max_sq_dist > sq_tolerance {
            markers[index] = true;
            mark_points(points, markers, sq_tolerance, first, index);
            mark_points(points, markers, sq_tolerance, index, last);
        }
    }
}

/// Point on segment `a`-`b` closest to `p`
pub fn closest_point_on_segment(p: &PixelPoint, a: &PixelPoint, b: &PixelPoint) -> PixelPoint {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dot = dx * dx + dy * dy;

    if dot > 0.0 {
        let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / dot;
        if t > 1.0 {
            return *b;
        } else if t > 0.0 {
            return PixelPoint::new(a.x + dx * t, a.y + dy * t);
        }
    }
    *a
}

/// Squared distance from `p` to segment `a`-`b`
pub fn sq_closest_point_on_segment(p: &PixelPoint, a: &PixelPoint, b: &PixelPoint) -> f64 {
    closest_point_on_segment(p, a, b).sq_distance_to(p)
}

/// Distance from `p` to segment `a`-`b`
pub fn point_to_segment_distance(p: &PixelPoint, a: &PixelPoint, b: &PixelPoint) -> f64 {
    sq_closest_point_on_segment(p, a, b).sqrt()
}

/// Distance from `p` to the nearest segment of a polyline, `None` for an empty line
pub fn point_to_polyline_distance(p: &PixelPoint, points: &[PixelPoint]) -> Option<f64> {
    match points {
        [] => None,
        [only] => Some(only.distance_to(p)),
        _ => points
            .windows(2)
            .map(|pair| point_to_segment_distance(p, &pair[0], &pair[1]))
            .reduce(f64::min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    #[test]
    fn test_simplify_drops_small_deviation() {
        let line = [p(0.0, 0.0), p(1.0, 0.01), p(2.0, 0.0)];
        assert_eq!(simplify(&line, 1.0), vec![p(0.0, 0.0), p(2.0, 0.0)]);
    }

    #[test]
    fn test_simplify_keeps_corners() {
        let line = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)];
        assert_eq!(simplify(&line, 1.0), line.to_vec());
    }

    #[test]
    fn test_simplify_degenerate_inputs() {
        assert!(simplify(&[], 1.0).is_empty());
        assert_eq!(simplify(&[p(1.0, 1.0)], 1.0), vec![p(1.0, 1.0)]);

        let line = [p(0.0, 0.0), p(1.0, 0.01), p(2.0, 0.0)];
        assert_eq!(simplify(&line, 0.0), line.to_vec());
    }

    #[test]
    fn test_simplified_points_stay_within_tolerance() {
        let line: Vec<PixelPoint> = (0..100)
            .map(|i| {
                let x = i as f64 * 3.0;
                p(x, (x / 20.0).sin() * 15.0)
            })
            .collect();
        let tolerance = 2.0;
        let simplified = simplify(&line, tolerance);

        assert!(simplified.len() < line.len());
        assert_eq!(simplified.first(), line.first());
        assert_eq!(simplified.last(), line.last());
        for point in &line {
            let distance = point_to_polyline_distance(point, &simplified).unwrap();
            assert!(distance <= tolerance + 1e-9, "{} is {} away", point, distance);
        }
    }

    #[test]
    fn test_reduce_points_keeps_last() {
        let line = [p(0.0, 0.0), p(0.1, 0.0), p(0.2, 0.0)];
        assert_eq!(reduce_points(&line, 1.0), vec![p(0.0, 0.0), p(0.2, 0.0)]);
    }

    #[test]
    fn test_segment_distance() {
        let a = p(0.0, 0.0);
        let b = p(10.0, 0.0);
        assert_eq!(point_to_segment_distance(&p(5.0, 3.0), &a, &b), 3.0);
        assert_eq!(point_to_segment_distance(&p(-3.0, 4.0), &a, &b), 5.0);
        assert_eq!(closest_point_on_segment(&p(12.0, 1.0), &a, &b), b);
        assert_eq!(point_to_segment_distance(&p(3.0, 4.0), &a, &a), 5.0);
    }
}
