//! Label anchors for lines and rings, computed in projected meters

use crate::core::{area::Area, geo::GeoPoint, point::PixelPoint};
use crate::projection::crs::Crs;
use crate::{MapError, Result};

/// Below this bounding area (m²) coordinates are recentered on their centroid
/// before projecting, so tiny shapes keep their precision.
const SMALL_AREA_THRESHOLD: f64 = 1700.0;

/// Arithmetic mean of the coordinates
pub fn centroid(points: &[GeoPoint]) -> Result<GeoPoint> {
    if points.is_empty() {
        return Err(MapError::InvalidBounds(
            "centroid of an empty coordinate list".to_string(),
        ));
    }

    let n = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Ok(GeoPoint::new(lat / n, lng / n))
}

/// Point halfway along the projected length of a polyline
pub fn polyline_center(points: &[GeoPoint], crs: &Crs) -> Result<GeoPoint> {
    let (offset, projected) = project_relative(points, crs)?;

    let half: f64 = projected
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum::<f64>()
        / 2.0;

    let mut center = projected[0];
    if half > 0.0 {
        let mut travelled = 0.0;
        center = projected[projected.len() - 1];
        for pair in projected.windows(2) {
            let (p1, p2) = (pair[0], pair[1]);
            let segment = p1.distance_to(&p2);
            travelled += segment;
            if travelled > half {
                let ratio = (travelled - half) / segment;
                center = p2 - (p2 - p1) * ratio;
                break;
            }
        }
    }

    Ok(restore(crs.unproject(&center), offset))
}

/// Area-weighted centroid of a closed ring
pub fn polygon_center(points: &[GeoPoint], crs: &Crs) -> Result<GeoPoint> {
    let (offset, projected) = project_relative(points, crs)?;

    let len = projected.len();
    let (mut area, mut x, mut y) = (0.0, 0.0, 0.0);
    for i in 0..len {
        let p1 = projected[i];
        let p2 = projected[if i == 0 { len - 1 } else { i - 1 }];
        let f = p1.y * p2.x - p2.y * p1.x;
        x += (p1.x + p2.x) * f;
        y += (p1.y + p2.y) * f;
        area += f * 3.0;
    }

    let center = if area == 0.0 {
        projected[0]
    } else {
        PixelPoint::new(x / area, y / area)
    };

    Ok(restore(crs.unproject(&center), offset))
}

/// Projects `points`, shifted by their centroid when they cover a very small area
fn project_relative(points: &[GeoPoint], crs: &Crs) -> Result<(GeoPoint, Vec<PixelPoint>)> {
    if points.is_empty() {
        return Err(MapError::InvalidBounds(
            "center of an empty coordinate list".to_string(),
        ));
    }

    let area = Area::from_points(points.iter());
    let extent = area.north_west().distance_to(&area.south_west())
        * area.north_east().distance_to(&area.north_west());

    let offset = if extent < SMALL_AREA_THRESHOLD {
        centroid(points)?
    } else {
        GeoPoint::new(0.0, 0.0)
    };

    let projected = points
        .iter()
        .map(|p| crs.project(&GeoPoint::new(p.lat - offset.lat, p.lng - offset.lng)))
        .collect();
    Ok((offset, projected))
}

fn restore(point: GeoPoint, offset: GeoPoint) -> GeoPoint {
    GeoPoint::new(point.lat + offset.lat, point.lng + offset.lng)
}
