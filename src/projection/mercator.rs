use super::Projection;
use crate::core::constants::{MAX_LATITUDE, MERCATOR_RADIUS};
use crate::core::{bounds::Bounds, geo::GeoPoint, point::PixelPoint};
use std::f64::consts::PI;

/// Spherical Mercator projection (the sphere variant behind EPSG:3857)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalMercator {
    /// Sphere radius in meters
    pub radius: f64,
    /// Latitudes are clamped to ±this value before projecting
    pub max_latitude: f64,
}

impl SphericalMercator {
    pub const fn new() -> Self {
        Self {
            radius: MERCATOR_RADIUS,
            max_latitude: MAX_LATITUDE,
        }
    }
}

impl Default for SphericalMercator {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for SphericalMercator {
    fn project(&self, point: &GeoPoint) -> PixelPoint {
        let d = PI / 180.0;
        let lat = point.lat.min(self.max_latitude).max(-self.max_latitude);
        let sin = (lat * d).sin();

        PixelPoint::new(
            self.radius * point.lng * d,
            self.radius * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
        )
    }

    fn unproject(&self, point: &PixelPoint) -> GeoPoint {
        let d = 180.0 / PI;
        GeoPoint::new(
            (2.0 * (point.y / self.radius).exp().atan() - PI / 2.0) * d,
            point.x * d / self.radius,
        )
    }

    fn bounds(&self) -> Bounds {
        let d = self.radius * PI;
        Bounds::from_coords(-d, -d, d, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_zero() {
        let projected = SphericalMercator::new().project(&GeoPoint::new(0.0, 0.0));
        assert_eq!(projected, PixelPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_round_trip() {
        let mercator = SphericalMercator::new();
        for lat in [-85.05, -60.0, -1.5, 0.0, 33.3, 85.05] {
            for lng in [-180.0, -45.5, 0.0, 120.25, 180.0] {
                let original = GeoPoint::new(lat, lng);
                let back = mercator.unproject(&mercator.project(&original));
                assert!(back.equals(&original, 1e-9), "{} -> {}", original, back);
            }
        }
    }

    #[test]
    fn test_latitude_is_clamped() {
        let mercator = SphericalMercator::new();
        let pole = mercator.project(&GeoPoint::new(90.0, 0.0));
        let edge = mercator.project(&GeoPoint::new(MAX_LATITUDE, 0.0));

        assert_eq!(pole, edge);
        assert!((edge.y - MERCATOR_RADIUS * PI).abs() < 1e-3);
    }
}
