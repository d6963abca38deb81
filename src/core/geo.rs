use crate::core::area::Area;
use crate::core::constants::{DEFAULT_MARGIN, EARTH_CIRCUMFERENCE};
use crate::projection::crs::EPSG3857;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a geographical coordinate with latitude and longitude
///
/// `new` trusts its input and is what the projection math uses internally;
/// anything coming from outside the crate should go through [`GeoPoint::try_new`]
/// or one of the `TryFrom` conversions, which reject non-finite values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "GeoPointRepr")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
}

#[derive(Deserialize)]
struct GeoPointRepr {
    lat: f64,
    #[serde(alias = "lon")]
    lng: f64,
    #[serde(default)]
    alt: Option<f64>,
}

impl TryFrom<GeoPointRepr> for GeoPoint {
    type Error = MapError;

    fn try_from(repr: GeoPointRepr) -> Result<Self> {
        let point = GeoPoint::try_new(repr.lat, repr.lng)?;
        match repr.alt {
            Some(alt) => point.with_alt(alt),
            None => Ok(point),
        }
    }
}

impl GeoPoint {
    /// Creates a coordinate without validation
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            alt: None,
        }
    }

    /// Creates a coordinate, failing on NaN or infinite components
    pub fn try_new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "Invalid GeoPoint object: ({}, {})",
                lat, lng
            )));
        }
        Ok(Self::new(lat, lng))
    }

    /// Attaches an altitude in meters
    pub fn with_alt(mut self, alt: f64) -> Result<Self> {
        if !alt.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "Invalid altitude for GeoPoint({}, {}): {}",
                self.lat, self.lng, alt
            )));
        }
        self.alt = Some(alt);
        Ok(self)
    }

    /// Compares two coordinates, allowing `max_margin` degrees of difference on each axis
    pub fn equals(&self, other: &GeoPoint, max_margin: f64) -> bool {
        let margin = (self.lat - other.lat)
            .abs()
            .max((self.lng - other.lng).abs());
        margin <= max_margin
    }

    /// Great-circle distance in meters (haversine)
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        EPSG3857.distance(self, other)
    }

    /// Returns the coordinate with longitude wrapped into [-180, 180]
    pub fn wrap(&self) -> GeoPoint {
        EPSG3857.wrap_geo(self)
    }

    /// Returns a square area whose sides are `size_in_meters` long, centered here
    pub fn to_area(&self, size_in_meters: f64) -> Area {
        let lat_accuracy = 180.0 * size_in_meters / EARTH_CIRCUMFERENCE;
        let lng_accuracy = lat_accuracy / self.lat.to_radians().cos();

        Area::new(
            GeoPoint::new(self.lat - lat_accuracy, self.lng - lng_accuracy),
            GeoPoint::new(self.lat + lat_accuracy, self.lng + lng_accuracy),
        )
    }

    /// Formats the coordinate with the given number of decimals
    pub fn to_string_with_precision(&self, precision: u32) -> String {
        format!(
            "GeoPoint({}, {})",
            format_num(self.lat, precision),
            format_num(self.lng, precision)
        )
    }
}

impl PartialEq for GeoPoint {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, DEFAULT_MARGIN)
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_precision(6))
    }
}

impl TryFrom<(f64, f64)> for GeoPoint {
    type Error = MapError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self> {
        GeoPoint::try_new(lat, lng)
    }
}

impl TryFrom<[f64; 2]> for GeoPoint {
    type Error = MapError;

    fn try_from([lat, lng]: [f64; 2]) -> Result<Self> {
        GeoPoint::try_new(lat, lng)
    }
}

impl TryFrom<[f64; 3]> for GeoPoint {
    type Error = MapError;

    fn try_from([lat, lng, alt]: [f64; 3]) -> Result<Self> {
        GeoPoint::try_new(lat, lng)?.with_alt(alt)
    }
}

/// geo-types points are (x = longitude, y = latitude)
impl TryFrom<geo_types::Point<f64>> for GeoPoint {
    type Error = MapError;

    fn try_from(point: geo_types::Point<f64>) -> Result<Self> {
        GeoPoint::try_new(point.y(), point.x())
    }
}

impl TryFrom<geo_types::Coord<f64>> for GeoPoint {
    type Error = MapError;

    fn try_from(coord: geo_types::Coord<f64>) -> Result<Self> {
        GeoPoint::try_new(coord.y, coord.x)
    }
}

impl From<GeoPoint> for geo_types::Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        geo_types::Coord {
            x: point.lng,
            y: point.lat,
        }
    }
}

/// Rounds `num` to `precision` decimals, the way coordinates are printed.
pub fn format_num(num: f64, precision: u32) -> f64 {
    let pow = 10_f64.powi(precision as i32);
    (num * pow).round() / pow
}
