use crate::core::constants::DEFAULT_MARGIN;
use crate::core::geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// Represents a bounding box of geographical coordinates
///
/// Like [`crate::Bounds`], an `Area::empty()` stays invalid until the first
/// `extend`; corner accessors are only meaningful once [`Area::is_valid`] holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Area {
    south_west: GeoPoint,
    north_east: GeoPoint,
}

impl Area {
    /// Creates the smallest area containing both corners
    pub fn new(corner1: GeoPoint, corner2: GeoPoint) -> Self {
        let mut area = Self::empty();
        area.extend(&corner1);
        area.extend(&corner2);
        area
    }

    /// Creates an area from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(GeoPoint::new(south, west), GeoPoint::new(north, east))
    }

    /// Creates the area covering every coordinate of the iterator
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut area = Self::empty();
        for point in points {
            area.extend(point);
        }
        area
    }

    /// The whole Mercator-addressable world
    pub fn world() -> Self {
        Self::from_coords(-90.0, -180.0, 90.0, 180.0)
    }

    pub fn empty() -> Self {
        Self {
            south_west: GeoPoint::new(f64::INFINITY, f64::INFINITY),
            north_east: GeoPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.south_west.lat <= self.north_east.lat && self.south_west.lng <= self.north_east.lng
    }

    /// Extends the area to include a point
    pub fn extend(&mut self, point: &GeoPoint) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Extends the area to include another area; invalid input is ignored
    pub fn extend_area(&mut self, other: &Area) {
        if !other.is_valid() {
            return;
        }
        self.extend(&other.south_west);
        self.extend(&other.north_east);
    }

    /// Returns an area grown by `ratio` of the current span on every side
    pub fn pad(&self, ratio: f64) -> Area {
        let height_buffer = (self.south_west.lat - self.north_east.lat).abs() * ratio;
        let width_buffer = (self.south_west.lng - self.north_east.lng).abs() * ratio;

        Area::new(
            GeoPoint::new(
                self.south_west.lat - height_buffer,
                self.south_west.lng - width_buffer,
            ),
            GeoPoint::new(
                self.north_east.lat + height_buffer,
                self.north_east.lng + width_buffer,
            ),
        )
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn south_west(&self) -> GeoPoint {
        self.south_west
    }

    pub fn north_east(&self) -> GeoPoint {
        self.north_east
    }

    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.north(), self.west())
    }

    pub fn south_east(&self) -> GeoPoint {
        GeoPoint::new(self.south(), self.east())
    }

    pub fn west(&self) -> f64 {
        self.south_west.lng
    }

    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    pub fn east(&self) -> f64 {
        self.north_east.lng
    }

    pub fn north(&self) -> f64 {
        self.north_east.lat
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn contains_area(&self, other: &Area) -> bool {
        self.contains(&other.south_west) && self.contains(&other.north_east)
    }

    /// True if the areas share at least one point (touching edges count)
    pub fn intersects(&self, other: &Area) -> bool {
        let lat_intersects =
            other.north_east.lat >= self.south_west.lat && other.south_west.lat <= self.north_east.lat;
        let lng_intersects =
            other.north_east.lng >= self.south_west.lng && other.south_west.lng <= self.north_east.lng;
        lat_intersects && lng_intersects
    }

    /// True if the areas share a non-zero surface
    pub fn overlaps(&self, other: &Area) -> bool {
        let lat_overlaps =
            other.north_east.lat > self.south_west.lat && other.south_west.lat < self.north_east.lat;
        let lng_overlaps =
            other.north_east.lng > self.south_west.lng && other.south_west.lng < self.north_east.lng;
        lat_overlaps && lng_overlaps
    }

    pub fn equals(&self, other: &Area, max_margin: f64) -> bool {
        self.south_west.equals(&other.south_west, max_margin)
            && self.north_east.equals(&other.north_east, max_margin)
    }

    /// `"west,south,east,north"`, the order used by WMS-style bbox parameters
    pub fn to_bbox_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.west(),
            self.south(),
            self.east(),
            self.north()
        )
    }
}

impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, DEFAULT_MARGIN)
    }
}

impl Default for Area {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_contains() {
        let area = Area::from_coords(40.0, -75.0, 41.0, -73.0);
        assert!(area.contains(&GeoPoint::new(40.5, -74.0)));
        assert!(!area.contains(&GeoPoint::new(42.0, -74.0)));
    }

    #[test]
    fn test_empty_area_is_invalid_until_extended() {
        let mut area = Area::empty();
        assert!(!area.is_valid());

        area.extend(&GeoPoint::new(1.0, 2.0));
        area.extend(&GeoPoint::new(-1.0, 4.0));
        assert!(area.is_valid());
        assert_eq!(area.south_west(), GeoPoint::new(-1.0, 2.0));
        assert_eq!(area.north_east(), GeoPoint::new(1.0, 4.0));
    }

    #[test]
    fn test_pad_grows_each_side() {
        let padded = Area::from_coords(0.0, 0.0, 10.0, 20.0).pad(0.5);
        assert_eq!(padded.south_west(), GeoPoint::new(-5.0, -10.0));
        assert_eq!(padded.north_east(), GeoPoint::new(15.0, 30.0));
    }

    #[test]
    fn test_bbox_string() {
        let area = Area::from_coords(1.0, 2.0, 3.0, 4.0);
        assert_eq!(area.to_bbox_string(), "2,1,4,3");
    }
}
