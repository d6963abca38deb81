use super::{Projection, SphericalMercator, Transformation};
use crate::core::constants::{EARTH_RADIUS, TILE_SIZE};
use crate::core::{area::Area, bounds::Bounds, geo::GeoPoint, point::PixelPoint};
use once_cell::sync::Lazy;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Web Mercator, the CRS used by virtually every public tile service
pub static EPSG3857: Lazy<Crs> = Lazy::new(|| Crs::spherical_mercator("EPSG:3857"));

/// Legacy alias of EPSG:3857
pub static EPSG900913: Lazy<Crs> = Lazy::new(|| Crs::spherical_mercator("EPSG:900913"));

/// Coordinate reference system: projection + transformation + zoom/scale law
#[derive(Clone)]
pub struct Crs {
    code: &'static str,
    projection: Arc<dyn Projection>,
    transformation: Transformation,
    /// Longitude range coordinates are wrapped into, if any
    wrap_lng: Option<(f64, f64)>,
    /// Latitude range coordinates are wrapped into, if any
    wrap_lat: Option<(f64, f64)>,
    /// Sphere radius used for distances
    radius: f64,
    /// An infinite CRS has no projected bounds
    infinite: bool,
}

impl Crs {
    /// Spherical Mercator with the `(s, 0.5, -s, 0.5)` transformation, `s = 0.5 / (π·R)`
    pub fn spherical_mercator(code: &'static str) -> Self {
        let projection = SphericalMercator::new();
        let scale = 0.5 / (PI * projection.radius);

        Self::new(
            code,
            Arc::new(projection),
            Transformation::new(scale, 0.5, -scale, 0.5),
        )
        .with_wrap_lng(Some((-180.0, 180.0)))
    }

    pub fn new(
        code: &'static str,
        projection: Arc<dyn Projection>,
        transformation: Transformation,
    ) -> Self {
        Self {
            code,
            projection,
            transformation,
            wrap_lng: None,
            wrap_lat: None,
            radius: EARTH_RADIUS,
            infinite: false,
        }
    }

    pub fn with_wrap_lng(mut self, range: Option<(f64, f64)>) -> Self {
        self.wrap_lng = range;
        self
    }

    pub fn with_wrap_lat(mut self, range: Option<(f64, f64)>) -> Self {
        self.wrap_lat = range;
        self
    }

    pub fn with_infinite(mut self, infinite: bool) -> Self {
        self.infinite = infinite;
        self
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn project(&self, point: &GeoPoint) -> PixelPoint {
        self.projection.project(point)
    }

    pub fn unproject(&self, point: &PixelPoint) -> GeoPoint {
        self.projection.unproject(point)
    }

    /// Pixel coordinate of `point` in a world that is `scale(zoom)` pixels wide
    pub fn geo_to_pixel(&self, point: &GeoPoint, zoom: f64) -> PixelPoint {
        let projected = self.project(point);
        self.transformation.transform(&projected, self.scale(zoom))
    }

    pub fn pixel_to_geo(&self, point: &PixelPoint, zoom: f64) -> GeoPoint {
        let untransformed = self.transformation.untransform(point, self.scale(zoom));
        self.unproject(&untransformed)
    }

    /// World width in pixels at `zoom`
    pub fn scale(&self, zoom: f64) -> f64 {
        TILE_SIZE as f64 * 2_f64.powf(zoom)
    }

    /// Inverse of [`Crs::scale`]
    pub fn zoom(&self, scale: f64) -> f64 {
        (scale / TILE_SIZE as f64).log2()
    }

    /// Scale factor between two zoom levels
    pub fn zoom_scale(&self, to_zoom: f64, from_zoom: f64) -> f64 {
        self.scale(to_zoom) / self.scale(from_zoom)
    }

    /// Zoom reached by scaling `from_zoom` by `scale`; `+∞` where the log is undefined
    pub fn scale_zoom(&self, scale: f64, from_zoom: f64) -> f64 {
        let zoom = self.zoom(scale * self.scale(from_zoom));
        if zoom.is_nan() {
            f64::INFINITY
        } else {
            zoom
        }
    }

    /// Pixel bounds of the whole projected world at `zoom`
    pub fn projected_bounds(&self, zoom: f64) -> Option<Bounds> {
        if self.infinite {
            return None;
        }
        let bounds = self.projection.bounds();
        let scale = self.scale(zoom);
        Some(Bounds::new(
            self.transformation.transform(&bounds.min, scale),
            self.transformation.transform(&bounds.max, scale),
        ))
    }

    /// Great-circle distance in meters using the haversine formula
    pub fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        let rad = PI / 180.0;
        let lat1 = a.lat * rad;
        let lat2 = b.lat * rad;
        let sin_d_lat = ((b.lat - a.lat) * rad / 2.0).sin();
        let sin_d_lng = ((b.lng - a.lng) * rad / 2.0).sin();
        let h = sin_d_lat * sin_d_lat + lat1.cos() * lat2.cos() * sin_d_lng * sin_d_lng;
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        self.radius * c
    }

    /// Wraps a coordinate into the CRS ranges, keeping the upper bound inclusive
    pub fn wrap_geo(&self, point: &GeoPoint) -> GeoPoint {
        let lng = match self.wrap_lng {
            Some(range) => wrap_num(point.lng, range, true),
            None => point.lng,
        };
        let lat = match self.wrap_lat {
            Some(range) => wrap_num(point.lat, range, true),
            None => point.lat,
        };
        GeoPoint {
            lat,
            lng,
            alt: point.alt,
        }
    }

    /// Shifts an area so its center lies within the wrapped ranges
    pub fn wrap_area(&self, area: &Area) -> Area {
        let center = area.center();
        let wrapped = self.wrap_geo(&center);
        let lat_shift = center.lat - wrapped.lat;
        let lng_shift = center.lng - wrapped.lng;

        if lat_shift == 0.0 && lng_shift == 0.0 {
            return *area;
        }

        let sw = area.south_west();
        let ne = area.north_east();
        Area::new(
            GeoPoint::new(sw.lat - lat_shift, sw.lng - lng_shift),
            GeoPoint::new(ne.lat - lat_shift, ne.lng - lng_shift),
        )
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crs")
            .field("code", &self.code)
            .field("transformation", &self.transformation)
            .field("wrap_lng", &self.wrap_lng)
            .field("wrap_lat", &self.wrap_lat)
            .finish()
    }
}

impl Default for Crs {
    fn default() -> Self {
        EPSG3857.clone()
    }
}

/// Wraps `x` into `[min, max)`; with `include_max` a value exactly at `max` is kept as is.
///
/// The inclusive form is what longitude wrapping uses, so `180` stays `180` instead of
/// jumping to `-180`. Tile column wrapping uses the exclusive form.
pub fn wrap_num(x: f64, range: (f64, f64), include_max: bool) -> f64 {
    let (min, max) = range;
    let d = max - min;
    if x == max && include_max {
        x
    } else {
        ((x - min) % d + d) % d + min
    }
}
