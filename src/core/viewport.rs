use crate::core::constants::{DEFAULT_ZOOM, EARTH_CIRCUMFERENCE};
use crate::core::{area::Area, bounds::Bounds, geo::GeoPoint, point::PixelPoint};
use crate::projection::crs::{Crs, EPSG3857};
use crate::tiles::coord::TileRange;
use serde::{Deserialize, Serialize};

/// Target of a view change; `None` fields keep their current value.
///
/// Zoom `0.0` is a real target, so absence is modelled with `Option` rather than
/// a sentinel value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigateTo {
    pub center: Option<GeoPoint>,
    pub zoom: Option<f64>,
}

impl NavigateTo {
    pub fn new(center: GeoPoint, zoom: f64) -> Self {
        Self {
            center: Some(center),
            zoom: Some(zoom),
        }
    }

    pub fn center(center: GeoPoint) -> Self {
        Self {
            center: Some(center),
            zoom: None,
        }
    }

    pub fn zoom(zoom: f64) -> Self {
        Self {
            center: None,
            zoom: Some(zoom),
        }
    }
}

/// Padding and zoom cap applied when fitting an area into the view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub padding_top_left: PixelPoint,
    pub padding_bottom_right: PixelPoint,
    pub max_zoom: Option<f64>,
}

impl FitOptions {
    /// Same padding on every side
    pub fn padding(padding: f64) -> Self {
        let p = PixelPoint::new(padding, padding);
        Self {
            padding_top_left: p,
            padding_bottom_right: p,
            max_zoom: None,
        }
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::padding(0.0)
    }
}

/// Manages the current view of the map: center, zoom, and screen dimensions
///
/// Every derived value (pixel origin, visible area, tile range) is computed on
/// demand from those three, so the viewport can never hold a stale origin.
#[derive(Debug, Clone)]
pub struct Viewport {
    center: GeoPoint,
    zoom: f64,
    size: PixelPoint,
    min_zoom: Option<f64>,
    max_zoom: Option<f64>,
    zoom_snap: Option<f64>,
    crs: Crs,
}

impl Viewport {
    /// Creates a new viewport on the Web Mercator CRS
    pub fn new(center: GeoPoint, zoom: f64, size: PixelPoint) -> Self {
        Self {
            center,
            zoom,
            size,
            min_zoom: None,
            max_zoom: None,
            zoom_snap: None,
            crs: EPSG3857.clone(),
        }
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    pub fn with_zoom_limits(mut self, min_zoom: Option<f64>, max_zoom: Option<f64>) -> Self {
        self.set_zoom_limits(min_zoom, max_zoom);
        self
    }

    pub fn with_zoom_snap(mut self, zoom_snap: Option<f64>) -> Self {
        self.zoom_snap = zoom_snap.filter(|snap| *snap > 0.0);
        self
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn size(&self) -> PixelPoint {
        self.size
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn min_zoom(&self) -> Option<f64> {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> Option<f64> {
        self.max_zoom
    }

    /// Sets the zoom limits; the current zoom is pulled inside them
    pub fn set_zoom_limits(&mut self, min_zoom: Option<f64>, max_zoom: Option<f64>) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.limit_zoom(self.zoom);
    }

    /// Clamps `zoom` to whichever limits are configured
    pub fn limit_zoom(&self, zoom: f64) -> f64 {
        let mut zoom = zoom;
        if let Some(max) = self.max_zoom {
            zoom = zoom.min(max);
        }
        if let Some(min) = self.min_zoom {
            zoom = zoom.max(min);
        }
        zoom
    }

    /// Moves the camera. Returns `true` if the zoom level changed.
    pub fn navigate_to(&mut self, target: NavigateTo) -> bool {
        if let Some(center) = target.center {
            self.center = center;
        }
        let previous = self.zoom;
        if let Some(zoom) = target.zoom {
            self.zoom = self.limit_zoom(zoom);
        }
        previous != self.zoom
    }

    pub fn zoom_in(&mut self, delta: f64) -> bool {
        self.navigate_to(NavigateTo::zoom(self.zoom + delta))
    }

    pub fn zoom_out(&mut self, delta: f64) -> bool {
        self.navigate_to(NavigateTo::zoom(self.zoom - delta))
    }

    /// Shifts the center by a screen offset at the current zoom
    pub fn pan_by(&mut self, offset: PixelPoint) {
        let center = self.panned_center(offset);
        self.navigate_to(NavigateTo::center(center));
    }

    /// Center the map would have after panning by `offset`
    pub fn panned_center(&self, offset: PixelPoint) -> GeoPoint {
        let pixel = self.project(&self.center) + offset;
        self.unproject(&pixel)
    }

    /// Sets the container size, keeping the geographic center
    pub fn resize(&mut self, size: PixelPoint) {
        self.size = size;
    }

    /// Projects at the current zoom
    pub fn project(&self, point: &GeoPoint) -> PixelPoint {
        self.crs.geo_to_pixel(point, self.zoom)
    }

    pub fn project_at(&self, point: &GeoPoint, zoom: f64) -> PixelPoint {
        self.crs.geo_to_pixel(point, zoom)
    }

    pub fn unproject(&self, point: &PixelPoint) -> GeoPoint {
        self.crs.pixel_to_geo(point, self.zoom)
    }

    pub fn unproject_at(&self, point: &PixelPoint, zoom: f64) -> GeoPoint {
        self.crs.pixel_to_geo(point, zoom)
    }

    pub fn zoom_scale(&self, to_zoom: f64) -> f64 {
        self.crs.zoom_scale(to_zoom, self.zoom)
    }

    pub fn scale_zoom(&self, scale: f64) -> f64 {
        self.crs.scale_zoom(scale, self.zoom)
    }

    /// World pixel of the container's top-left corner, rounded to whole pixels
    pub fn pixel_origin(&self) -> PixelPoint {
        self.pixel_origin_for(&self.center, self.zoom)
    }

    pub fn pixel_origin_for(&self, center: &GeoPoint, zoom: f64) -> PixelPoint {
        (self.project_at(center, zoom) - self.size / 2.0).round()
    }

    /// Container rectangle in container pixels: `[0, 0]` to `size`
    pub fn pixel_bounds(&self) -> Bounds {
        Bounds::new(PixelPoint::ZERO, self.size)
    }

    /// Container rectangle in world pixels at the current zoom
    pub fn world_pixel_bounds(&self) -> Bounds {
        let origin = self.pixel_origin();
        Bounds::new(origin, origin + self.size)
    }

    /// Pixel bounds of the whole world at the current zoom
    pub fn projected_world_bounds(&self) -> Option<Bounds> {
        self.crs.projected_bounds(self.zoom)
    }

    /// Converts a coordinate to a point relative to the pixel origin
    pub fn geo_to_layer_point(&self, point: &GeoPoint) -> PixelPoint {
        self.project(point).round() - self.pixel_origin()
    }

    pub fn layer_point_to_geo(&self, point: &PixelPoint) -> GeoPoint {
        self.unproject(&(*point + self.pixel_origin()))
    }

    /// Converts a coordinate to a point relative to the container's top-left corner.
    ///
    /// Unlike layer points this uses the exact (unrounded) corner, so the container
    /// center always maps back to the geographic center.
    pub fn geo_to_container_point(&self, point: &GeoPoint) -> PixelPoint {
        self.project(point) - self.top_left()
    }

    pub fn container_point_to_geo(&self, point: &PixelPoint) -> GeoPoint {
        self.unproject(&(*point + self.top_left()))
    }

    /// Shifts a container point into layer space (differs by the origin's sub-pixel rounding)
    pub fn container_point_to_layer_point(&self, point: PixelPoint) -> PixelPoint {
        point + self.top_left() - self.pixel_origin()
    }

    fn top_left(&self) -> PixelPoint {
        self.project(&self.center) - self.size / 2.0
    }

    /// Geographic area currently visible
    pub fn bounds(&self) -> Area {
        let bounds = self.world_pixel_bounds();
        Area::new(
            self.unproject(&bounds.bottom_left()),
            self.unproject(&bounds.top_right()),
        )
    }

    /// Zoom at which `area` fits the container shrunk by `padding`.
    ///
    /// With `inside` the area instead covers the whole container. Snapping uses the
    /// configured zoom snap, and the result is clamped to the zoom limits.
    pub fn bounds_zoom(&self, area: &Area, inside: bool, padding: PixelPoint) -> f64 {
        let zoom = self.zoom;
        let size = self.size - padding;
        let bounds_size = Bounds::new(
            self.project_at(&area.south_east(), zoom),
            self.project_at(&area.north_west(), zoom),
        )
        .size();

        let scale_x = size.x / bounds_size.x;
        let scale_y = size.y / bounds_size.y;
        let scale = if inside {
            scale_x.max(scale_y)
        } else {
            scale_x.min(scale_y)
        };

        let mut zoom = self.crs.scale_zoom(scale, zoom);
        if let Some(snap) = self.zoom_snap {
            zoom = (zoom / (snap / 100.0)).round() * (snap / 100.0);
            zoom = if inside {
                (zoom / snap).ceil() * snap
            } else {
                (zoom / snap).floor() * snap
            };
        }
        self.limit_zoom(zoom)
    }

    /// Center and zoom that fit `area` into the view.
    ///
    /// A degenerate area (a single point) or an empty container yields an infinite
    /// fit zoom; in that case the current zoom is kept and only the center moves.
    pub fn center_zoom_for(&self, area: &Area, options: &FitOptions) -> (GeoPoint, f64) {
        let padding_tl = options.padding_top_left;
        let padding_br = options.padding_bottom_right;
        let mut zoom = self.bounds_zoom(area, false, padding_tl + padding_br);
        if let Some(max) = options.max_zoom {
            zoom = zoom.min(max);
        }

        if !zoom.is_finite() {
            return (area.center(), self.zoom);
        }

        let padding_offset = (padding_br - padding_tl) / 2.0;
        let sw = self.project_at(&area.south_west(), zoom);
        let ne = self.project_at(&area.north_east(), zoom);
        let center = self.unproject_at(&((sw + ne) / 2.0 + padding_offset), zoom);
        (center, zoom)
    }

    /// Center that keeps `container_point` fixed on screen when zooming to `zoom`
    pub fn center_for_zoom_around(&self, container_point: PixelPoint, zoom: f64) -> GeoPoint {
        let scale = self.zoom_scale(zoom);
        let view_half = self.size / 2.0;
        let center_offset = (container_point - view_half) * (1.0 - 1.0 / scale);
        self.container_point_to_geo(&(view_half + center_offset))
    }

    /// Zooms while keeping `container_point` fixed on screen
    pub fn set_zoom_around(&mut self, container_point: PixelPoint, zoom: f64) -> bool {
        let zoom = self.limit_zoom(zoom);
        let center = self.center_for_zoom_around(container_point, zoom);
        self.navigate_to(NavigateTo::new(center, zoom))
    }

    /// Integer zoom used to pick tiles
    pub fn tile_zoom(&self) -> u8 {
        self.zoom.round().clamp(0.0, u8::MAX as f64) as u8
    }

    /// Tiles covering the container at [`Viewport::tile_zoom`].
    ///
    /// At an integer zoom this is the range around the pixel origin; at a
    /// fractional zoom the container rectangle is rescaled onto the tile grid first.
    pub fn tile_range(&self, tile_size: f64) -> TileRange {
        let tile_zoom = self.tile_zoom();
        let scale = self.zoom_scale(tile_zoom as f64);
        let origin = self.pixel_origin() * scale;
        let size = self.size * scale;
        TileRange::from_pixel_bounds(origin, size, tile_size, tile_zoom)
    }

    /// Meters per pixel at the equator at the current zoom
    pub fn resolution(&self) -> f64 {
        EARTH_CIRCUMFERENCE / self.crs.scale(self.zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(GeoPoint::default(), DEFAULT_ZOOM, PixelPoint::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::TILE_SIZE;

    fn viewport() -> Viewport {
        Viewport::new(GeoPoint::new(0.0, 0.0), 1.0, PixelPoint::new(512.0, 512.0))
    }

    #[test]
    fn test_viewport_defaults() {
        let viewport = Viewport::default();
        assert_eq!(viewport.center(), GeoPoint::new(0.0, 0.0));
        assert_eq!(viewport.zoom(), 1.0);
        assert_eq!(viewport.min_zoom(), None);
    }

    #[test]
    fn test_pixel_origin_and_tile_range() {
        let viewport = viewport();
        assert_eq!(viewport.pixel_origin(), PixelPoint::ZERO);
        assert_eq!(
            viewport.pixel_bounds(),
            Bounds::from_coords(0.0, 0.0, 512.0, 512.0)
        );

        let range = viewport.tile_range(TILE_SIZE as f64);
        assert_eq!(range.z, 1);
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn test_pan_by_zero_keeps_center() {
        let mut viewport = Viewport::new(
            GeoPoint::new(48.8566, 2.3522),
            12.0,
            PixelPoint::new(800.0, 600.0),
        );
        let before = viewport.center();
        viewport.pan_by(PixelPoint::ZERO);
        assert!(viewport.center().equals(&before, 1e-9));
    }

    #[test]
    fn test_pan_by_moves_pixel_origin() {
        let mut viewport = viewport();
        viewport.pan_by(PixelPoint::new(100.0, -50.0));
        assert_eq!(viewport.pixel_origin(), PixelPoint::new(100.0, -50.0));
    }

    #[test]
    fn test_zoom_is_additive_and_unclamped_by_default() {
        let mut viewport = viewport();
        assert!(viewport.zoom_in(1.0));
        assert_eq!(viewport.zoom(), 2.0);
        viewport.zoom_out(5.0);
        assert_eq!(viewport.zoom(), -3.0);
    }

    #[test]
    fn test_zoom_limits_clamp() {
        let mut viewport = viewport().with_zoom_limits(Some(2.0), Some(15.0));
        assert_eq!(viewport.zoom(), 2.0);

        viewport.navigate_to(NavigateTo::zoom(20.0));
        assert_eq!(viewport.zoom(), 15.0);
        viewport.navigate_to(NavigateTo::zoom(1.0));
        assert_eq!(viewport.zoom(), 2.0);
    }

    #[test]
    fn test_navigate_to_zero_zoom() {
        let mut viewport = viewport();
        assert!(viewport.navigate_to(NavigateTo::zoom(0.0)));
        assert_eq!(viewport.zoom(), 0.0);
        assert!(!viewport.navigate_to(NavigateTo::default()));
    }

    #[test]
    fn test_container_center_maps_to_center() {
        let viewport = Viewport::new(
            GeoPoint::new(40.7128, -74.006),
            10.3,
            PixelPoint::new(801.0, 601.0),
        );
        let center = viewport.container_point_to_geo(&(viewport.size() / 2.0));
        assert!(center.equals(&viewport.center(), 1e-9));
    }

    #[test]
    fn test_visible_bounds_contain_center() {
        let viewport = Viewport::new(
            GeoPoint::new(51.5, -0.12),
            8.0,
            PixelPoint::new(800.0, 600.0),
        );
        let bounds = viewport.bounds();
        assert!(bounds.is_valid());
        assert!(bounds.contains(&viewport.center()));
    }

    #[test]
    fn test_fit_world() {
        let viewport = viewport();
        let (center, zoom) = viewport.center_zoom_for(&Area::world(), &FitOptions::default());
        assert!((zoom - 1.0).abs() < 1e-9);
        assert!(center.equals(&GeoPoint::new(0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_fit_single_point_keeps_zoom() {
        let viewport = viewport();
        let point = GeoPoint::new(10.0, 10.0);
        let (center, zoom) =
            viewport.center_zoom_for(&Area::new(point, point), &FitOptions::default());
        assert_eq!(zoom, 1.0);
        assert_eq!(center, point);
    }

    #[test]
    fn test_zoom_snap_floors_fit() {
        let viewport = viewport().with_zoom_snap(Some(1.0));
        let area = Area::from_coords(-10.0, -10.0, 10.0, 10.0);
        let zoom = viewport.bounds_zoom(&area, false, PixelPoint::ZERO);
        assert_eq!(zoom.fract(), 0.0);
    }

    #[test]
    fn test_set_zoom_around_keeps_point_fixed() {
        let mut viewport = Viewport::new(
            GeoPoint::new(20.0, 30.0),
            5.0,
            PixelPoint::new(800.0, 600.0),
        );
        let anchor = PixelPoint::new(100.0, 150.0);
        let geo = viewport.container_point_to_geo(&anchor);

        viewport.set_zoom_around(anchor, 7.0);
        let after = viewport.geo_to_container_point(&geo);
        assert!((after.x - anchor.x).abs() < 1e-6);
        assert!((after.y - anchor.y).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_zoom_tile_range() {
        let viewport = Viewport::new(
            GeoPoint::new(0.0, 0.0),
            1.4,
            PixelPoint::new(256.0, 256.0),
        );
        let range = viewport.tile_range(TILE_SIZE as f64);
        assert_eq!(range.z, 1);
        assert_eq!(range.len(), 4);
    }
}
