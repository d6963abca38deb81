//! Map builder for fluent API configuration
//!
//! This module provides a MapBuilder that assembles map options, animation
//! profiles, the host ports (frame scheduler, size source) and the initial
//! surface stack before creating a [`Map`].

use crate::{
    animation::FrameScheduler,
    core::{
        config::{AnimationProfile, Capabilities, MapOptions, RenderOptions},
        geo::GeoPoint,
        map::{Map, SizeSource},
        point::PixelPoint,
    },
    layers::{
        base::Surface,
        tile::{TileOptions, TileSurface},
    },
    tiles::source::TileImageSource,
    Result,
};
use std::sync::Arc;

/// Id of the tile surface added by [`MapBuilder::with_tile_source`]
pub const BASE_TILES_ID: &str = "base_tiles";

/// Builder for creating and configuring Map instances
pub struct MapBuilder {
    options: MapOptions,
    size: PixelPoint,
    scheduler: Option<Box<dyn FrameScheduler>>,
    size_source: Option<Box<dyn SizeSource>>,
    /// Base tile layer, built last so its template is validated with the map
    tile_source: Option<(TileOptions, Arc<dyn TileImageSource>)>,
    surfaces: Vec<Box<dyn Surface>>,
}

impl MapBuilder {
    /// Create a new MapBuilder with default settings
    pub fn new() -> Self {
        Self {
            options: MapOptions::default(),
            size: PixelPoint::ZERO,
            scheduler: None,
            size_source: None,
            tile_source: None,
            surfaces: Vec::new(),
        }
    }

    /// Starts from options read from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new().with_options(MapOptions::from_json_str(json)?))
    }

    pub fn with_options(mut self, options: MapOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the initial center, zoom and container size
    pub fn with_center_and_zoom(mut self, center: GeoPoint, zoom: f64, size: PixelPoint) -> Self {
        self.options.center = center;
        self.options.zoom = zoom;
        self.size = size;
        self
    }

    pub fn with_size(mut self, size: PixelPoint) -> Self {
        self.size = size;
        self
    }

    /// Set zoom limits
    pub fn with_zoom_limits(mut self, min_zoom: Option<f64>, max_zoom: Option<f64>) -> Self {
        self.options.min_zoom = min_zoom;
        self.options.max_zoom = max_zoom;
        self
    }

    /// Set zoom snap and delta values
    pub fn with_zoom_behavior(mut self, snap: Option<f64>, delta: f64) -> Self {
        self.options.zoom_snap = snap;
        self.options.zoom_delta = delta;
        self
    }

    /// Set the animation profile
    pub fn with_animation(mut self, profile: AnimationProfile) -> Self {
        self.options = self.options.with_profile(profile);
        self
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.options.render = render;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.options.capabilities = capabilities;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Box<dyn FrameScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_size_source(mut self, source: Box<dyn SizeSource>) -> Self {
        self.size_source = Some(source);
        self
    }

    /// Adds a base tile surface, drawn below everything else
    pub fn with_tile_source(
        mut self,
        options: TileOptions,
        source: Arc<dyn TileImageSource>,
    ) -> Self {
        self.tile_source = Some((options, source));
        self
    }

    pub fn with_surface(mut self, surface: Box<dyn Surface>) -> Self {
        self.surfaces.push(surface);
        self
    }

    pub fn build(self) -> Result<Map> {
        let size = match &self.size_source {
            Some(source) => source.size(),
            None => self.size,
        };

        let mut map = Map::new(self.options, size)?;
        if let Some(scheduler) = self.scheduler {
            map.set_scheduler(Some(scheduler));
        }
        if let Some(source) = self.size_source {
            map.set_size_source(source);
        }

        if let Some((options, source)) = self.tile_source {
            let mut tiles = TileSurface::new(BASE_TILES_ID, options, source)?;
            tiles.properties_mut().name = "Base Map Tiles".to_string();
            tiles.set_z_index(i32::MIN);
            map.add_surface(Box::new(tiles));
        }
        for surface in self.surfaces {
            map.add_surface(surface);
        }

        Ok(map)
    }
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience methods for common map configurations
impl MapBuilder {
    /// Create a web map with smooth animations
    pub fn web_map(center: GeoPoint, zoom: f64, size: PixelPoint) -> Self {
        Self::new()
            .with_center_and_zoom(center, zoom, size)
            .with_animation(AnimationProfile::Smooth)
    }

    /// Create a map whose view changes are always applied at once
    pub fn minimal_map(center: GeoPoint, zoom: f64, size: PixelPoint) -> Self {
        Self::new()
            .with_center_and_zoom(center, zoom, size)
            .with_animation(AnimationProfile::Disabled)
    }

    /// Create a map for high-density displays with quick animations
    pub fn retina_map(center: GeoPoint, zoom: f64, size: PixelPoint) -> Self {
        Self::new()
            .with_center_and_zoom(center, zoom, size)
            .with_animation(AnimationProfile::Snappy)
            .with_capabilities(Capabilities {
                any3d: true,
                retina: true,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ManualScheduler;
    use crate::layers::vector::VectorSurface;
    use crate::tiles::source::ImmediateTileSource;
    use crate::MapError;

    #[test]
    fn test_map_builder_basic() {
        let center = GeoPoint::new(40.7128, -74.0060); // New York
        let map = MapBuilder::web_map(center, 10.0, PixelPoint::new(800.0, 600.0))
            .build()
            .unwrap();

        assert_eq!(map.center(), center);
        assert_eq!(map.zoom(), 10.0);
        assert_eq!(map.size(), PixelPoint::new(800.0, 600.0));
        assert!(map.options().animation.enabled);
    }

    #[test]
    fn test_minimal_map_preset() {
        let map = MapBuilder::minimal_map(GeoPoint::new(0.0, 0.0), 3.0, PixelPoint::new(256.0, 256.0))
            .with_scheduler(Box::new(ManualScheduler::new()))
            .build()
            .unwrap();
        assert!(!map.options().animation.enabled);
    }

    #[test]
    fn test_surfaces_are_stacked_over_base_tiles() {
        let source: Arc<dyn TileImageSource> = Arc::new(ImmediateTileSource::new(256));
        let map = MapBuilder::new()
            .with_size(PixelPoint::new(512.0, 512.0))
            .with_surface(Box::new(VectorSurface::new("overlay")))
            .with_tile_source(TileOptions::new("https://{s}.tile.test/{z}/{x}/{y}.png"), source)
            .build()
            .unwrap();

        assert_eq!(map.surfaces().ids(), &[BASE_TILES_ID, "overlay"]);
    }

    #[test]
    fn test_invalid_configuration_fails_to_build() {
        let source: Arc<dyn TileImageSource> = Arc::new(ImmediateTileSource::new(256));
        let result = MapBuilder::new()
            .with_tile_source(TileOptions::new("https://tile.test/{zoom}.png"), source)
            .build();
        assert!(matches!(result, Err(MapError::Template(_))));

        let result = MapBuilder::new()
            .with_zoom_limits(Some(8.0), Some(4.0))
            .build();
        assert!(matches!(result, Err(MapError::Config(_))));

        assert!(MapBuilder::from_json_str(r#"{"zoom": 4, "zoom_delta": 0.5}"#).is_ok());
        assert!(MapBuilder::from_json_str(r#"{"zoom": "high"}"#).is_err());
    }
}
