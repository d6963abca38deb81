//! Raster tile surface
//!
//! The surface works out which tiles cover the view, asks a [`TileImageSource`]
//! for the ones it lacks and draws whatever has arrived. Completions come back on
//! a channel and are drained on the map's thread at the start of each render.

use crate::core::bounds::Bounds;
use crate::constants::{DEFAULT_MAX_TILE_ZOOM, DEFAULT_SUBDOMAINS, MAX_TILE_ZOOM, TILE_SIZE};
use crate::layers::base::{Surface, SurfaceKind, SurfaceProperties};
use crate::rendering::{pipeline::RenderFrame, pipeline::RenderPipeline, surface::DrawingSurface};
use crate::tiles::{
    coord::TileCoord,
    source::{ImageHandle, TileImageSource, TileLoadEvent, TileRequest},
    template::UrlTemplate,
};
use crate::{MapError, Result};
use crossbeam_channel::{Receiver, Sender};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileOptions {
    pub url_template: String,
    pub tile_size: f64,
    pub subdomains: Vec<String>,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Added to the zoom written into tile URLs
    pub zoom_offset: i32,
    /// Leave columns outside the world empty instead of repeating it
    pub no_wrap: bool,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            url_template: String::new(),
            tile_size: TILE_SIZE as f64,
            subdomains: DEFAULT_SUBDOMAINS.chars().map(String::from).collect(),
            min_zoom: 0,
            max_zoom: DEFAULT_MAX_TILE_ZOOM,
            zoom_offset: 0,
            no_wrap: false,
        }
    }
}

impl TileOptions {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TileState {
    Loading,
    Loaded(ImageHandle),
    Failed,
}

pub struct TileSurface {
    properties: SurfaceProperties,
    options: TileOptions,
    template: UrlTemplate,
    source: Arc<dyn TileImageSource>,
    tiles: FxHashMap<TileCoord, TileState>,
    sender: Sender<TileLoadEvent>,
    receiver: Receiver<TileLoadEvent>,
}

impl TileSurface {
    /// Fails with [`MapError::Template`] on an unusable URL template and with
    /// [`MapError::Config`] on a non-positive tile size or a zoom range outside
    /// `0..=MAX_TILE_ZOOM`.
    pub fn new(
        id: impl Into<String>,
        options: TileOptions,
        source: Arc<dyn TileImageSource>,
    ) -> Result<Self> {
        let template = UrlTemplate::parse(&options.url_template).map_err(|e| {
            log::warn!("Rejected tile template '{}': {}", options.url_template, e);
            e
        })?;
        if options.tile_size.is_nan() || options.tile_size <= 0.0 {
            return Err(MapError::Config(format!(
                "tile size must be positive, got {}",
                options.tile_size
            )));
        }
        if options.max_zoom > MAX_TILE_ZOOM || options.min_zoom > options.max_zoom {
            return Err(MapError::Config(format!(
                "tile zoom range {}..={} must lie within 0..={}",
                options.min_zoom, options.max_zoom, MAX_TILE_ZOOM
            )));
        }

        let (sender, receiver) = crossbeam_channel::unbounded();
        Ok(Self {
            properties: SurfaceProperties::new(id, SurfaceKind::Tile),
            options,
            template,
            source,
            tiles: FxHashMap::default(),
            sender,
            receiver,
        })
    }

    pub fn options(&self) -> &TileOptions {
        &self.options
    }

    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }

    pub fn tile_state(&self, coord: &TileCoord) -> Option<&TileState> {
        self.tiles.get(coord)
    }

    pub fn loaded_count(&self) -> usize {
        self.count(|state| matches!(state, TileState::Loaded(_)))
    }

    pub fn pending_count(&self) -> usize {
        self.count(|state| *state == TileState::Loading)
    }

    fn count(&self, predicate: impl Fn(&TileState) -> bool) -> usize {
        self.tiles.values().filter(|state| predicate(state)).count()
    }

    /// URL for a wrapped tile, with the zoom offset applied
    pub fn tile_url(&self, coord: TileCoord, retina: bool) -> String {
        let z = (coord.z as i32 + self.options.zoom_offset).clamp(0, u8::MAX as i32) as u8;
        self.template.expand(
            TileCoord::new(coord.x, coord.y, z),
            &self.options.subdomains,
            retina,
        )
    }

    /// Applies every completion that has arrived so far; returns how many were applied
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.receiver.try_recv() {
            // Tiles pruned after a zoom change are no longer wanted
            let Some(state) = self.tiles.get_mut(&event.coord) else {
                continue;
            };
            *state = match event.result {
                Ok(image) => TileState::Loaded(image),
                Err(e) => {
                    log::warn!("Tile {} failed to load: {}", event.coord, e);
                    TileState::Failed
                }
            };
            applied += 1;
        }
        applied
    }

    /// Maps a tile of the frame's range onto the address that is loaded, if any
    fn source_coord(&self, coord: TileCoord) -> Option<TileCoord> {
        let n = coord.world_tiles();
        if !(0..n).contains(&coord.y) {
            return None;
        }
        if self.options.no_wrap {
            coord.is_valid().then_some(coord)
        } else {
            Some(coord.wrapped())
        }
    }

    fn request(&mut self, coord: TileCoord, retina: bool) {
        let url = self.tile_url(coord, retina);
        log::trace!("Requesting tile {} from {}", coord, url);
        self.tiles.insert(coord, TileState::Loading);
        self.source
            .load(TileRequest { coord, url }, self.sender.clone());
    }
}

impl Surface for TileSurface {
    fn properties(&self) -> &SurfaceProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut SurfaceProperties {
        &mut self.properties
    }

    fn render(
        &mut self,
        frame: &RenderFrame<'_>,
        pipeline: &mut RenderPipeline,
        target: &mut dyn DrawingSurface,
    ) -> Result<()> {
        self.drain_completions();

        let viewport = frame.viewport;
        let tile_zoom = viewport.tile_zoom();
        if tile_zoom < self.options.min_zoom || tile_zoom > self.options.max_zoom {
            return Ok(());
        }

        self.tiles.retain(|coord, _| coord.z == tile_zoom);

        let tile_size = self.options.tile_size;
        let range = viewport.tile_range(tile_size);
        let visible: Vec<(TileCoord, TileCoord)> = range
            .iter()
            .filter_map(|coord| self.source_coord(coord).map(|source| (coord, source)))
            .collect();

        for (_, source) in &visible {
            if !self.tiles.contains_key(source) {
                self.request(*source, frame.retina);
            }
        }
        // Sources that answer synchronously can be drawn in this same frame
        self.drain_completions();

        // Tile pixels at the tile zoom are shrunk onto the current zoom
        let scale = viewport.zoom_scale(tile_zoom as f64);
        let opacity = self.opacity();
        for (coord, source) in &visible {
            if let Some(TileState::Loaded(image)) = self.tiles.get(source) {
                let world = coord.pixel_bounds(tile_size);
                let dest = Bounds::new(
                    world.min / scale - frame.pixel_origin,
                    world.max / scale - frame.pixel_origin,
                );
                pipeline.draw_image(image, dest, opacity, target);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl std::fmt::Debug for TileSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileSurface")
            .field("properties", &self.properties)
            .field("options", &self.options)
            .field("tiles", &self.tiles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RenderOptions;
    use crate::core::{geo::GeoPoint, point::PixelPoint, viewport::Viewport};
    use crate::rendering::context::RenderContext;
    use crate::tiles::source::ImmediateTileSource;

    fn surface(options: TileOptions, source: ImmediateTileSource) -> TileSurface {
        TileSurface::new("base", options, Arc::new(source)).unwrap()
    }

    fn render(surface: &mut TileSurface, viewport: &Viewport) -> RenderContext {
        let frame = RenderFrame::new(viewport, 0.0, false);
        let mut pipeline = RenderPipeline::new(RenderOptions::default());
        let mut ctx = RenderContext::new(viewport.size().x as u32, viewport.size().y as u32);
        surface.render(&frame, &mut pipeline, &mut ctx).unwrap();
        ctx
    }

    #[test]
    fn test_rejects_bad_template() {
        let source: Arc<dyn TileImageSource> = Arc::new(ImmediateTileSource::new(256));
        let err = TileSurface::new("base", TileOptions::new("https://t/{q}.png"), source.clone());
        assert!(matches!(err, Err(MapError::Template(_))));

        let options = TileOptions {
            tile_size: 0.0,
            ..TileOptions::new("https://t/{z}/{x}/{y}.png")
        };
        assert!(matches!(TileSurface::new("base", options, source), Err(MapError::Config(_))));
    }

    #[test]
    fn test_rejects_zoom_range_past_tile_grid() {
        let source: Arc<dyn TileImageSource> = Arc::new(ImmediateTileSource::new(256));
        let template = "https://t/{z}/{x}/{y}.png";

        let deepest = TileOptions {
            max_zoom: MAX_TILE_ZOOM,
            ..TileOptions::new(template)
        };
        assert!(TileSurface::new("base", deepest, source.clone()).is_ok());

        for (min_zoom, max_zoom) in [(0, 31), (0, u8::MAX), (10, 4)] {
            let options = TileOptions {
                min_zoom,
                max_zoom,
                ..TileOptions::new(template)
            };
            assert!(matches!(
                TileSurface::new("base", options, source.clone()),
                Err(MapError::Config(_))
            ));
        }
    }

    #[test]
    fn test_renders_visible_tiles() {
        let mut tiles = surface(
            TileOptions::new("https://tile.test/{z}/{x}/{y}.png"),
            ImmediateTileSource::new(256),
        );
        let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 1.0, PixelPoint::new(512.0, 512.0));
        let ctx = render(&mut tiles, &viewport);

        assert_eq!(tiles.loaded_count(), 4);
        assert_eq!(ctx.images().len(), 4);
        let first = &ctx.images()[0];
        assert_eq!(first.dest, Bounds::from_coords(0.0, 0.0, 256.0, 256.0));
    }

    #[test]
    fn test_wraps_columns_and_skips_rows() {
        let mut tiles = surface(
            TileOptions::new("https://tile.test/{z}/{x}/{y}.png"),
            ImmediateTileSource::new(256),
        );
        // Zoom 0 world is one tile; a wide view sees it repeated
        let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 0.0, PixelPoint::new(768.0, 512.0));
        let ctx = render(&mut tiles, &viewport);

        assert_eq!(tiles.loaded_count(), 1);
        assert_eq!(ctx.images().len(), 3);
        assert!(ctx.images().iter().all(|image| image.image == ctx.images()[0].image));

        let mut no_wrap = surface(
            TileOptions {
                no_wrap: true,
                ..TileOptions::new("https://tile.test/{z}/{x}/{y}.png")
            },
            ImmediateTileSource::new(256),
        );
        let ctx = render(&mut no_wrap, &viewport);
        assert_eq!(ctx.images().len(), 1);
    }

    #[test]
    fn test_failed_tiles_are_not_drawn() {
        let mut tiles = surface(
            TileOptions::new("https://tile.test/{z}/{x}/{y}.png"),
            ImmediateTileSource::new(256).with_missing(vec![TileCoord::new(0, 0, 1)]),
        );
        let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 1.0, PixelPoint::new(512.0, 512.0));
        let ctx = render(&mut tiles, &viewport);

        assert_eq!(tiles.tile_state(&TileCoord::new(0, 0, 1)), Some(&TileState::Failed));
        assert_eq!(ctx.images().len(), 3);

        // Failures are not retried
        render(&mut tiles, &viewport);
        assert_eq!(tiles.loaded_count(), 3);
    }

    #[test]
    fn test_zoom_limits_and_offset() {
        let mut tiles = surface(
            TileOptions {
                min_zoom: 2,
                zoom_offset: 1,
                ..TileOptions::new("https://tile.test/{z}/{x}/{y}.png")
            },
            ImmediateTileSource::new(256),
        );
        let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 1.0, PixelPoint::new(512.0, 512.0));
        let ctx = render(&mut tiles, &viewport);
        assert!(ctx.images().is_empty());
        assert_eq!(tiles.loaded_count(), 0);

        assert_eq!(
            tiles.tile_url(TileCoord::new(1, 2, 3), false),
            "https://tile.test/4/1/2.png"
        );
    }

    #[test]
    fn test_late_completions_after_zoom_change_are_dropped() {
        let (tx, rx) = crossbeam_channel::unbounded::<TileRequest>();
        let source = move |request: TileRequest, _completions: Sender<TileLoadEvent>| {
            let _ = tx.send(request);
        };
        let mut tiles = TileSurface::new(
            "base",
            TileOptions::new("https://tile.test/{z}/{x}/{y}.png"),
            Arc::new(source),
        )
        .unwrap();

        let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 1.0, PixelPoint::new(512.0, 512.0));
        render(&mut tiles, &viewport);
        assert_eq!(tiles.pending_count(), 4);
        assert_eq!(rx.try_iter().count(), 4);

        let zoomed = Viewport::new(GeoPoint::new(0.0, 0.0), 2.0, PixelPoint::new(512.0, 512.0));
        render(&mut tiles, &zoomed);
        tiles
            .sender
            .send(TileLoadEvent::loaded(TileCoord::new(0, 0, 1), ImageHandle::new(9, 256, 256)))
            .unwrap();
        assert_eq!(tiles.drain_completions(), 0);
        assert!(tiles.tile_state(&TileCoord::new(0, 0, 1)).is_none());
    }
}
