use crate::animation::{
    AnimationState, AnimationStep, Animator, FlyPath, FrameScheduler, PanSession, SessionEnd,
};
use crate::core::{
    area::Area,
    bounds::Bounds,
    config::MapOptions,
    geo::GeoPoint,
    point::PixelPoint,
    viewport::{FitOptions, NavigateTo, Viewport},
};
use crate::data::feature::FeatureId;
use crate::layers::{base::Surface, manager::SurfaceManager};
use crate::rendering::{pipeline::RenderPipeline, pipeline::RenderStats, surface::DrawingSurface};
use crate::spatial::index::Propagation;
use crate::{MapError, Result};

/// Notifications queued by the map, read with [`Map::drain_events`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    MoveStart,
    Move { center: GeoPoint, zoom: f64 },
    MoveEnd { center: GeoPoint },
    ZoomStart,
    Zoom { zoom: f64 },
    ZoomEnd { zoom: f64 },
    /// The view was set without animation
    ViewReset,
    Resize {
        old_size: PixelPoint,
        new_size: PixelPoint,
    },
}

impl MapEvent {
    /// Per-frame camera updates, as opposed to lifecycle events
    pub fn is_progress(&self) -> bool {
        matches!(self, MapEvent::Move { .. } | MapEvent::Zoom { .. })
    }
}

/// Supplies the current size of whatever the map is displayed in
pub trait SizeSource {
    fn size(&self) -> PixelPoint;
}

impl<F> SizeSource for F
where
    F: Fn() -> PixelPoint,
{
    fn size(&self) -> PixelPoint {
        self()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanOptions {
    /// `Some(true)` always animates, `Some(false)` never does. `None` animates
    /// only offsets that stay within the container.
    pub animate: Option<bool>,
    pub duration_secs: Option<f64>,
    pub ease_linearity: Option<f64>,
    /// Skip the `MoveStart` event
    pub no_move_start: bool,
}

impl PanOptions {
    pub fn animated() -> Self {
        Self {
            animate: Some(true),
            ..Self::default()
        }
    }

    pub fn instant() -> Self {
        Self {
            animate: Some(false),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyOptions {
    pub animate: bool,
    /// Fixed flight duration; zero or unset falls back to the configured one, then
    /// to the path length
    pub duration_secs: Option<f64>,
    pub no_move_start: bool,
}

impl Default for FlyOptions {
    fn default() -> Self {
        Self {
            animate: true,
            duration_secs: None,
            no_move_start: false,
        }
    }
}

/// The map engine: camera, animations, surfaces and the event queue.
///
/// Nothing here blocks. Animated requests ask the [`FrameScheduler`] for a frame and
/// advance when the host calls [`Map::on_frame`]; without a scheduler they apply at once.
pub struct Map {
    options: MapOptions,
    viewport: Viewport,
    animator: Animator,
    scheduler: Option<Box<dyn FrameScheduler>>,
    size_source: Option<Box<dyn SizeSource>>,
    surfaces: SurfaceManager,
    pipeline: RenderPipeline,
    events: Vec<MapEvent>,
}

impl Map {
    pub fn new(options: MapOptions, size: PixelPoint) -> Result<Self> {
        options.validate()?;
        check_point(&options.center)?;

        let viewport = Viewport::new(options.center, options.zoom, size)
            .with_zoom_limits(options.min_zoom, options.max_zoom)
            .with_zoom_snap(options.zoom_snap);
        let pipeline = RenderPipeline::new(options.render.clone());

        let mut map = Self {
            options,
            viewport,
            animator: Animator::new(),
            scheduler: None,
            size_source: None,
            surfaces: SurfaceManager::new(),
            pipeline,
            events: Vec::new(),
        };
        let zoom = map.limit_zoom(map.viewport.zoom());
        map.viewport.navigate_to(NavigateTo::zoom(zoom));

        log::debug!(
            "Created map at {} zoom {} ({})",
            map.viewport.center(),
            map.viewport.zoom(),
            map.viewport.size()
        );
        Ok(map)
    }

    pub fn with_scheduler(mut self, scheduler: Box<dyn FrameScheduler>) -> Self {
        self.set_scheduler(Some(scheduler));
        self
    }

    /// Replaces the frame scheduler; a running animation is stopped first
    pub fn set_scheduler(&mut self, scheduler: Option<Box<dyn FrameScheduler>>) {
        self.stop();
        self.scheduler = scheduler;
    }

    pub fn set_size_source(&mut self, source: Box<dyn SizeSource>) {
        self.size_source = Some(source);
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn center(&self) -> GeoPoint {
        self.viewport.center()
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn size(&self) -> PixelPoint {
        self.viewport.size()
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animator.state()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    // View changes

    /// Moves the camera without animation, keeping whichever of center and zoom is unset
    pub fn navigate_to(&mut self, target: NavigateTo) -> Result<()> {
        let center = target.center.unwrap_or_else(|| self.center());
        check_point(&center)?;
        let zoom = target.zoom.unwrap_or_else(|| self.zoom());
        check_zoom(zoom)?;

        self.stop();
        self.reset_view(center, zoom, false);
        Ok(())
    }

    /// Sets center and zoom. A pure center change within the container is panned
    /// (animated when allowed); anything else resets the view.
    pub fn set_view(&mut self, center: GeoPoint, zoom: Option<f64>, options: PanOptions) -> Result<()> {
        check_point(&center)?;
        let zoom = match zoom {
            Some(zoom) => {
                check_zoom(zoom)?;
                self.limit_zoom(zoom)
            }
            None => self.zoom(),
        };

        self.stop();
        if zoom == self.zoom() && self.try_pan(center, options) {
            return Ok(());
        }
        self.reset_view(center, zoom, options.no_move_start);
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<()> {
        self.set_view(self.center(), Some(zoom), PanOptions::default())
    }

    /// Zooms in by `delta`, or by the configured zoom delta
    pub fn zoom_in(&mut self, delta: Option<f64>) -> Result<()> {
        let delta = delta.unwrap_or_else(|| self.default_zoom_delta());
        self.set_zoom(self.zoom() + delta)
    }

    pub fn zoom_out(&mut self, delta: Option<f64>) -> Result<()> {
        let delta = delta.unwrap_or_else(|| self.default_zoom_delta());
        self.set_zoom(self.zoom() - delta)
    }

    /// Zooms keeping `container_point` fixed on screen
    pub fn set_zoom_around(&mut self, container_point: PixelPoint, zoom: f64) -> Result<()> {
        check_offset(&container_point)?;
        check_zoom(zoom)?;
        let center = self.viewport.center_for_zoom_around(container_point, zoom);
        self.set_view(center, Some(zoom), PanOptions::default())
    }

    /// Zooms keeping `point` at its current screen position
    pub fn set_zoom_around_geo(&mut self, point: GeoPoint, zoom: f64) -> Result<()> {
        check_point(&point)?;
        let container_point = self.viewport.geo_to_container_point(&point);
        self.set_zoom_around(container_point, zoom)
    }

    pub fn pan_to(&mut self, center: GeoPoint, options: PanOptions) -> Result<()> {
        self.set_view(center, None, options)
    }

    /// Pans by a container pixel offset, rounded to whole pixels.
    ///
    /// A zero offset only reports `MoveEnd`. Unless `animate` is forced, an offset
    /// larger than the container resets the view instead of panning.
    pub fn pan_by(&mut self, offset: PixelPoint, options: PanOptions) -> Result<()> {
        check_offset(&offset)?;
        self.pan(offset, options);
        Ok(())
    }

    fn pan(&mut self, offset: PixelPoint, options: PanOptions) {
        let offset = offset.round();
        self.stop();

        if offset.is_zero() {
            self.emit(MapEvent::MoveEnd {
                center: self.center(),
            });
            return;
        }

        if options.animate != Some(true) && !self.size().contains(&offset) {
            let center = self.viewport.panned_center(offset);
            self.reset_view(center, self.zoom(), false);
            return;
        }

        if !options.no_move_start {
            self.emit(MapEvent::MoveStart);
        }

        if options.animate != Some(false) && self.can_animate() {
            let animation = &self.options.animation;
            let session = PanSession::new(
                self.viewport.project(&self.center()),
                offset,
                self.zoom(),
                options.duration_secs.unwrap_or(animation.pan_duration_secs),
                options.ease_linearity.unwrap_or(animation.ease_linearity),
                self.now(),
            );
            if let Some(scheduler) = self.scheduler.as_deref_mut() {
                self.animator.start_pan(session, scheduler);
            }
        } else {
            self.viewport.pan_by(offset);
            self.emit_move();
            self.emit(MapEvent::MoveEnd {
                center: self.center(),
            });
        }
    }

    /// Flies along a zoom-out, pan, zoom-in curve to `center` at `zoom`
    pub fn fly_to(&mut self, center: GeoPoint, zoom: Option<f64>, options: FlyOptions) -> Result<()> {
        check_point(&center)?;
        if let Some(zoom) = zoom {
            check_zoom(zoom)?;
        }
        if !options.animate || !self.can_animate() {
            return self.set_view(center, zoom, PanOptions::instant());
        }

        self.stop();
        let start_zoom = self.zoom();
        let target_zoom = zoom.map_or(start_zoom, |zoom| self.limit_zoom(zoom));
        let duration = options
            .duration_secs
            .filter(|secs| *secs > 0.0)
            .or(self.options.animation.fly_duration_secs);

        let path = FlyPath::new(
            self.viewport.crs(),
            &self.center(),
            start_zoom,
            center,
            target_zoom,
            self.size(),
            duration,
            self.now(),
        );
        let Some(path) = path else {
            log::debug!("Degenerate flight to {}, jumping instead", center);
            self.reset_view(center, target_zoom, options.no_move_start);
            return Ok(());
        };

        self.move_start(target_zoom != start_zoom, options.no_move_start);
        if let Some(scheduler) = self.scheduler.as_deref_mut() {
            self.animator.start_fly(path, scheduler);
        }
        Ok(())
    }

    pub fn fly_to_bounds(&mut self, area: &Area, fit: FitOptions, options: FlyOptions) -> Result<()> {
        let (center, zoom) = self.fit_target(area, &fit)?;
        self.fly_to(center, Some(zoom), options)
    }

    /// Sets the view so `area` fits the container, minus padding
    pub fn fit_bounds(&mut self, area: &Area, fit: FitOptions, options: PanOptions) -> Result<()> {
        let (center, zoom) = self.fit_target(area, &fit)?;
        self.set_view(center, Some(zoom), options)
    }

    pub fn fit_world(&mut self, fit: FitOptions) -> Result<()> {
        self.fit_bounds(&Area::world(), fit, PanOptions::default())
    }

    fn fit_target(&self, area: &Area, fit: &FitOptions) -> Result<(GeoPoint, f64)> {
        if !area.is_valid() {
            return Err(MapError::InvalidBounds(format!(
                "cannot fit an empty area ({})",
                area.to_bbox_string()
            )));
        }
        Ok(self.viewport.center_zoom_for(area, fit))
    }

    /// Halts the running animation where its last frame left the camera.
    /// Returns `true` if something was running; its end events fire once.
    pub fn stop(&mut self) -> bool {
        let Some(scheduler) = self.scheduler.as_deref_mut() else {
            return false;
        };
        match self.animator.stop(scheduler) {
            Some(end) => {
                self.move_end(end);
                true
            }
            None => false,
        }
    }

    /// Advances the running animation; call when a requested frame arrives.
    /// Returns `true` while more frames are needed.
    pub fn on_frame(&mut self) -> bool {
        let Some(scheduler) = self.scheduler.as_deref_mut() else {
            return false;
        };
        match self.animator.tick(self.viewport.crs(), scheduler) {
            Some(AnimationStep::Frame { center, zoom }) => {
                self.move_view(center, zoom);
                true
            }
            Some(AnimationStep::Finished { center, zoom, end }) => {
                self.move_view(center, zoom);
                self.move_end(end);
                false
            }
            None => false,
        }
    }

    /// Re-reads the container size from the [`SizeSource`]
    pub fn invalidate_size(&mut self, animate: bool) -> bool {
        match &self.size_source {
            Some(source) => {
                let size = source.size();
                self.resize(size, animate)
            }
            None => false,
        }
    }

    /// Applies a new container size, keeping the geographic center.
    ///
    /// With `animate` the view first keeps its top-left corner and then pans the old
    /// center back into the middle. Returns `false` when the center did not move on screen.
    pub fn resize(&mut self, new_size: PixelPoint, animate: bool) -> bool {
        if check_offset(&new_size).is_err() {
            log::warn!("Ignoring non-finite container size {}", new_size);
            return false;
        }
        let old_size = self.size();
        let offset = (old_size / 2.0).round() - (new_size / 2.0).round();
        if offset.is_zero() {
            self.viewport.resize(new_size);
            return false;
        }

        if animate {
            let shifted = self.viewport.panned_center(-offset);
            self.viewport.resize(new_size);
            self.viewport.navigate_to(NavigateTo::center(shifted));
            self.pan(offset, PanOptions::default());
        } else {
            self.viewport.resize(new_size);
            self.emit_move();
            self.emit(MapEvent::MoveEnd {
                center: self.center(),
            });
        }

        log::debug!("Resized map from {} to {}", old_size, new_size);
        self.emit(MapEvent::Resize { old_size, new_size });
        true
    }

    // Coordinate conversions

    /// World pixel at the container's top-left corner
    pub fn pixel_origin(&self) -> PixelPoint {
        self.viewport.pixel_origin()
    }

    pub fn pixel_bounds(&self) -> Bounds {
        self.viewport.pixel_bounds()
    }

    /// Projects to world pixels at `zoom`, or at the current zoom
    pub fn project(&self, point: &GeoPoint, zoom: Option<f64>) -> PixelPoint {
        self.viewport
            .project_at(point, zoom.unwrap_or_else(|| self.zoom()))
    }

    pub fn unproject(&self, point: &PixelPoint, zoom: Option<f64>) -> GeoPoint {
        self.viewport
            .unproject_at(point, zoom.unwrap_or_else(|| self.zoom()))
    }

    /// Geographic area currently visible
    pub fn bounds(&self) -> Area {
        self.viewport.bounds()
    }

    /// Great-circle distance in meters
    pub fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        self.viewport.crs().distance(a, b)
    }

    /// Wraps longitude (and latitude, if the CRS wraps it) into the world
    pub fn wrap(&self, point: &GeoPoint) -> GeoPoint {
        self.viewport.crs().wrap_geo(point)
    }

    // Surfaces, rendering and hit testing

    pub fn add_surface(&mut self, surface: Box<dyn Surface>) {
        self.surfaces.add(surface);
    }

    pub fn remove_surface(&mut self, id: &str) -> Option<Box<dyn Surface>> {
        self.surfaces.remove(id)
    }

    pub fn surfaces(&self) -> &SurfaceManager {
        &self.surfaces
    }

    pub fn surfaces_mut(&mut self) -> &mut SurfaceManager {
        &mut self.surfaces
    }

    /// Draws every visible surface onto `target`
    pub fn render(&mut self, target: &mut dyn DrawingSurface) -> Result<RenderStats> {
        let retina = self.options.capabilities.retina;
        self.pipeline
            .render(&self.viewport, &mut self.surfaces, target, retina)
    }

    /// Interactive features under a container point in the last rendered frame, topmost first
    pub fn targets_at(&self, container_point: PixelPoint) -> Vec<FeatureId> {
        let point = self.viewport.container_point_to_layer_point(container_point);
        self.pipeline
            .hit_index()
            .targets_at(point, self.options.render.hit_tolerance)
    }

    /// Offers a container point to the features under it, topmost first, until the
    /// handler stops propagation. Returns `true` if it did.
    pub fn dispatch<F>(&self, container_point: PixelPoint, handler: F) -> bool
    where
        F: FnMut(FeatureId) -> Propagation,
    {
        let point = self.viewport.container_point_to_layer_point(container_point);
        self.pipeline
            .hit_index()
            .dispatch(point, self.options.render.hit_tolerance, handler)
    }

    /// Takes all events queued since the last call.
    ///
    /// Hosts drain once per frame. Lifecycle events accumulate until drained;
    /// per-frame `Move` and `Zoom` updates collapse into the latest one.
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }

    // Internals

    fn can_animate(&self) -> bool {
        self.scheduler.is_some()
            && self.options.animation.enabled
            && self.options.capabilities.any3d
    }

    fn now(&self) -> instant::Instant {
        match &self.scheduler {
            Some(scheduler) => scheduler.now(),
            None => instant::Instant::now(),
        }
    }

    fn default_zoom_delta(&self) -> f64 {
        if self.options.capabilities.any3d {
            self.options.zoom_delta
        } else {
            1.0
        }
    }

    /// Snaps to the zoom snap (whole levels without 3D support), then clamps to the limits
    fn limit_zoom(&self, zoom: f64) -> f64 {
        let snap = if self.options.capabilities.any3d {
            self.options.zoom_snap
        } else {
            Some(1.0)
        };
        let zoom = match snap {
            Some(snap) if snap > 0.0 => (zoom / snap).round() * snap,
            _ => zoom,
        };
        self.viewport.limit_zoom(zoom)
    }

    /// Pans to `center` if it is close enough to animate, returning whether it did
    fn try_pan(&mut self, center: GeoPoint, options: PanOptions) -> bool {
        let half = self
            .viewport
            .container_point_to_layer_point(self.size() / 2.0);
        let offset = (self.viewport.geo_to_layer_point(&center) - half).trunc();
        if options.animate != Some(true) && !self.size().contains(&offset) {
            return false;
        }
        self.pan(offset, options);
        true
    }

    fn reset_view(&mut self, center: GeoPoint, zoom: f64, no_move_start: bool) {
        let zoom = self.limit_zoom(zoom);
        let zoom_changed = zoom != self.zoom();
        log::debug!("Resetting view to {} zoom {}", center, zoom);

        self.move_start(zoom_changed, no_move_start);
        self.move_view(center, zoom);
        self.move_end(SessionEnd { zoom_changed });
        self.emit(MapEvent::ViewReset);
    }

    fn move_start(&mut self, zoom_changed: bool, no_move_start: bool) {
        if zoom_changed {
            self.emit(MapEvent::ZoomStart);
        }
        if !no_move_start {
            self.emit(MapEvent::MoveStart);
        }
    }

    fn move_view(&mut self, center: GeoPoint, zoom: f64) {
        if self.viewport.navigate_to(NavigateTo::new(center, zoom)) {
            self.emit(MapEvent::Zoom { zoom: self.zoom() });
        }
        self.emit_move();
    }

    fn move_end(&mut self, end: SessionEnd) {
        if end.zoom_changed {
            self.emit(MapEvent::ZoomEnd { zoom: self.zoom() });
        }
        self.emit(MapEvent::MoveEnd {
            center: self.center(),
        });
    }

    fn emit_move(&mut self) {
        self.emit(MapEvent::Move {
            center: self.center(),
            zoom: self.zoom(),
        });
    }

    /// Queues `event`. Within the trailing run of `Move`/`Zoom` events only the
    /// newest of each kind is kept, so the queue stays bounded per animation.
    fn emit(&mut self, event: MapEvent) {
        log::trace!("Map event {:?}", event);
        if event.is_progress() {
            let run = self
                .events
                .iter()
                .rev()
                .take_while(|queued| queued.is_progress())
                .count();
            let run_start = self.events.len() - run;
            if let Some(i) = self.events[run_start..]
                .iter()
                .position(|queued| std::mem::discriminant(queued) == std::mem::discriminant(&event))
            {
                self.events.remove(run_start + i);
            }
        }
        self.events.push(event);
    }
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("viewport", &self.viewport)
            .field("animation", &self.animator.state())
            .field("surfaces", &self.surfaces)
            .field("pending_events", &self.events.len())
            .finish()
    }
}

fn check_point(point: &GeoPoint) -> Result<()> {
    if point.lat.is_finite() && point.lng.is_finite() {
        Ok(())
    } else {
        Err(MapError::InvalidCoordinates(format!(
            "non-finite coordinates ({}, {})",
            point.lat, point.lng
        )))
    }
}

fn check_zoom(zoom: f64) -> Result<()> {
    if zoom.is_finite() {
        Ok(())
    } else {
        Err(MapError::Config(format!("zoom must be finite, got {}", zoom)))
    }
}

fn check_offset(offset: &PixelPoint) -> Result<()> {
    if offset.x.is_finite() && offset.y.is_finite() {
        Ok(())
    } else {
        Err(MapError::InvalidCoordinates(format!(
            "non-finite pixel offset {}",
            offset
        )))
    }
}
