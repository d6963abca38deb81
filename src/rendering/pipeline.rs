//! Feature-to-surface pipeline
//!
//! Each frame: project to layer pixels, clip against the padded view, simplify,
//! then issue path calls on the [`DrawingSurface`]. Interactive features land in
//! the hit index as they are drawn.

use super::surface::DrawingSurface;
use crate::core::config::RenderOptions;
use crate::core::{bounds::Bounds, geo::GeoPoint, point::PixelPoint, viewport::Viewport};
use crate::data::feature::{Feature, FeatureStyle, Geometry};
use crate::geometry::{clip_polygon, clip_polyline, simplify};
use crate::layers::manager::SurfaceManager;
use crate::spatial::index::{HitIndex, HitShape};
use crate::tiles::source::ImageHandle;
use crate::Result;
use std::f64::consts::TAU;

/// Per-frame view state shared by every surface
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub viewport: &'a Viewport,
    /// World pixel that maps to layer point `(0, 0)`
    pub pixel_origin: PixelPoint,
    /// Layer-space rectangle features are clipped against
    pub clip_bounds: Bounds,
    pub retina: bool,
}

impl<'a> RenderFrame<'a> {
    pub fn new(viewport: &'a Viewport, clip_padding: f64, retina: bool) -> Self {
        let size = viewport.size();
        let min = (size * -clip_padding).round();
        let max = (min + size * (1.0 + 2.0 * clip_padding)).round();

        Self {
            viewport,
            pixel_origin: viewport.pixel_origin(),
            clip_bounds: Bounds::new(min, max),
            retina,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn layer_point(&self, point: &GeoPoint) -> PixelPoint {
        self.viewport.project(point).round() - self.pixel_origin
    }

    pub fn layer_points(&self, points: &[GeoPoint]) -> Vec<PixelPoint> {
        points.iter().map(|p| self.layer_point(p)).collect()
    }
}

/// Counters of the last rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub features_drawn: usize,
    /// Features entirely outside the view
    pub features_culled: usize,
    pub vertices: usize,
    pub images: usize,
}

#[derive(Debug, Default)]
pub struct RenderPipeline {
    options: RenderOptions,
    hits: HitIndex,
    stats: RenderStats,
}

impl RenderPipeline {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            hits: HitIndex::new(),
            stats: RenderStats::default(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    pub fn hit_index(&self) -> &HitIndex {
        &self.hits
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Draws every visible surface of `surfaces` in z-order onto `target`
    pub fn render(
        &mut self,
        viewport: &Viewport,
        surfaces: &mut SurfaceManager,
        target: &mut dyn DrawingSurface,
        retina: bool,
    ) -> Result<RenderStats> {
        self.hits.clear();
        self.stats = RenderStats::default();
        target.clear();

        let frame = RenderFrame::new(viewport, self.options.clip_padding, retina);
        surfaces.render(&frame, self, target)?;

        log::trace!(
            "Rendered frame at zoom {}: {:?}",
            viewport.zoom(),
            self.stats
        );
        Ok(self.stats)
    }

    /// Draws one feature; returns `false` when nothing of it was visible
    pub fn draw_feature(
        &mut self,
        frame: &RenderFrame<'_>,
        feature: &Feature,
        opacity: f64,
        target: &mut dyn DrawingSurface,
    ) -> bool {
        let style = &feature.style;
        let shape = match &feature.geometry {
            Geometry::Point(point) => self.draw_circle(frame, *point, feature, opacity, target),
            Geometry::Polyline(points) => {
                let parts = self.project_polyline(frame, points, style);
                if parts.is_empty() {
                    None
                } else {
                    trace_paths(target, &parts, false);
                    fill_stroke(target, style, &feature.geometry, opacity);
                    Some(HitShape::Polyline {
                        parts,
                        half_width: style.weight / 2.0,
                    })
                }
            }
            Geometry::Polygon(ring) => {
                let ring = self.project_polygon(frame, ring, style);
                if ring.is_empty() {
                    None
                } else {
                    trace_paths(target, std::slice::from_ref(&ring), true);
                    fill_stroke(target, style, &feature.geometry, opacity);
                    Some(HitShape::Polygon {
                        ring,
                        half_width: style.weight / 2.0,
                    })
                }
            }
        };

        match shape {
            Some(shape) => {
                self.stats.features_drawn += 1;
                if feature.interactive {
                    self.hits.insert(feature.id, shape);
                }
                true
            }
            None => {
                self.stats.features_culled += 1;
                false
            }
        }
    }

    /// Places an image over `dest` (layer pixels)
    pub fn draw_image(
        &mut self,
        image: &ImageHandle,
        dest: Bounds,
        opacity: f64,
        target: &mut dyn DrawingSurface,
    ) {
        target.set_alpha(opacity);
        target.draw_image(image, dest);
        self.stats.images += 1;
    }

    /// Clipped and simplified parts of a polyline, in layer pixels
    pub fn project_polyline(
        &mut self,
        frame: &RenderFrame<'_>,
        points: &[GeoPoint],
        style: &FeatureStyle,
    ) -> Vec<Vec<PixelPoint>> {
        let projected = frame.layer_points(points);
        let bounds = stroke_bounds(frame, style);
        if !Bounds::from_points(projected.iter()).intersects(&bounds) {
            return Vec::new();
        }

        let parts: Vec<Vec<PixelPoint>> = clip_polyline(&projected, &bounds)
            .into_iter()
            .map(|part| simplify(&part, self.options.smooth_factor))
            .collect();
        self.stats.vertices += parts.iter().map(Vec::len).sum::<usize>();
        parts
    }

    /// Clipped and simplified ring of a polygon, in layer pixels
    pub fn project_polygon(
        &mut self,
        frame: &RenderFrame<'_>,
        ring: &[GeoPoint],
        style: &FeatureStyle,
    ) -> Vec<PixelPoint> {
        let projected = frame.layer_points(ring);
        let bounds = stroke_bounds(frame, style);
        if !Bounds::from_points(projected.iter()).intersects(&bounds) {
            return Vec::new();
        }

        let clipped = clip_polygon(&projected, &bounds, true);
        let ring = simplify(&clipped, self.options.smooth_factor);
        self.stats.vertices += ring.len();
        ring
    }

    fn draw_circle(
        &mut self,
        frame: &RenderFrame<'_>,
        point: GeoPoint,
        feature: &Feature,
        opacity: f64,
        target: &mut dyn DrawingSurface,
    ) -> Option<HitShape> {
        let style = &feature.style;
        let center = frame.layer_point(&point);
        let radius = style.radius.round().max(1.0);
        let reach = radius + style.weight / 2.0;
        let extent = Bounds::new(
            center - PixelPoint::new(reach, reach),
            center + PixelPoint::new(reach, reach),
        );
        if !extent.intersects(&frame.clip_bounds) {
            return None;
        }

        target.begin_path();
        target.arc(center, radius, 0.0, TAU);
        fill_stroke(target, style, &feature.geometry, opacity);
        self.stats.vertices += 1;

        Some(HitShape::Circle { center, radius })
    }
}

/// Clip rectangle grown by half the stroke so wide strokes are not cut at the
/// edge, widened to whole pixels to line up with snapped intersections
fn stroke_bounds(frame: &RenderFrame<'_>, style: &FeatureStyle) -> Bounds {
    let w = PixelPoint::new(style.weight / 2.0, style.weight / 2.0);
    Bounds::new(
        (frame.clip_bounds.min - w).floor(),
        (frame.clip_bounds.max + w).ceil(),
    )
}

fn trace_paths(target: &mut dyn DrawingSurface, parts: &[Vec<PixelPoint>], closed: bool) {
    target.begin_path();
    for part in parts {
        let Some((first, rest)) = part.split_first() else {
            continue;
        };
        target.move_to(*first);
        for point in rest {
            target.line_to(*point);
        }
        if closed {
            target.close_path();
        }
    }
}

fn fill_stroke(
    target: &mut dyn DrawingSurface,
    style: &FeatureStyle,
    geometry: &Geometry,
    opacity: f64,
) {
    if style.fills(geometry) {
        target.set_alpha(style.fill_opacity * opacity);
        target.set_fill_style(&style.fill_color);
        target.fill();
    }

    if style.stroke && style.weight != 0.0 {
        target.set_alpha(style.opacity * opacity);
        target.set_line_width(style.weight);
        target.set_stroke_style(&style.color);
        target.stroke();
    }
}
