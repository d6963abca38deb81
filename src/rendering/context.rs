use super::surface::DrawingSurface;
use crate::core::{bounds::Bounds, point::PixelPoint};
use crate::tiles::source::ImageHandle;

/// Commands recorded by a [`RenderContext`], one per surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    StrokeStyle(String),
    FillStyle(String),
    LineWidth(f64),
    Alpha(f64),
    BeginPath,
    MoveTo(PixelPoint),
    LineTo(PixelPoint),
    ClosePath,
    Arc {
        center: PixelPoint,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Fill,
    Stroke,
    Image {
        image: ImageHandle,
        dest: Bounds,
    },
}

/// A path as it was painted, with the paint state at the time
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedPath {
    pub subpaths: Vec<Vec<PixelPoint>>,
    pub closed: bool,
    /// `(center, radius)` of every arc in the path
    pub arcs: Vec<(PixelPoint, f64)>,
    /// Stroke color and width when the path was stroked
    pub stroke: Option<(String, f64)>,
    pub fill: Option<String>,
    pub alpha: f64,
}

impl PaintedPath {
    pub fn points(&self) -> impl Iterator<Item = &PixelPoint> {
        self.subpaths.iter().flatten()
    }
}

/// An image placed on the surface
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedImage {
    pub image: ImageHandle,
    pub dest: Bounds,
    pub alpha: f64,
}

#[derive(Debug, Clone, Default)]
struct PathBuilder {
    subpaths: Vec<Vec<PixelPoint>>,
    closed: bool,
    arcs: Vec<(PixelPoint, f64)>,
}

/// Headless drawing surface that records every call.
///
/// Besides the raw command queue it keeps a painted-path view (paths merged
/// with their stroke and fill state), which is what tests and the demo inspect.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    drawing_queue: Vec<DrawCommand>,
    stroke_style: String,
    fill_style: String,
    line_width: f64,
    alpha: f64,
    current: PathBuilder,
    /// Set once the current path was filled or stroked
    painted: Option<usize>,
    paths: Vec<PaintedPath>,
    images: Vec<PaintedImage>,
}

impl RenderContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            stroke_style: "black".to_string(),
            fill_style: "black".to_string(),
            line_width: 1.0,
            alpha: 1.0,
            current: PathBuilder::default(),
            painted: None,
            paths: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Recorded commands since the last [`DrawingSurface::clear`]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    pub fn paths(&self) -> &[PaintedPath] {
        &self.paths
    }

    pub fn images(&self) -> &[PaintedImage] {
        &self.images
    }

    /// Container rectangle the context represents
    pub fn bounds(&self) -> Bounds {
        Bounds::from_coords(0.0, 0.0, self.width as f64, self.height as f64)
    }

    /// Drops everything recorded so far without resetting the paint state
    pub fn clear_queue(&mut self) {
        self.drawing_queue.clear();
        self.paths.clear();
        self.images.clear();
        self.current = PathBuilder::default();
        self.painted = None;
    }

    /// Merges the current path into the painted list, or updates the entry it
    /// already has when the same path is both filled and stroked.
    fn paint(&mut self, update: impl FnOnce(&mut PaintedPath)) {
        let index = match self.painted {
            Some(index) => index,
            None => {
                self.paths.push(PaintedPath {
                    subpaths: self.current.subpaths.clone(),
                    closed: self.current.closed,
                    arcs: self.current.arcs.clone(),
                    stroke: None,
                    fill: None,
                    alpha: self.alpha,
                });
                self.painted = Some(self.paths.len() - 1);
                self.paths.len() - 1
            }
        };
        update(&mut self.paths[index]);
    }
}

impl DrawingSurface for RenderContext {
    fn clear(&mut self) {
        self.clear_queue();
        self.drawing_queue.push(DrawCommand::Clear);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.stroke_style = color.to_string();
        self.drawing_queue
            .push(DrawCommand::StrokeStyle(color.to_string()));
    }

    fn set_fill_style(&mut self, color: &str) {
        self.fill_style = color.to_string();
        self.drawing_queue.push(DrawCommand::FillStyle(color.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
        self.drawing_queue.push(DrawCommand::LineWidth(width));
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.drawing_queue.push(DrawCommand::Alpha(alpha));
    }

    fn begin_path(&mut self) {
        self.current = PathBuilder::default();
        self.painted = None;
        self.drawing_queue.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, point: PixelPoint) {
        self.current.subpaths.push(vec![point]);
        self.drawing_queue.push(DrawCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: PixelPoint) {
        match self.current.subpaths.last_mut() {
            Some(subpath) => subpath.push(point),
            None => self.current.subpaths.push(vec![point]),
        }
        self.drawing_queue.push(DrawCommand::LineTo(point));
    }

    fn close_path(&mut self) {
        self.current.closed = true;
        self.drawing_queue.push(DrawCommand::ClosePath);
    }

    fn arc(&mut self, center: PixelPoint, radius: f64, start_angle: f64, end_angle: f64) {
        self.current.arcs.push((center, radius));
        self.drawing_queue.push(DrawCommand::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn fill(&mut self) {
        let color = self.fill_style.clone();
        self.paint(|path| path.fill = Some(color));
        self.drawing_queue.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        let stroke = (self.stroke_style.clone(), self.line_width);
        self.paint(|path| path.stroke = Some(stroke));
        self.drawing_queue.push(DrawCommand::Stroke);
    }

    fn draw_image(&mut self, image: &ImageHandle, dest: Bounds) {
        self.images.push(PaintedImage {
            image: image.clone(),
            dest,
            alpha: self.alpha,
        });
        self.drawing_queue.push(DrawCommand::Image {
            image: image.clone(),
            dest,
        });
    }
}
