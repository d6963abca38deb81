use crate::core::{bounds::Bounds, point::PixelPoint};
use crate::tiles::source::ImageHandle;

/// 2D drawing target, modelled on the canvas path API.
///
/// Coordinates are container pixels relative to the map's pixel origin. The map
/// never rasterizes anything itself; hosts implement this over a canvas, a GPU
/// batcher or a recorder such as [`RenderContext`](super::context::RenderContext).
pub trait DrawingSurface {
    /// Wipes the whole surface before a frame
    fn clear(&mut self);

    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    /// Global opacity for the following fill, stroke and image calls
    fn set_alpha(&mut self, alpha: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, point: PixelPoint);
    fn line_to(&mut self, point: PixelPoint);
    fn close_path(&mut self);
    /// Circular arc around `center`, angles in radians
    fn arc(&mut self, center: PixelPoint, radius: f64, start_angle: f64, end_angle: f64);
    fn fill(&mut self);
    fn stroke(&mut self);

    /// Draws `image` stretched over `dest`
    fn draw_image(&mut self, image: &ImageHandle, dest: Bounds);
}
