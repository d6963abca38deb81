pub mod context;
pub mod pipeline;
pub mod surface;

// Re-export main types
pub use context::{DrawCommand, PaintedImage, PaintedPath, RenderContext};
pub use pipeline::{RenderFrame, RenderPipeline, RenderStats};
pub use surface::DrawingSurface;
