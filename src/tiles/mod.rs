pub mod coord;
pub mod loader;
pub mod source;
pub mod template;

// Re-exports for convenience
pub use coord::{TileCoord, TileRange};
pub use loader::ThreadedTileSource;
pub use source::{ImageHandle, ImmediateTileSource, TileImageSource, TileLoadEvent, TileRequest};
pub use template::UrlTemplate;
