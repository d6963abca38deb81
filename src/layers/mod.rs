pub mod base;
pub mod manager;
pub mod tile;
pub mod vector;

pub use base::{Surface, SurfaceKind, SurfaceProperties};
pub use manager::SurfaceManager;
pub use tile::{TileOptions, TileState, TileSurface};
pub use vector::VectorSurface;
