//! # Atlas
//!
//! A geometric projection and viewport engine for pannable, zoomable web-style maps.
//!
//! The crate converts geographic coordinates to screen pixels through a spherical
//! Mercator CRS, keeps a virtual camera over the world, animates it (eased pans and
//! hyperbolic fly-to flights) and feeds clipped, simplified vector features and tile
//! images to a pluggable drawing surface.
//!
//! Everything that touches the host (drawing, frame timing, container size, tile
//! image fetching) sits behind a small trait so the engine runs headless.

pub mod animation;
pub mod core;
pub mod data;
pub mod geometry;
pub mod layers;
pub mod prelude;
pub mod projection;
pub mod rendering;
pub mod spatial;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    area::Area,
    bounds::Bounds,
    builder::MapBuilder,
    config::MapOptions,
    geo::GeoPoint,
    map::{FlyOptions, Map, MapEvent, PanOptions},
    point::PixelPoint,
    viewport::{FitOptions, NavigateTo, Viewport},
};

pub use animation::{FrameScheduler, ManualScheduler};

pub use data::feature::{Feature, FeatureId, FeatureStyle, Geometry};

pub use geometry::{clip_polygon, clip_polyline, clip_segment, simplify};

pub use layers::{base::Surface, tile::TileSurface, vector::VectorSurface};

pub use projection::crs::{Crs, EPSG3857, EPSG900913};

pub use rendering::{context::RenderContext, pipeline::RenderPipeline, surface::DrawingSurface};

pub use spatial::index::{HitIndex, Propagation};

pub use tiles::coord::{TileCoord, TileRange};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tile template error: {0}")]
    Template(String),

    #[error("Tile load error: {0}")]
    TileLoad(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
