//! Prelude module for common atlas types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use atlas::prelude::*;`

pub use crate::core::{
    area::Area,
    bounds::Bounds,
    builder::MapBuilder,
    config::{AnimationOptions, AnimationProfile, Capabilities, MapOptions, RenderOptions},
    geo::GeoPoint,
    map::{FlyOptions, Map, MapEvent, PanOptions, SizeSource},
    point::PixelPoint,
    viewport::{FitOptions, NavigateTo, Viewport},
};

pub use crate::animation::{
    AnimationState, EasingFunction, FrameScheduler, ManualScheduler, WallClockScheduler,
};

pub use crate::data::{Feature, FeatureId, FeatureStyle, GeoJson, Geometry};

pub use crate::layers::{
    Surface, SurfaceKind, SurfaceManager, TileOptions, TileSurface, VectorSurface,
};

pub use crate::projection::{Crs, EPSG3857};

pub use crate::rendering::{DrawingSurface, RenderContext, RenderPipeline, RenderStats};

pub use crate::spatial::{HitIndex, Propagation};

pub use crate::tiles::{
    ImageHandle, ImmediateTileSource, ThreadedTileSource, TileCoord, TileImageSource,
    TileLoadEvent, TileRequest,
};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
