//! Map projections and coordinate reference systems.
//!
//! A [`Crs`] composes a [`Projection`] (geographic → planar meters), an affine
//! [`Transformation`] (planar → pixels at a reference scale) and the zoom/scale law.

pub mod crs;
pub mod mercator;
pub mod transformation;

pub use crs::{wrap_num, Crs, EPSG3857, EPSG900913};
pub use mercator::SphericalMercator;
pub use transformation::Transformation;

use crate::core::{bounds::Bounds, geo::GeoPoint, point::PixelPoint};

/// Maps geographic coordinates to an unbounded planar coordinate, and back.
pub trait Projection: Send + Sync {
    fn project(&self, point: &GeoPoint) -> PixelPoint;

    fn unproject(&self, point: &PixelPoint) -> GeoPoint;

    /// Planar extent covered by the projection
    fn bounds(&self) -> Bounds;
}
