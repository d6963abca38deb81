//! Pixel-space geometry: clipping, simplification and label anchors

pub mod center;
pub mod clip;
pub mod simplify;

pub use center::{centroid, polygon_center, polyline_center};
pub use clip::{
    bit_code, clip_polygon, clip_polyline, clip_segment, edge_intersection, SegmentClipper,
};
pub use simplify::{
    closest_point_on_segment, point_to_polyline_distance, point_to_segment_distance, simplify,
};
