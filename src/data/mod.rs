pub mod feature;
pub mod geojson;

pub use feature::{Feature, FeatureId, FeatureStyle, Geometry};
pub use geojson::{features_area, GeoJson};
