//! Core constants derived from Leaflet defaults and common web-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Mean earth radius in meters, used for great-circle distances.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Sphere radius of the spherical Mercator projection (EPSG:3857).
pub const MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude at which spherical Mercator maps to a square world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Equatorial circumference used to size areas around a point.
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_017.0;

/// Default tolerance for geographic point equality.
pub const DEFAULT_MARGIN: f64 = 1.0e-9;

/// Initial camera zoom when none is supplied.
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Eased pan duration in seconds.
pub const DEFAULT_PAN_DURATION: f64 = 0.25;

/// Default curvature of the eased pan.
pub const DEFAULT_EASE_LINEARITY: f64 = 0.5;

/// Lower clamp on ease linearity (caps the ease-out power at 5).
pub const MIN_EASE_LINEARITY: f64 = 0.2;

/// Shape constant of the fly-to curve.
pub const FLY_RHO: f64 = 1.42;

/// Below this the fly-to ratio is treated as zero.
pub const FLY_RATIO_EPSILON: f64 = 1.0e-9;

/// Replacement for `ln(0)` in the fly-to curve.
pub const FLY_LOG_FLOOR: f64 = -18.0;

/// Seconds of flight per unit of curve length.
pub const FLY_SPEED_FACTOR: f64 = 0.8;

/// Exponent of the fly-to time easing.
pub const FLY_EASE_POWER: f64 = 1.5;

/// Default simplification tolerance in pixels.
pub const DEFAULT_SMOOTH_FACTOR: f64 = 1.0;

/// Default tile subdomains.
pub const DEFAULT_SUBDOMAINS: &str = "abc";

/// Highest zoom a tile surface serves by default.
pub const DEFAULT_MAX_TILE_ZOOM: u8 = 18;

/// Deepest tile zoom a tile surface accepts; `2^z` tiles per axis must fit an `i32`.
pub const MAX_TILE_ZOOM: u8 = 30;
