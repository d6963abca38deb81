use crate::core::{area::Area, bounds::Bounds, geo::GeoPoint, point::PixelPoint};
use crate::projection::crs::{wrap_num, Crs};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a single map tile.
///
/// Columns and rows are signed: a tile range computed from the pixel origin can
/// reach past the antimeridian before [`TileCoord::wrapped`] folds it back into
/// the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub z: u8,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles along one axis at this zoom; `z` must not exceed 30
    pub fn world_tiles(&self) -> i32 {
        1_i32 << self.z
    }

    /// Returns the coordinate with its column wrapped into `[0, 2^z)`
    pub fn wrapped(&self) -> TileCoord {
        let n = self.world_tiles() as f64;
        TileCoord::new(wrap_num(self.x as f64, (0.0, n), false) as i32, self.y, self.z)
    }

    /// Checks if the tile exists at its zoom level
    pub fn is_valid(&self) -> bool {
        let n = self.world_tiles();
        (0..n).contains(&self.x) && (0..n).contains(&self.y)
    }

    /// Gets the parent tile at a lower zoom level
    pub fn parent(&self) -> Option<TileCoord> {
        if self.z == 0 {
            None
        } else {
            Some(TileCoord::new(
                self.x.div_euclid(2),
                self.y.div_euclid(2),
                self.z - 1,
            ))
        }
    }

    /// Gets the four child tiles at the next zoom level
    pub fn children(&self) -> [TileCoord; 4] {
        let (x, y, z) = (self.x * 2, self.y * 2, self.z + 1);
        [
            TileCoord::new(x, y, z),
            TileCoord::new(x + 1, y, z),
            TileCoord::new(x, y + 1, z),
            TileCoord::new(x + 1, y + 1, z),
        ]
    }

    /// Pixel bounds of the tile in the world at its own zoom
    pub fn pixel_bounds(&self, tile_size: f64) -> Bounds {
        let min = PixelPoint::new(self.x as f64 * tile_size, self.y as f64 * tile_size);
        Bounds::new(min, min + PixelPoint::new(tile_size, tile_size))
    }

    /// Geographic area covered by the tile
    pub fn area(&self, crs: &Crs, tile_size: f64) -> Area {
        let bounds = self.pixel_bounds(tile_size);
        let zoom = self.z as f64;
        let sw: GeoPoint = crs.pixel_to_geo(&bounds.bottom_left(), zoom);
        let ne: GeoPoint = crs.pixel_to_geo(&bounds.top_right(), zoom);
        Area::new(sw, ne)
    }

    /// Cache key in the usual `z/x/y` form
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileCoord({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Inclusive rectangle of tile columns and rows at one zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRange {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    pub z: u8,
}

impl TileRange {
    /// Tiles covering the pixel rectangle `[origin, origin + size]`.
    ///
    /// The upper edge is deliberately exclusive (`ceil(max / size) - 1` rather
    /// than `floor(max / size)`): a view ending exactly on a tile boundary does
    /// not pull in the next row or column.
    pub fn from_pixel_bounds(origin: PixelPoint, size: PixelPoint, tile_size: f64, z: u8) -> Self {
        let min = (origin / tile_size).floor();
        let max = ((origin + size) / tile_size).ceil() - PixelPoint::new(1.0, 1.0);

        Self {
            min_x: min.x as i32,
            min_y: min.y as i32,
            max_x: (max.x as i32).max(min.x as i32 - 1),
            max_y: (max.y as i32).max(min.y as i32 - 1),
            z,
        }
    }

    pub fn width(&self) -> usize {
        (self.max_x - self.min_x + 1).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_y - self.min_y + 1).max(0) as usize
    }

    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        coord.z == self.z
            && (self.min_x..=self.max_x).contains(&coord.x)
            && (self.min_y..=self.max_y).contains(&coord.y)
    }

    /// Iterates row by row (`y` outer, `x` inner)
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| TileCoord::new(x, y, self.z)))
    }
}
