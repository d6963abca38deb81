use super::coord::TileCoord;
use crate::{MapError, Result};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicU64, Ordering};

/// Host-side image decoded for a tile, referenced by id when drawing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

impl ImageHandle {
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }
}

/// A tile the map wants loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    /// Wrapped address, as used in the URL
    pub coord: TileCoord,
    pub url: String,
}

/// Completion of a [`TileRequest`], success or failure
#[derive(Debug)]
pub struct TileLoadEvent {
    pub coord: TileCoord,
    pub result: Result<ImageHandle>,
}

impl TileLoadEvent {
    pub fn loaded(coord: TileCoord, image: ImageHandle) -> Self {
        Self {
            coord,
            result: Ok(image),
        }
    }

    pub fn failed(coord: TileCoord, reason: impl Into<String>) -> Self {
        Self {
            coord,
            result: Err(MapError::TileLoad(reason.into())),
        }
    }
}

/// Fetches and decodes tile images on behalf of the map.
///
/// Implementations may complete on any thread; the event must eventually be sent
/// on `completions` exactly once per request.
pub trait TileImageSource: Send + Sync {
    fn load(&self, request: TileRequest, completions: Sender<TileLoadEvent>);
}

/// Blanket impl so closures can serve as sources
impl<F> TileImageSource for F
where
    F: Fn(TileRequest, Sender<TileLoadEvent>) + Send + Sync,
{
    fn load(&self, request: TileRequest, completions: Sender<TileLoadEvent>) {
        self(request, completions)
    }
}

/// Completes every request immediately with a fresh square image.
///
/// Coordinates listed in `missing` fail instead. Useful for headless rendering.
#[derive(Debug)]
pub struct ImmediateTileSource {
    tile_size: u32,
    next_id: AtomicU64,
    missing: Vec<TileCoord>,
}

impl ImmediateTileSource {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            next_id: AtomicU64::new(1),
            missing: Vec::new(),
        }
    }

    pub fn with_missing(mut self, coords: Vec<TileCoord>) -> Self {
        self.missing = coords;
        self
    }
}

impl TileImageSource for ImmediateTileSource {
    fn load(&self, request: TileRequest, completions: Sender<TileLoadEvent>) {
        let event = if self.missing.contains(&request.coord) {
            TileLoadEvent::failed(request.coord, format!("no tile at {}", request.url))
        } else {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            TileLoadEvent::loaded(
                request.coord,
                ImageHandle::new(id, self.tile_size, self.tile_size),
            )
        };
        // The receiving surface may already be gone
        let _ = completions.send(event);
    }
}
