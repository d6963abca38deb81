use super::source::{ImageHandle, TileImageSource, TileLoadEvent, TileRequest};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::thread;

type FetchFn = dyn Fn(&TileRequest) -> Result<ImageHandle, String> + Send + Sync;

/// Runs a blocking fetch function on a detached thread per tile.
///
/// The fetch result, success or failure, is sent back on the request's
/// completion channel. Nothing is retried.
#[derive(Clone)]
pub struct ThreadedTileSource {
    fetch: Arc<FetchFn>,
}

impl ThreadedTileSource {
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn(&TileRequest) -> Result<ImageHandle, String> + Send + Sync + 'static,
    {
        Self {
            fetch: Arc::new(fetch),
        }
    }
}

impl std::fmt::Debug for ThreadedTileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadedTileSource").finish_non_exhaustive()
    }
}

impl TileImageSource for ThreadedTileSource {
    fn load(&self, request: TileRequest, completions: Sender<TileLoadEvent>) {
        let fetch = Arc::clone(&self.fetch);

        thread::spawn(move || {
            log::trace!("fetch tile {} from {}", request.coord, request.url);
            let event = match fetch(&request) {
                Ok(image) => TileLoadEvent::loaded(request.coord, image),
                Err(reason) => TileLoadEvent::failed(request.coord, reason),
            };
            let _ = completions.send(event);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::coord::TileCoord;
    use crate::MapError;
    use std::time::Duration;

    #[test]
    fn test_completions_arrive_from_worker_threads() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let source = ThreadedTileSource::new(|request| {
            if request.coord.y == 0 {
                Ok(ImageHandle::new(request.coord.x as u64, 256, 256))
            } else {
                Err(format!("404 for {}", request.url))
            }
        });

        for (x, y) in [(0, 0), (1, 0), (0, 1)] {
            source.load(
                TileRequest {
                    coord: TileCoord::new(x, y, 1),
                    url: format!("1/{}/{}", x, y),
                },
                tx.clone(),
            );
        }

        let mut loaded = 0;
        let mut failed = 0;
        for _ in 0..3 {
            let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            match event.result {
                Ok(_) => loaded += 1,
                Err(MapError::TileLoad(_)) => failed += 1,
                Err(other) => panic!("unexpected error {}", other),
            }
        }
        assert_eq!((loaded, failed), (2, 1));
    }
}
