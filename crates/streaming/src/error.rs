use std::io;

use physics::ColliderError;
use procgen::GenerationError;
use thiserror::Error;

use crate::tile::TileKey;

/// Failures while producing a tile. None of these are retried: the key stays
/// empty until the parameters change.
#[derive(Debug, Error)]
pub enum StreamingError {
    #[error("failed to spawn worker for tile {key}: {source}")]
    Spawn {
        key: TileKey,
        #[source]
        source: io::Error,
    },

    #[error("worker for tile {0} panicked")]
    WorkerPanicked(TileKey),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Collider(#[from] ColliderError),
}
