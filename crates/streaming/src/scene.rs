//! Host scene the streamer attaches tiles to.

use crate::tile::{Tile, TileKey};

/// Receives tiles as they become visible and invisible. The streamer detaches
/// every tile it attached at the start of the next tick.
pub trait Scene {
    fn attach(&mut self, key: TileKey, tile: &Tile);
    fn detach(&mut self, key: TileKey, tile: &Tile);
}

/// Scene that only tracks which keys are attached.
#[derive(Debug, Default)]
pub struct AttachedKeys {
    keys: Vec<TileKey>,
}

impl AttachedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[TileKey] {
        &self.keys
    }

    pub fn contains(&self, key: TileKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Scene for AttachedKeys {
    fn attach(&mut self, key: TileKey, _tile: &Tile) {
        debug_assert!(!self.keys.contains(&key), "tile {} attached twice", key);
        self.keys.push(key);
    }

    fn detach(&mut self, key: TileKey, _tile: &Tile) {
        self.keys.retain(|k| *k != key);
    }
}
