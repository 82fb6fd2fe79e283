//! Tile cache: one entry per [`TileKey`], either a running job or a finished tile.

use std::collections::HashMap;

use crate::error::StreamingError;
use crate::task::TaskHandle;
use crate::tile::{Tile, TileKey};

/// Job producing a tile.
pub type TileTask = TaskHandle<Result<Tile, StreamingError>>;

/// Observable lifecycle state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Absent,
    Pending,
    Ready,
}

enum CacheEntry {
    Pending(TileTask),
    Ready(Tile),
}

/// Map from key to pending job or ready tile. Dropping the cache waits for every
/// pending job.
#[derive(Default)]
pub struct TileCache {
    entries: HashMap<TileKey, CacheEntry>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: TileKey) -> TileState {
        match self.entries.get(&key) {
            None => TileState::Absent,
            Some(CacheEntry::Pending(_)) => TileState::Pending,
            Some(CacheEntry::Ready(_)) => TileState::Ready,
        }
    }

    /// Record a launched job. The key must be absent.
    pub fn insert_pending(&mut self, key: TileKey, task: TileTask) {
        debug_assert_eq!(self.state(key), TileState::Absent, "tile {} launched twice", key);
        log::debug!("Launched {} for tile {}", task.name(), key);
        self.entries.insert(key, CacheEntry::Pending(task));
    }

    /// If the job for `key` has finished, take its tile, place it and mark the key
    /// ready. Returns the resulting state; a failed job leaves the key absent and
    /// returns the error.
    pub fn harvest(&mut self, key: TileKey) -> Result<TileState, StreamingError> {
        let task = match self.entries.remove(&key) {
            Some(CacheEntry::Pending(task)) => task,
            Some(entry) => {
                self.entries.insert(key, entry);
                return Ok(self.state(key));
            }
            None => return Ok(TileState::Absent),
        };

        match task.try_join() {
            Err(task) => {
                self.entries.insert(key, CacheEntry::Pending(task));
                Ok(TileState::Pending)
            }
            Ok(Ok(Ok(mut tile))) => {
                tile.set_position(key.position());
                log::debug!(
                    "Harvested tile {}: {} vertices",
                    key,
                    tile.mesh.vertex_count()
                );
                self.entries.insert(key, CacheEntry::Ready(tile));
                Ok(TileState::Ready)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(StreamingError::WorkerPanicked(key)),
        }
    }

    pub fn get(&self, key: TileKey) -> Option<&Tile> {
        match self.entries.get(&key) {
            Some(CacheEntry::Ready(tile)) => Some(tile),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: TileKey) -> Option<&mut Tile> {
        match self.entries.get_mut(&key) {
            Some(CacheEntry::Ready(tile)) => Some(tile),
            _ => None,
        }
    }

    /// Remove `key`, blocking on its job if one is still running. Returns the tile if
    /// the key was ready.
    pub fn evict(&mut self, key: TileKey) -> Option<Tile> {
        match self.entries.remove(&key)? {
            CacheEntry::Ready(tile) => {
                log::debug!("Evicted tile {}", key);
                Some(tile)
            }
            CacheEntry::Pending(task) => {
                log::debug!("Evicting pending tile {}, waiting for {}", key, task.name());
                if task.join().is_err() {
                    log::error!("Worker for tile {} panicked", key);
                }
                None
            }
        }
    }

    /// Evict every key. Returns the tiles that were ready.
    pub fn clear(&mut self) -> Vec<(TileKey, Tile)> {
        let keys: Vec<TileKey> = self.entries.keys().copied().collect();
        keys.into_iter()
            .filter_map(|key| self.evict(key).map(|tile| (key, tile)))
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = TileKey> + '_ {
        self.entries.keys().copied()
    }

    /// Ready keys at tile coordinates `(x, y)`, any level of detail.
    pub fn ready_at(&self, x: i32, y: i32) -> impl Iterator<Item = TileKey> + '_ {
        self.entries.iter().filter_map(move |(key, entry)| {
            (key.coord() == (x, y) && matches!(entry, CacheEntry::Ready(_))).then_some(*key)
        })
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Pending(_)))
            .count()
    }

    pub fn ready_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Ready(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for TileCache {
    fn drop(&mut self) {
        let pending = self.pending_count();
        if pending > 0 {
            log::debug!("Waiting for {} tile workers before dropping cache", pending);
        }
        self.clear();
    }
}
