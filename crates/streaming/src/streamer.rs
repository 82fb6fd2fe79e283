//! Per-tick scheduler: decides which tiles exist around the viewer, at which level of
//! detail, and which of them are attached to the scene.

use std::collections::{HashMap, HashSet};

use engine_core::{Transform, Vec3};
use procgen::{GenerationParameters, TILE_SIZE};

use crate::cache::{TileCache, TileState};
use crate::config::StreamingConfig;
use crate::error::StreamingError;
use crate::scene::Scene;
use crate::task::TaskHandle;
use crate::tile::{generate_tile, Tile, TileKey};

/// Streams terrain tiles around a single viewer.
///
/// All state is owned by the thread calling [`TerrainStreamer::tick`]; workers only
/// see their own parameter snapshot.
pub struct TerrainStreamer {
    parameters: GenerationParameters,
    config: StreamingConfig,
    /// Terrain origin. Tile positions are relative to it.
    origin: Transform,
    viewer: Option<Vec3>,
    cache: TileCache,
    /// Keys attached to the scene since the last tick.
    visible: Vec<TileKey>,
    /// Evicted tiles still attached to the scene, detached on the next tick.
    retired: Vec<(TileKey, Tile)>,
    /// Keys whose generation failed; not retried until the parameters change.
    failed: HashSet<TileKey>,
    invalid_parameters_reported: bool,
}

impl TerrainStreamer {
    pub fn new(parameters: GenerationParameters, mut config: StreamingConfig) -> Self {
        config.sanitize();
        Self {
            parameters,
            config,
            origin: Transform::default(),
            viewer: None,
            cache: TileCache::new(),
            visible: Vec::new(),
            retired: Vec::new(),
            failed: HashSet::new(),
            invalid_parameters_reported: false,
        }
    }

    pub fn parameters(&self) -> &GenerationParameters {
        &self.parameters
    }

    /// Replace the parameters. Every cached tile is discarded.
    pub fn set_parameters(&mut self, parameters: GenerationParameters) {
        self.parameters = parameters;
        self.invalidate();
    }

    /// Edit the parameters in place. Every cached tile is discarded.
    pub fn update_parameters(&mut self, update: impl FnOnce(&mut GenerationParameters)) {
        update(&mut self.parameters);
        self.invalidate();
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Replace the streaming configuration. Cached tiles survive unless the collider
    /// shape changed.
    pub fn set_config(&mut self, mut config: StreamingConfig) {
        config.sanitize();
        let colliders_changed = config.colliders != self.config.colliders;
        self.config = config;
        if colliders_changed {
            self.invalidate();
        }
    }

    pub fn origin(&self) -> Transform {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Transform) {
        self.origin = origin;
    }

    /// Bind a new viewer. Tiles generated for a previous viewer are discarded.
    pub fn bind_viewer(&mut self, position: Vec3) {
        if !self.cache.is_empty() {
            log::info!("New viewer bound, discarding {} tiles", self.cache.len());
        }
        self.evict_all();
        self.viewer = Some(position);
    }

    /// Move the bound viewer.
    pub fn set_viewer_position(&mut self, position: Vec3) {
        match &mut self.viewer {
            Some(viewer) => *viewer = position,
            None => log::warn!("No viewer bound, ignoring position {:?}", position),
        }
    }

    /// Stop streaming. Cached tiles are kept, but nothing is shown.
    pub fn unbind_viewer(&mut self) {
        self.viewer = None;
    }

    pub fn viewer(&self) -> Option<Vec3> {
        self.viewer
    }

    /// Tile coordinates under the viewer, accounting for the origin's scale.
    /// `None` when no viewer is bound or its offset is not finite (e.g. a zero scale).
    pub fn viewer_tile(&self) -> Option<(i32, i32)> {
        let local = (self.origin.local_horizontal_offset(self.viewer?) / TILE_SIZE).round();
        if !local.is_finite() {
            return None;
        }
        Some((local.x as i32, local.y as i32))
    }

    /// Keys the viewer currently wants, nearest ring first.
    pub fn desired_tiles(&self) -> Vec<TileKey> {
        self.viewer_tile()
            .map(|center| ring_keys(center, &self.config.detail_levels))
            .unwrap_or_default()
    }

    pub fn state(&self, key: TileKey) -> TileState {
        self.cache.state(key)
    }

    pub fn tile(&self, key: TileKey) -> Option<&Tile> {
        self.cache.get(key)
    }

    /// Keys attached during the last tick.
    pub fn visible(&self) -> &[TileKey] {
        &self.visible
    }

    pub fn pending_count(&self) -> usize {
        self.cache.pending_count()
    }

    pub fn ready_count(&self) -> usize {
        self.cache.ready_count()
    }

    /// Discard every cached tile, waiting for running workers, and forget failures.
    pub fn invalidate(&mut self) {
        log::info!("Terrain parameters changed, discarding {} tiles", self.cache.len());
        self.evict_all();
        self.failed.clear();
        self.invalid_parameters_reported = false;
    }

    /// Advance streaming by one step.
    pub fn tick(&mut self, scene: &mut dyn Scene) {
        self.hide_visible(scene);

        let Some(center) = self.viewer_tile() else {
            return;
        };
        let desired = ring_keys(center, &self.config.detail_levels);
        let can_launch = self.parameters_usable();
        let mut launches = 0;

        for &key in &desired {
            match self.cache.state(key) {
                TileState::Pending => self.harvest(key),
                TileState::Absent if can_launch && !self.failed.contains(&key) => {
                    let within_budget = self
                        .config
                        .max_launches_per_tick
                        .map_or(true, |max| launches < max);
                    if within_budget {
                        self.launch(key);
                        launches += 1;
                    }
                }
                _ => {}
            }
        }

        self.retire(&desired);

        for &key in &desired {
            let shown = match self.cache.state(key) {
                TileState::Ready => Some(key),
                _ => self.fallback(key),
            };
            if let Some(shown) = shown {
                self.show(shown, scene);
            }
        }
    }

    fn hide_visible(&mut self, scene: &mut dyn Scene) {
        for key in self.visible.drain(..) {
            if let Some(tile) = self.cache.get_mut(key) {
                tile.set_visible(false);
                scene.detach(key, tile);
            }
        }
        for (key, mut tile) in self.retired.drain(..) {
            tile.set_visible(false);
            scene.detach(key, &tile);
        }
    }

    fn show(&mut self, key: TileKey, scene: &mut dyn Scene) {
        if let Some(tile) = self.cache.get_mut(key) {
            tile.set_visible(true);
            scene.attach(key, tile);
            self.visible.push(key);
        }
    }

    /// Missing subresources stop all launches; reported once per parameter set.
    fn parameters_usable(&mut self) -> bool {
        match self.parameters.sources() {
            Ok(_) => true,
            Err(e) => {
                if !self.invalid_parameters_reported {
                    log::warn!("Not generating terrain: {}", e);
                    self.invalid_parameters_reported = true;
                }
                false
            }
        }
    }

    fn launch(&mut self, key: TileKey) {
        let snapshot = self.parameters.for_tile(key.offset(), key.lod);
        let colliders = self.config.colliders;
        let job = move || generate_tile(&snapshot, colliders);

        match TaskHandle::spawn(self.config.executor, key.task_name(), job) {
            Ok(task) => self.cache.insert_pending(key, task),
            Err(source) => {
                log::error!("{}", StreamingError::Spawn { key, source });
                self.failed.insert(key);
            }
        }
    }

    fn harvest(&mut self, key: TileKey) {
        if let Err(e) = self.cache.harvest(key) {
            log::error!("Generation of tile {} failed: {}", key, e);
            self.failed.insert(key);
        }
    }

    /// Ready tile at the same coordinates to show while `key` is not ready, closest
    /// level of detail first.
    fn fallback(&self, key: TileKey) -> Option<TileKey> {
        self.cache
            .ready_at(key.x, key.y)
            .min_by_key(|k| (k.lod.abs_diff(key.lod), std::cmp::Reverse(k.lod)))
    }

    /// Evict keys whose coordinates are no longer wanted, and stale levels of detail
    /// once the wanted one is ready. A stale key that is still pending is evicted at
    /// once. Failures of keys that are no longer wanted are forgotten.
    fn retire(&mut self, desired: &[TileKey]) {
        let wanted: HashMap<(i32, i32), u32> = desired.iter().map(|k| (k.coord(), k.lod)).collect();
        let stale: Vec<TileKey> = self
            .cache
            .keys()
            .filter(|key| match wanted.get(&key.coord()) {
                None => true,
                Some(&lod) if lod == key.lod => false,
                Some(&lod) => {
                    self.cache.state(TileKey { lod, ..*key }) == TileState::Ready
                        || self.cache.state(*key) == TileState::Pending
                }
            })
            .collect();

        for key in stale {
            self.evict(key);
        }
        self.failed.retain(|key| wanted.get(&key.coord()) == Some(&key.lod));
    }

    fn evict(&mut self, key: TileKey) {
        let Some(tile) = self.cache.evict(key) else {
            return;
        };
        if let Some(index) = self.visible.iter().position(|k| *k == key) {
            self.visible.swap_remove(index);
            self.retired.push((key, tile));
        }
    }

    fn evict_all(&mut self) {
        let keys: Vec<TileKey> = self.cache.keys().collect();
        for key in keys {
            self.evict(key);
        }
    }
}

/// Keys on the square rings around `center`: ring `r` holds the offsets at
/// Chebyshev distance exactly `r`, at level of detail `detail_levels[r]`.
/// Coordinates outside the `i32` range are skipped.
pub fn ring_keys(center: (i32, i32), detail_levels: &[u32]) -> Vec<TileKey> {
    let mut keys = Vec::new();
    for (ring, &lod) in detail_levels.iter().enumerate() {
        let r = ring as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx.abs().max(dy.abs()) != r {
                    continue;
                }
                if let (Some(x), Some(y)) = (center.0.checked_add(dx), center.1.checked_add(dy)) {
                    keys.push(TileKey::new(x, y, lod));
                }
            }
        }
    }
    keys
}
