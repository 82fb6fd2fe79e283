//! Headless terrain streaming demo: walks a viewer along a path, streams tiles around
//! it and writes the albedo of the tile under the last waypoint to a PNG.

mod config;

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use engine_core::{Transform, Vec3};
use streaming::{Scene, TerrainStreamer, Tile, TileKey};

use crate::config::DemoConfig;

/// Scene stand-in that tracks what a renderer would be drawing.
#[derive(Default)]
struct SceneStats {
    /// Terrain origin, to report tiles in world space.
    origin: Transform,
    attached: usize,
    vertices: usize,
    colliders: usize,
}

impl Scene for SceneStats {
    fn attach(&mut self, key: TileKey, tile: &Tile) {
        log::trace!("attach {} at {:?}", key, self.origin.transform_point(tile.position()));
        self.attached += 1;
        self.vertices += tile.mesh.vertex_count();
        self.colliders += tile.collider.is_some() as usize;
    }

    fn detach(&mut self, key: TileKey, tile: &Tile) {
        log::trace!("detach {}", key);
        self.attached -= 1;
        self.vertices -= tile.mesh.vertex_count();
        self.colliders -= tile.collider.is_some() as usize;
    }
}

/// Tick until every tile the viewer wants is ready, or the tick budget runs out.
fn settle(streamer: &mut TerrainStreamer, scene: &mut SceneStats, config: &DemoConfig) -> u32 {
    let interval = Duration::from_millis(config.tick_interval_ms);
    let wanted = streamer.desired_tiles();
    for tick in 1..=config.ticks_per_waypoint {
        streamer.tick(scene);
        let done = wanted.iter().all(|key| streamer.visible().contains(key));
        if done {
            return tick;
        }
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
    log::warn!(
        "Gave up waiting after {} ticks ({} tiles still pending)",
        config.ticks_per_waypoint,
        streamer.pending_count()
    );
    config.ticks_per_waypoint
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(config::default_path);
    let config = DemoConfig::load(&config_path);
    log::info!("Streaming {} rings along {} waypoints", config.detail_levels.len(), config.viewer_path.len());

    let mut streamer = TerrainStreamer::new(config.generation_parameters(), config.streaming_config());
    let mut scene = SceneStats {
        origin: streamer.origin(),
        ..Default::default()
    };
    let start = Instant::now();

    let (first, rest) = config
        .viewer_path
        .split_first()
        .context("viewer_path must contain at least one waypoint")?;
    streamer.bind_viewer(Vec3::new(first.0, 0.0, first.1));

    for (i, &(x, z)) in std::iter::once(first).chain(rest).enumerate() {
        streamer.set_viewer_position(Vec3::new(x, 0.0, z));
        let ticks = settle(&mut streamer, &mut scene, &config);
        log::info!(
            "Waypoint {} ({}, {}): {} ticks, {} tiles visible, {} vertices, {} colliders, {} cached",
            i,
            x,
            z,
            ticks,
            scene.attached,
            scene.vertices,
            scene.colliders,
            streamer.ready_count()
        );
    }

    let (tx, ty) = streamer.viewer_tile().context("viewer is not bound")?;
    let key = streamer
        .visible()
        .iter()
        .copied()
        .find(|k| k.coord() == (tx, ty))
        .with_context(|| format!("no tile visible under the viewer at ({}, {})", tx, ty))?;
    let tile = streamer.tile(key).context("visible tile missing from cache")?;
    tile.material
        .albedo
        .save_png(&config.output)
        .with_context(|| format!("failed to write {:?}", config.output))?;

    log::info!(
        "Wrote albedo of tile {} to {:?} after {:.2?}",
        key,
        config.output,
        start.elapsed()
    );
    Ok(())
}
