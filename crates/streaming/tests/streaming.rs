use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use engine_core::Vec3;
use glam::Vec2;
use physics::ColliderShape;
use procgen::{Curve, GenerationParameters, Gradient, NoiseField, NoiseKind, NoiseSource, TILE_SIZE};
use streaming::{AttachedKeys, Executor, StreamingConfig, TerrainStreamer, TileKey, TileState};

/// Noise that counts how many tiles were synthesized from it.
struct CountingNoise {
    inner: NoiseField,
    generations: Arc<AtomicUsize>,
}

impl NoiseSource for CountingNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.inner.sample(x, y)
    }

    fn seed(&self) -> u32 {
        self.generations.fetch_add(1, Ordering::SeqCst);
        self.inner.seed()
    }
}

struct PanickingNoise;

impl NoiseSource for PanickingNoise {
    fn sample(&self, _x: f64, _y: f64) -> f64 {
        panic!("noise backend unavailable")
    }

    fn seed(&self) -> u32 {
        0
    }
}

/// Noise that holds every worker in `sample` until the gate opens.
struct GatedNoise {
    inner: NoiseField,
    generations: Arc<AtomicUsize>,
    gate: Arc<Gate>,
}

#[derive(Default)]
struct Gate {
    open: AtomicBool,
    lock: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    fn wait(&self) {
        if self.open.load(Ordering::Acquire) {
            return;
        }
        let mut open = self.lock.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
    }

    fn release(&self) {
        *self.lock.lock().unwrap() = true;
        self.open.store(true, Ordering::Release);
        self.opened.notify_all();
    }
}

impl NoiseSource for GatedNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.gate.wait();
        self.inner.sample(x, y)
    }

    fn seed(&self) -> u32 {
        self.generations.fetch_add(1, Ordering::SeqCst);
        self.inner.seed()
    }
}

fn parameters() -> GenerationParameters {
    let mut parameters = GenerationParameters::new(
        Arc::new(NoiseField::new(NoiseKind::Perlin, 42)),
        Arc::new(Curve::linear()),
        Arc::new(Gradient::terrain()),
    );
    parameters.octaves = 2;
    parameters
}

fn counting_parameters() -> (GenerationParameters, Arc<AtomicUsize>) {
    let generations = Arc::new(AtomicUsize::new(0));
    let mut parameters = parameters();
    parameters.noise = Some(Arc::new(CountingNoise {
        inner: NoiseField::new(NoiseKind::Perlin, 42),
        generations: generations.clone(),
    }));
    (parameters, generations)
}

fn inline_streamer(parameters: GenerationParameters, detail_levels: &[u32]) -> TerrainStreamer {
    let config = StreamingConfig::with_detail_levels(detail_levels).with_executor(Executor::Inline);
    TerrainStreamer::new(parameters, config)
}

fn assert_only_ready_tiles_shown(streamer: &TerrainStreamer, scene: &AttachedKeys) {
    assert_eq!(scene.keys().len(), streamer.visible().len());
    for &key in scene.keys() {
        assert_eq!(streamer.state(key), TileState::Ready, "tile {} shown before it was ready", key);
        assert!(streamer.tile(key).unwrap().is_visible());
    }
}

#[test]
fn single_ring_at_origin_goes_pending_then_ready() {
    let mut streamer = inline_streamer(parameters(), &[0]);
    let mut scene = AttachedKeys::new();
    let origin = TileKey::new(0, 0, 0);
    streamer.bind_viewer(Vec3::ZERO);

    streamer.tick(&mut scene);
    assert_eq!(streamer.state(origin), TileState::Pending);
    assert_eq!(streamer.pending_count(), 1);
    assert!(scene.is_empty());

    streamer.tick(&mut scene);
    assert_eq!(streamer.state(origin), TileState::Ready);
    assert_eq!(streamer.visible(), &[origin]);
    assert_eq!(scene.keys(), &[origin]);
    assert_eq!(streamer.tile(origin).unwrap().position(), Vec3::ZERO);

    streamer.tick(&mut scene);
    assert_eq!(scene.keys(), &[origin]);
    assert_eq!((streamer.pending_count(), streamer.ready_count()), (0, 1));
}

#[test]
fn nothing_streams_without_a_viewer() {
    let mut streamer = inline_streamer(parameters(), &[0, 0]);
    let mut scene = AttachedKeys::new();
    for _ in 0..3 {
        streamer.tick(&mut scene);
    }
    assert_eq!(streamer.pending_count() + streamer.ready_count(), 0);
    assert!(scene.is_empty());

    streamer.bind_viewer(Vec3::ZERO);
    streamer.tick(&mut scene);
    streamer.tick(&mut scene);
    assert_eq!(scene.len(), 9);

    streamer.unbind_viewer();
    streamer.tick(&mut scene);
    assert!(scene.is_empty());
    assert!(streamer.visible().is_empty());
    assert_eq!(streamer.ready_count(), 9);
}

#[test]
fn ready_tiles_are_never_regenerated() {
    let (parameters, generations) = counting_parameters();
    let mut streamer = inline_streamer(parameters, &[2, 0]);
    let mut scene = AttachedKeys::new();
    streamer.bind_viewer(Vec3::new(10.0, 0.0, -10.0));

    streamer.tick(&mut scene);
    assert_eq!(generations.load(Ordering::SeqCst), 9);
    assert_only_ready_tiles_shown(&streamer, &scene);

    for _ in 0..4 {
        streamer.tick(&mut scene);
        assert_only_ready_tiles_shown(&streamer, &scene);
    }
    assert_eq!(generations.load(Ordering::SeqCst), 9);
    assert_eq!(streamer.ready_count(), 9);
    assert_eq!(scene.len(), 9);
}

#[test]
fn moving_one_tile_evicts_trailing_edge() {
    let mut streamer = inline_streamer(parameters(), &[0, 0]);
    let mut scene = AttachedKeys::new();
    streamer.bind_viewer(Vec3::ZERO);
    streamer.tick(&mut scene);
    streamer.tick(&mut scene);
    assert_eq!(streamer.ready_count(), 9);

    streamer.set_viewer_position(Vec3::new(TILE_SIZE, 0.0, 0.0));
    streamer.tick(&mut scene);

    for y in -1..=1 {
        assert_eq!(streamer.state(TileKey::new(-1, y, 0)), TileState::Absent);
        assert_eq!(streamer.state(TileKey::new(2, y, 0)), TileState::Pending);
        for x in 0..=1 {
            assert_eq!(streamer.state(TileKey::new(x, y, 0)), TileState::Ready);
        }
    }
    assert_eq!(scene.len(), 6);
    assert!(!scene.contains(TileKey::new(-1, 0, 0)));
    assert_only_ready_tiles_shown(&streamer, &scene);

    streamer.tick(&mut scene);
    assert_eq!(scene.len(), 9);
    assert_eq!(streamer.tile(TileKey::new(2, 1, 0)).unwrap().position(), Vec3::new(480.0, 0.0, 240.0));
}

#[test]
fn curve_change_invalidates_every_tile() {
    let mut streamer = inline_streamer(parameters(), &[0, 0]);
    let mut scene = AttachedKeys::new();
    streamer.bind_viewer(Vec3::ZERO);
    streamer.tick(&mut scene);
    streamer.tick(&mut scene);
    assert_eq!(scene.len(), 9);

    streamer.update_parameters(|p| {
        p.height_curve = Some(Arc::new(Curve::from_points(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.5)])));
    });
    let keys = streamer.desired_tiles();
    assert!(keys.iter().all(|&k| streamer.state(k) == TileState::Absent));

    streamer.tick(&mut scene);
    assert!(scene.is_empty());
    assert!(keys.iter().all(|&k| streamer.state(k) == TileState::Pending));

    streamer.tick(&mut scene);
    assert_eq!(scene.len(), 9);
    assert_only_ready_tiles_shown(&streamer, &scene);
}

#[test]
fn previous_lod_is_shown_until_new_lod_is_ready() {
    let mut streamer = inline_streamer(parameters(), &[1]);
    let mut scene = AttachedKeys::new();
    streamer.bind_viewer(Vec3::ZERO);
    streamer.tick(&mut scene);
    streamer.tick(&mut scene);
    let coarse = TileKey::new(0, 0, 1);
    let fine = TileKey::new(0, 0, 2);
    assert_eq!(scene.keys(), &[coarse]);

    let mut config = streamer.config().clone();
    config.detail_levels = vec![2];
    streamer.set_config(config);

    streamer.tick(&mut scene);
    assert_eq!(streamer.state(fine), TileState::Pending);
    assert_eq!(scene.keys(), &[coarse]);

    streamer.tick(&mut scene);
    assert_eq!(scene.keys(), &[fine]);
    assert_eq!(streamer.state(coarse), TileState::Absent);
}

#[test]
fn missing_subresources_launch_nothing() {
    let mut incomplete = parameters();
    incomplete.noise = None;
    let mut streamer = inline_streamer(incomplete, &[0]);
    let mut scene = AttachedKeys::new();
    streamer.bind_viewer(Vec3::ZERO);

    streamer.tick(&mut scene);
    streamer.tick(&mut scene);
    assert_eq!(streamer.pending_count() + streamer.ready_count(), 0);

    streamer.set_parameters(parameters());
    streamer.tick(&mut scene);
    assert_eq!(streamer.pending_count(), 1);
}

#[test]
fn launch_budget_spreads_work_across_ticks() {
    let mut config = StreamingConfig::with_detail_levels([0, 0]).with_executor(Executor::Inline);
    config.max_launches_per_tick = Some(4);
    let mut streamer = TerrainStreamer::new(parameters(), config);
    let mut scene = AttachedKeys::new();
    streamer.bind_viewer(Vec3::ZERO);

    streamer.tick(&mut scene);
    assert_eq!(streamer.pending_count(), 4);
    assert_eq!(streamer.state(TileKey::new(0, 0, 0)), TileState::Pending);

    streamer.tick(&mut scene);
    assert_eq!((streamer.ready_count(), streamer.pending_count()), (4, 4));

    streamer.tick(&mut scene);
    streamer.tick(&mut scene);
    assert_eq!(streamer.ready_count(), 9);
}

#[test]
fn failed_tiles_wait_for_new_parameters() {
    let mut failing = parameters();
    failing.noise = Some(Arc::new(PanickingNoise));
    let mut streamer = inline_streamer(failing, &[0]);
    let mut scene = AttachedKeys::new();
    let origin = TileKey::new(0, 0, 0);
    streamer.bind_viewer(Vec3::ZERO);

    streamer.tick(&mut scene);
    assert_eq!(streamer.state(origin), TileState::Pending);
    streamer.tick(&mut scene);
    assert_eq!(streamer.state(origin), TileState::Absent);
    streamer.tick(&mut scene);
    assert_eq!(streamer.state(origin), TileState::Absent);
    assert!(scene.is_empty());

    streamer.set_parameters(parameters());
    streamer.tick(&mut scene);
    assert_eq!(streamer.state(origin), TileState::Pending);
}

#[test]
fn colliders_follow_their_tiles() {
    let mut config = StreamingConfig::with_detail_levels([0, 0]).with_executor(Executor::Inline);
    config.colliders = Some(ColliderShape::TriMesh);
    let mut streamer = TerrainStreamer::new(parameters(), config);
    let mut scene = AttachedKeys::new();
    streamer.bind_viewer(Vec3::ZERO);
    streamer.tick(&mut scene);
    streamer.tick(&mut scene);

    let tile = streamer.tile(TileKey::new(1, -1, 0)).unwrap();
    let collider = tile.collider.as_ref().unwrap();
    assert_eq!(collider.translation().x, 240.0);
    assert_eq!(collider.translation().z, -240.0);
}

#[test]
fn threaded_workers_complete_without_blocking_ticks() {
    let config = StreamingConfig::with_detail_levels([0, 0]);
    let mut streamer = TerrainStreamer::new(parameters(), config);
    let mut scene = AttachedKeys::new();
    streamer.bind_viewer(Vec3::ZERO);

    let deadline = Instant::now() + Duration::from_secs(60);
    while scene.len() < 9 {
        assert!(Instant::now() < deadline, "tiles not ready in time");
        streamer.tick(&mut scene);
        assert_only_ready_tiles_shown(&streamer, &scene);
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(streamer.pending_count(), 0);
}

#[test]
fn dropping_streamer_joins_pending_workers() {
    let config = StreamingConfig::with_detail_levels([6, 6]);
    let mut streamer = TerrainStreamer::new(parameters(), config);
    let mut scene = AttachedKeys::new();
    streamer.bind_viewer(Vec3::ZERO);
    streamer.tick(&mut scene);
    assert!(streamer.pending_count() + streamer.ready_count() > 0);
    drop(streamer);
}

#[test]
fn running_worker_is_not_relaunched() {
    let generations = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Gate::default());
    let mut gated = parameters();
    gated.noise = Some(Arc::new(GatedNoise {
        inner: NoiseField::new(NoiseKind::Perlin, 42),
        generations: generations.clone(),
        gate: gate.clone(),
    }));
    let mut streamer = TerrainStreamer::new(gated, StreamingConfig::with_detail_levels([0]));
    let mut scene = AttachedKeys::new();
    let origin = TileKey::new(0, 0, 0);
    streamer.bind_viewer(Vec3::ZERO);

    streamer.tick(&mut scene);
    let deadline = Instant::now() + Duration::from_secs(10);
    while generations.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    for _ in 0..5 {
        streamer.tick(&mut scene);
        thread::sleep(Duration::from_millis(2));
    }
    let launches = generations.load(Ordering::SeqCst);
    let state = streamer.state(origin);
    let shown = scene.len();
    gate.release();

    assert_eq!(launches, 1);
    assert_eq!(state, TileState::Pending);
    assert_eq!(shown, 0);

    let deadline = Instant::now() + Duration::from_secs(60);
    while !scene.contains(origin) {
        assert!(Instant::now() < deadline, "tile not ready in time");
        streamer.tick(&mut scene);
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(generations.load(Ordering::SeqCst), 1);
}

#[test]
fn failures_are_forgotten_once_out_of_range() {
    let mut failing = parameters();
    failing.noise = Some(Arc::new(PanickingNoise));
    let mut streamer = inline_streamer(failing, &[0]);
    let mut scene = AttachedKeys::new();
    let origin = TileKey::new(0, 0, 0);
    streamer.bind_viewer(Vec3::ZERO);

    streamer.tick(&mut scene);
    streamer.tick(&mut scene);
    streamer.tick(&mut scene);
    assert_eq!(streamer.state(origin), TileState::Absent);

    streamer.set_viewer_position(Vec3::new(5.0 * TILE_SIZE, 0.0, 0.0));
    streamer.tick(&mut scene);
    assert_eq!(streamer.state(TileKey::new(5, 0, 0)), TileState::Pending);

    streamer.set_viewer_position(Vec3::ZERO);
    streamer.tick(&mut scene);
    assert_eq!(streamer.state(origin), TileState::Pending);
    assert_eq!(streamer.state(TileKey::new(5, 0, 0)), TileState::Absent);
}
