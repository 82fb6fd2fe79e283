//! Demo configuration. Loaded from `terrain.ron` at startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec2;
use physics::ColliderShape;
use procgen::{Curve, GenerationMode, GenerationParameters, Gradient, Interpolation, NoiseField, NoiseKind};
use serde::{Deserialize, Serialize};
use streaming::{Executor, StreamingConfig};

/// Noise generator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseType {
    #[default]
    Perlin,
    Simplex,
    OpenSimplex,
    Value,
}

impl From<NoiseType> for NoiseKind {
    fn from(value: NoiseType) -> Self {
        match value {
            NoiseType::Perlin => NoiseKind::Perlin,
            NoiseType::Simplex => NoiseKind::Simplex,
            NoiseType::OpenSimplex => NoiseKind::OpenSimplex,
            NoiseType::Value => NoiseKind::Value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    #[serde(default)]
    pub kind: NoiseType,
    #[serde(default = "default_seed")]
    pub seed: u32,
    #[serde(default = "default_frequency")]
    pub frequency: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            kind: NoiseType::default(),
            seed: default_seed(),
            frequency: default_frequency(),
        }
    }
}

/// Built-in color gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradientPreset {
    /// Banded water, sand, grass, rock and snow.
    #[default]
    Terrain,
    /// Black at sea level to white at the peaks.
    Grayscale,
}

impl GradientPreset {
    fn build(self) -> Gradient {
        match self {
            Self::Terrain => Gradient::terrain(),
            Self::Grayscale => Gradient::new(
                vec![(0.0, [0.0, 0.0, 0.0, 1.0]), (1.0, [1.0, 1.0, 1.0, 1.0])],
                Interpolation::Linear,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Normal,
    FalloffOnly,
    NoiseUnshaded,
    NoiseShaded,
}

impl From<Mode> for GenerationMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Normal => GenerationMode::Normal,
            Mode::FalloffOnly => GenerationMode::FalloffOnly,
            Mode::NoiseUnshaded => GenerationMode::NoiseUnshaded,
            Mode::NoiseShaded => GenerationMode::NoiseShaded,
        }
    }
}

/// Where tiles are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Workers {
    /// One thread per tile.
    #[default]
    Threaded,
    /// On the streaming thread, inside each tick.
    Inline,
}

impl From<Workers> for Executor {
    fn from(value: Workers) -> Self {
        match value {
            Workers::Threaded => Executor::Threaded,
            Workers::Inline => Executor::Inline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Colliders {
    TriMesh,
    HeightField,
}

impl From<Colliders> for ColliderShape {
    fn from(value: Colliders) -> Self {
        match value {
            Colliders::TriMesh => ColliderShape::TriMesh,
            Colliders::HeightField => ColliderShape::HeightField,
        }
    }
}

/// Demo settings: terrain synthesis, streaming and the viewer's route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub noise: NoiseConfig,
    /// Height response control points `(height, response)`.
    #[serde(default = "default_height_curve")]
    pub height_curve: Vec<(f32, f32)>,
    #[serde(default)]
    pub gradient: GradientPreset,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    #[serde(default = "default_height_scale")]
    pub height_scale: f32,
    /// Falloff exponents `(a, b)`; `(0, 0)` disables it.
    #[serde(default)]
    pub falloff: (f32, f32),
    #[serde(default)]
    pub flat_shading: bool,
    #[serde(default)]
    pub mode: Mode,
    /// Level of detail per ring around the viewer, nearest first.
    #[serde(default = "default_detail_levels")]
    pub detail_levels: Vec<u32>,
    #[serde(default)]
    pub executor: Workers,
    #[serde(default = "default_launch_budget")]
    pub max_launches_per_tick: Option<usize>,
    #[serde(default)]
    pub colliders: Option<Colliders>,
    /// Horizontal `(x, z)` waypoints the viewer visits in order.
    #[serde(default = "default_viewer_path")]
    pub viewer_path: Vec<(f32, f32)>,
    /// Upper bound on ticks spent at each waypoint waiting for tiles.
    #[serde(default = "default_ticks_per_waypoint")]
    pub ticks_per_waypoint: u32,
    /// Pause between ticks, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Where the albedo of the tile under the final waypoint is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_seed() -> u32 {
    1337
}
fn default_frequency() -> f64 {
    NoiseField::DEFAULT_FREQUENCY
}
fn default_height_curve() -> Vec<(f32, f32)> {
    vec![(0.0, 0.0), (0.3, 0.02), (0.5, 0.15), (1.0, 1.0)]
}
fn default_octaves() -> u32 {
    4
}
fn default_persistence() -> f32 {
    0.5
}
fn default_lacunarity() -> f32 {
    2.0
}
fn default_height_scale() -> f32 {
    40.0
}
fn default_detail_levels() -> Vec<u32> {
    vec![6, 4, 2]
}
fn default_launch_budget() -> Option<usize> {
    Some(4)
}
fn default_viewer_path() -> Vec<(f32, f32)> {
    vec![(0.0, 0.0), (240.0, 0.0), (480.0, 240.0)]
}
fn default_ticks_per_waypoint() -> u32 {
    600
}
fn default_tick_interval_ms() -> u64 {
    16
}
fn default_output() -> PathBuf {
    PathBuf::from("terrain_tile.png")
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            noise: NoiseConfig::default(),
            height_curve: default_height_curve(),
            gradient: GradientPreset::default(),
            octaves: default_octaves(),
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
            height_scale: default_height_scale(),
            falloff: (0.0, 0.0),
            flat_shading: false,
            mode: Mode::default(),
            detail_levels: default_detail_levels(),
            executor: Workers::default(),
            max_launches_per_tick: default_launch_budget(),
            colliders: None,
            viewer_path: default_viewer_path(),
            ticks_per_waypoint: default_ticks_per_waypoint(),
            tick_interval_ms: default_tick_interval_ms(),
            output: default_output(),
        }
    }
}

impl DemoConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::info!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }

    /// Generation parameters with every subresource built from this config.
    pub fn generation_parameters(&self) -> GenerationParameters {
        let noise = NoiseField::new(self.noise.kind.into(), self.noise.seed).with_frequency(self.noise.frequency);
        let curve = if self.height_curve.is_empty() {
            Curve::linear()
        } else {
            Curve::from_points(self.height_curve.iter().map(|&(x, y)| Vec2::new(x, y)).collect())
        };

        let mut parameters =
            GenerationParameters::new(Arc::new(noise), Arc::new(curve), Arc::new(self.gradient.build()));
        parameters.set_octaves(self.octaves);
        parameters.persistence = self.persistence;
        parameters.lacunarity = self.lacunarity;
        parameters.height_scale = self.height_scale;
        parameters.falloff = Vec2::new(self.falloff.0, self.falloff.1);
        parameters.flat_shading = self.flat_shading;
        parameters.mode = self.mode.into();
        parameters
    }

    pub fn streaming_config(&self) -> StreamingConfig {
        StreamingConfig {
            detail_levels: self.detail_levels.clone(),
            max_launches_per_tick: self.max_launches_per_tick,
            executor: self.executor.into(),
            colliders: self.colliders.map(Into::into),
        }
    }
}

pub fn default_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("terrain.ron")
}
