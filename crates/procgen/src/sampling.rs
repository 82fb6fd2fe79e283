//! Sampling primitives consumed by tile synthesis: a 2-D noise field, a 1-D height
//! response curve and a color gradient.
//!
//! The synthesis code only sees the traits. The concrete types here wrap the
//! `noise` crate generators and simple control-point tables so a host can build
//! parameters without bringing its own implementations.

use glam::Vec2;
use noise::{NoiseFn, OpenSimplex, Perlin, Simplex, Value};

/// A deterministic 2-D scalar field, roughly in [-1, 1].
pub trait NoiseSource: Send + Sync {
    fn sample(&self, x: f64, y: f64) -> f64;

    /// Seed of the field. Per-octave jitter is derived from it, so the same
    /// noise resource always yields the same tile.
    fn seed(&self) -> u32;
}

/// Maps a normalized height in [0, 1] to a response value (usually also [0, 1]).
pub trait HeightCurve: Send + Sync {
    fn sample(&self, t: f32) -> f32;
}

/// Maps a normalized height in [0, 1] to a linear RGBA color.
pub trait ColorGradient: Send + Sync {
    fn color_at(&self, t: f32) -> [f32; 4];
}

/// Noise generator family backing a [`NoiseField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseKind {
    #[default]
    Perlin,
    Simplex,
    OpenSimplex,
    Value,
}

#[derive(Debug, Clone)]
enum Generator {
    Perlin(Perlin),
    Simplex(Simplex),
    OpenSimplex(OpenSimplex),
    Value(Value),
}

impl Generator {
    fn new(kind: NoiseKind, seed: u32) -> Self {
        match kind {
            NoiseKind::Perlin => Self::Perlin(Perlin::new(seed)),
            NoiseKind::Simplex => Self::Simplex(Simplex::new(seed)),
            NoiseKind::OpenSimplex => Self::OpenSimplex(OpenSimplex::new(seed)),
            NoiseKind::Value => Self::Value(Value::new(seed)),
        }
    }

    fn get(&self, point: [f64; 2]) -> f64 {
        match self {
            Self::Perlin(n) => n.get(point),
            Self::Simplex(n) => n.get(point),
            Self::OpenSimplex(n) => n.get(point),
            Self::Value(n) => n.get(point),
        }
    }
}

/// Seeded noise field with a frequency and a sampling offset.
#[derive(Debug, Clone)]
pub struct NoiseField {
    kind: NoiseKind,
    seed: u32,
    frequency: f64,
    offset: Vec2,
    generator: Generator,
}

impl NoiseField {
    /// Default sampling frequency: one feature every ~100 grid samples.
    pub const DEFAULT_FREQUENCY: f64 = 0.01;

    pub fn new(kind: NoiseKind, seed: u32) -> Self {
        Self {
            kind,
            seed,
            frequency: Self::DEFAULT_FREQUENCY,
            offset: Vec2::ZERO,
            generator: Generator::new(kind, seed),
        }
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}

impl NoiseSource for NoiseField {
    fn sample(&self, x: f64, y: f64) -> f64 {
        let px = (x + self.offset.x as f64) * self.frequency;
        let py = (y + self.offset.y as f64) * self.frequency;
        self.generator.get([px, py])
    }

    fn seed(&self) -> u32 {
        self.seed
    }
}

/// Piecewise-linear response curve over [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    /// Control points `(t, value)`, sorted by `t`.
    points: Vec<Vec2>,
}

impl Default for Curve {
    fn default() -> Self {
        Self::linear()
    }
}

impl Curve {
    /// Identity response: `sample(t) == t`.
    pub fn linear() -> Self {
        Self {
            points: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)],
        }
    }

    /// Build from control points; they are sorted by `t`. An empty list yields the
    /// identity curve.
    pub fn from_points(mut points: Vec<Vec2>) -> Self {
        if points.is_empty() {
            return Self::linear();
        }
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { points }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

impl HeightCurve for Curve {
    fn sample(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let first = self.points[0];
        if t <= first.x {
            return first.y;
        }
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.x {
                let span = b.x - a.x;
                if span <= f32::EPSILON {
                    return b.y;
                }
                return a.y + (b.y - a.y) * ((t - a.x) / span);
            }
        }
        self.points[self.points.len() - 1].y
    }
}

/// How a [`Gradient`] blends between stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Hold each stop's color until the next stop (hard bands).
    Constant,
}

/// Color stops over [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    /// `(offset, rgba)`, sorted by offset.
    stops: Vec<(f32, [f32; 4])>,
    interpolation: Interpolation,
}

impl Default for Gradient {
    fn default() -> Self {
        Self::new(
            vec![(0.0, [0.0, 0.0, 0.0, 1.0]), (1.0, [1.0, 1.0, 1.0, 1.0])],
            Interpolation::Linear,
        )
    }
}

impl Gradient {
    pub fn new(mut stops: Vec<(f32, [f32; 4])>, interpolation: Interpolation) -> Self {
        if stops.is_empty() {
            stops.push((0.0, [1.0, 1.0, 1.0, 1.0]));
        }
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { stops, interpolation }
    }

    /// Banded terrain palette: deep water, shallow water, sand, grass, forest,
    /// rock, dark rock, snow.
    pub fn terrain() -> Self {
        let rgb = |r: u8, g: u8, b: u8| [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0];
        Self::new(
            vec![
                (0.0, rgb(21, 106, 179)),
                (0.3, rgb(72, 151, 219)),
                (0.4, rgb(235, 228, 103)),
                (0.45, rgb(46, 148, 51)),
                (0.55, rgb(35, 105, 38)),
                (0.6, rgb(51, 41, 37)),
                (0.7, rgb(31, 25, 22)),
                (0.9, rgb(255, 255, 255)),
            ],
            Interpolation::Constant,
        )
    }

    pub fn stops(&self) -> &[(f32, [f32; 4])] {
        &self.stops
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

impl ColorGradient for Gradient {
    fn color_at(&self, t: f32) -> [f32; 4] {
        let t = t.clamp(0.0, 1.0);
        let first = self.stops[0];
        if t < first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let ((a_t, a), (b_t, b)) = (pair[0], pair[1]);
            if t < b_t {
                return match self.interpolation {
                    Interpolation::Constant => a,
                    Interpolation::Linear => {
                        let f = (t - a_t) / (b_t - a_t);
                        [
                            a[0] + (b[0] - a[0]) * f,
                            a[1] + (b[1] - a[1]) * f,
                            a[2] + (b[2] - a[2]) * f,
                            a[3] + (b[3] - a[3]) * f,
                        ]
                    }
                };
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}
