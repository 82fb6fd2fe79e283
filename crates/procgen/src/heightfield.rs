//! Height field synthesis from fractal noise.
//!
//! **Seamless tiling:** heights are normalized against the theoretical amplitude bound
//! of the octave stack, not against the observed min/max of one tile, so two adjacent
//! tiles agree on the height of their shared edge.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::{MAX_OCTAVES, MIN_OCTAVES};
use crate::sampling::NoiseSource;

/// Samples per side of a tile's height grid.
pub const GRID_SIZE: usize = 241;

/// World-space width of one tile (the grid spans `GRID_SIZE - 1` unit quads).
pub const TILE_SIZE: f32 = (GRID_SIZE - 1) as f32;

/// Range of the per-octave random sampling offsets.
const MAX_OCTAVE_OFFSET: f64 = 100_000.0;

/// Fraction of the theoretical bound mapped to the [0, 1] range. Below 1 so typical
/// terrain uses the full range instead of crowding around 0.5.
const NORMALIZATION_FACTOR: f64 = 0.9;

/// Square grid of scalar samples, row-major (`index = y * size + x`).
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    size: usize,
    values: Vec<f32>,
}

impl HeightGrid {
    /// A grid of `size * size` zeros.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Wrap existing row-major values. Returns `None` if the length is not `size * size`.
    pub fn from_values(size: usize, values: Vec<f32>) -> Option<Self> {
        (values.len() == size * size).then_some(Self { size, values })
    }

    /// Synthesize a full-size tile. See [`HeightGrid::generate_sized`].
    pub fn generate(
        octaves: u32,
        noise: &dyn NoiseSource,
        persistence: f32,
        lacunarity: f32,
        offset: Vec2,
    ) -> Self {
        Self::generate_sized(GRID_SIZE, octaves, noise, persistence, lacunarity, offset)
    }

    /// Sum `octaves` layers of noise over a `size * size` grid and normalize to [0, 1].
    ///
    /// Octave `o` has amplitude `persistence^o` and frequency `lacunarity^o`, and is
    /// sampled at a random offset drawn from a stream seeded by the noise seed, plus
    /// the tile `offset`. Identical inputs always produce identical grids.
    pub fn generate_sized(
        size: usize,
        octaves: u32,
        noise: &dyn NoiseSource,
        persistence: f32,
        lacunarity: f32,
        offset: Vec2,
    ) -> Self {
        let octaves = octaves.clamp(MIN_OCTAVES, MAX_OCTAVES) as usize;
        let persistence = persistence as f64;
        let lacunarity = lacunarity as f64;

        let mut rng = StdRng::seed_from_u64(noise.seed() as u64);
        let mut octave_offsets = Vec::with_capacity(octaves);
        let mut bound = 0.0;
        let mut amplitude = 1.0_f64;
        for _ in 0..octaves {
            let ox = rng.gen_range(-MAX_OCTAVE_OFFSET..MAX_OCTAVE_OFFSET) + offset.x as f64;
            let oy = rng.gen_range(-MAX_OCTAVE_OFFSET..MAX_OCTAVE_OFFSET) + offset.y as f64;
            octave_offsets.push((ox, oy));
            bound += amplitude.abs();
            amplitude *= persistence;
        }

        let half = size as f64 / 2.0;
        let bound = bound * NORMALIZATION_FACTOR;
        let mut values = Vec::with_capacity(size * size);

        for y in 0..size {
            for x in 0..size {
                let mut amplitude = 1.0;
                let mut frequency = 1.0;
                let mut value = 0.0;

                for &(ox, oy) in &octave_offsets {
                    let sample_x = (x as f64 - half + ox) * frequency;
                    let sample_y = (y as f64 - half + oy) * frequency;
                    value += noise.sample(sample_x, sample_y) * amplitude;
                    amplitude *= persistence;
                    frequency *= lacunarity;
                }

                values.push(inverse_lerp(-bound, bound, value).clamp(0.0, 1.0) as f32);
            }
        }

        Self { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.size + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.values[y * self.size + x] = value;
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Subtract `mask` cell by cell. Grids must have the same size.
    pub fn subtract(&mut self, mask: &HeightGrid) {
        debug_assert_eq!(self.size, mask.size, "mask size must match grid size");
        for (value, m) in self.values.iter_mut().zip(&mask.values) {
            *value -= m;
        }
    }
}

fn inverse_lerp(from: f64, to: f64, value: f64) -> f64 {
    (value - from) / (to - from)
}
