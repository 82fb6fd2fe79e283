//! Parameter snapshot for generating one tile.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;

use crate::error::GenerationError;
use crate::sampling::{ColorGradient, HeightCurve, NoiseSource};

pub const MIN_OCTAVES: u32 = 1;
pub const MAX_OCTAVES: u32 = 10;
pub const MIN_LEVEL_OF_DETAIL: u32 = 0;
pub const MAX_LEVEL_OF_DETAIL: u32 = 6;

/// What a generated tile shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Meshed terrain colored through the gradient.
    #[default]
    Normal,
    /// Flat plane showing the falloff mask alone, in grayscale.
    FalloffOnly,
    /// Flat plane showing the height field in grayscale.
    NoiseUnshaded,
    /// Flat plane showing the height field colored through the gradient.
    NoiseShaded,
}

impl GenerationMode {
    /// Whether the height field is synthesized from noise (and then attenuated by
    /// the falloff mask) rather than replaced by the mask.
    pub fn requires_noise(self) -> bool {
        !matches!(self, Self::FalloffOnly)
    }

    /// Whether the tile gets real terrain geometry instead of a placeholder plane.
    pub fn builds_terrain_mesh(self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Whether the texture samples the color gradient instead of plain grayscale.
    pub fn uses_gradient(self) -> bool {
        matches!(self, Self::Normal | Self::NoiseShaded)
    }
}

/// Borrowed, validated subresources of a [`GenerationParameters`].
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub noise: &'a dyn NoiseSource,
    pub height_curve: &'a dyn HeightCurve,
    pub color_map: &'a dyn ColorGradient,
}

/// Everything needed to generate one tile.
///
/// Cloning is cheap: the noise, curve and gradient are shared immutable handles, so a
/// clone is an independent snapshot a worker can own.
#[derive(Clone)]
pub struct GenerationParameters {
    pub noise: Option<Arc<dyn NoiseSource>>,
    pub height_curve: Option<Arc<dyn HeightCurve>>,
    pub color_map: Option<Arc<dyn ColorGradient>>,
    /// Number of noise layers, clamped to [`MIN_OCTAVES`, `MAX_OCTAVES`] on use.
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Vertical scale applied after the height curve.
    pub height_scale: f32,
    /// Falloff shape exponents `(a, b)`. `(0, 0)` disables the falloff.
    pub falloff: Vec2,
    /// Mesh density, clamped to [`MIN_LEVEL_OF_DETAIL`, `MAX_LEVEL_OF_DETAIL`] on use.
    /// Higher is finer.
    pub level_of_detail: u32,
    /// Build a faceted per-triangle mesh instead of a smooth shared-vertex one.
    pub flat_shading: bool,
    pub mode: GenerationMode,
    /// Tile offset in grid units, folded into the noise sampling position.
    pub offset: Vec2,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            noise: None,
            height_curve: None,
            color_map: None,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            height_scale: 10.0,
            falloff: Vec2::ZERO,
            level_of_detail: MAX_LEVEL_OF_DETAIL,
            flat_shading: false,
            mode: GenerationMode::Normal,
            offset: Vec2::ZERO,
        }
    }
}

impl fmt::Debug for GenerationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationParameters")
            .field("noise", &self.noise.is_some())
            .field("height_curve", &self.height_curve.is_some())
            .field("color_map", &self.color_map.is_some())
            .field("octaves", &self.octaves)
            .field("persistence", &self.persistence)
            .field("lacunarity", &self.lacunarity)
            .field("height_scale", &self.height_scale)
            .field("falloff", &self.falloff)
            .field("level_of_detail", &self.level_of_detail)
            .field("flat_shading", &self.flat_shading)
            .field("mode", &self.mode)
            .field("offset", &self.offset)
            .finish()
    }
}

impl GenerationParameters {
    /// Parameters with all three subresources set and defaults elsewhere.
    pub fn new(
        noise: Arc<dyn NoiseSource>,
        height_curve: Arc<dyn HeightCurve>,
        color_map: Arc<dyn ColorGradient>,
    ) -> Self {
        Self {
            noise: Some(noise),
            height_curve: Some(height_curve),
            color_map: Some(color_map),
            ..Default::default()
        }
    }

    /// Set the octave count, clamping (with a warning) when out of range.
    pub fn set_octaves(&mut self, octaves: u32) {
        if !(MIN_OCTAVES..=MAX_OCTAVES).contains(&octaves) {
            log::warn!(
                "octaves must be within {}..={}, {} will be clamped",
                MIN_OCTAVES,
                MAX_OCTAVES,
                octaves
            );
        }
        self.octaves = octaves.clamp(MIN_OCTAVES, MAX_OCTAVES);
    }

    /// Set the level of detail, clamping (with a warning) when out of range.
    pub fn set_level_of_detail(&mut self, level_of_detail: u32) {
        if level_of_detail > MAX_LEVEL_OF_DETAIL {
            log::warn!(
                "level of detail must be within {}..={}, {} will be clamped",
                MIN_LEVEL_OF_DETAIL,
                MAX_LEVEL_OF_DETAIL,
                level_of_detail
            );
        }
        self.level_of_detail = clamp_level_of_detail(level_of_detail);
    }

    /// Octave count clamped into range.
    pub fn clamped_octaves(&self) -> u32 {
        self.octaves.clamp(MIN_OCTAVES, MAX_OCTAVES)
    }

    /// Level of detail clamped into range.
    pub fn clamped_level_of_detail(&self) -> u32 {
        clamp_level_of_detail(self.level_of_detail)
    }

    /// Snapshot for one tile: same synthesis settings, given offset and LOD.
    pub fn for_tile(&self, offset: Vec2, level_of_detail: u32) -> Self {
        Self {
            offset,
            level_of_detail: clamp_level_of_detail(level_of_detail),
            ..self.clone()
        }
    }

    /// Whether a falloff shape is configured.
    pub fn has_falloff(&self) -> bool {
        self.falloff != Vec2::ZERO
    }

    /// Borrow the three mandatory subresources, or report the first missing one.
    pub fn sources(&self) -> Result<Sources<'_>, GenerationError> {
        let noise = self.noise.as_deref().ok_or(GenerationError::MissingNoise)?;
        let height_curve = self
            .height_curve
            .as_deref()
            .ok_or(GenerationError::MissingCurve)?;
        let color_map = self
            .color_map
            .as_deref()
            .ok_or(GenerationError::MissingGradient)?;
        Ok(Sources {
            noise,
            height_curve,
            color_map,
        })
    }
}

/// Clamp a level of detail into [`MIN_LEVEL_OF_DETAIL`, `MAX_LEVEL_OF_DETAIL`].
pub fn clamp_level_of_detail(level_of_detail: u32) -> u32 {
    level_of_detail.clamp(MIN_LEVEL_OF_DETAIL, MAX_LEVEL_OF_DETAIL)
}
