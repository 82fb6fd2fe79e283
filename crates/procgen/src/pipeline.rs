//! Single-tile generation: height field, falloff, mesh and material from one
//! parameter snapshot.
//!
//! Generation is pure: identical parameters always produce identical geometry and
//! texture, which is what lets tiles be cached and reused by key.

use crate::error::GenerationError;
use crate::falloff::falloff;
use crate::heightfield::HeightGrid;
use crate::mesh::{build_terrain_mesh, build_tile_plane, MeshData};
use crate::params::GenerationParameters;
use crate::texture::{colorize, grayscale, Material};

/// Output of [`generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedTile {
    pub mesh: MeshData,
    pub material: Material,
    /// Final height grid after falloff, as used for coloring.
    pub heights: HeightGrid,
}

/// Generate one tile.
///
/// Fails without producing anything if the noise, curve or gradient is missing.
pub fn generate(parameters: &GenerationParameters) -> Result<GeneratedTile, GenerationError> {
    let sources = parameters.sources().inspect_err(|e| {
        log::warn!("Refusing to generate tile at {:?}: {}", parameters.offset, e);
    })?;

    let octaves = parameters.clamped_octaves();
    let level_of_detail = parameters.clamped_level_of_detail();

    let heights = if parameters.mode.requires_noise() {
        let mut heights = HeightGrid::generate(
            octaves,
            sources.noise,
            parameters.persistence,
            parameters.lacunarity,
            parameters.offset,
        );
        if parameters.has_falloff() {
            heights.subtract(&falloff(parameters.falloff));
        }
        heights
    } else {
        falloff(parameters.falloff)
    };

    let mesh = if parameters.mode.builds_terrain_mesh() {
        build_terrain_mesh(
            &heights,
            level_of_detail,
            sources.height_curve,
            parameters.height_scale,
            parameters.flat_shading,
        )
    } else {
        build_tile_plane()
    };

    let albedo = if parameters.mode.uses_gradient() {
        colorize(&heights, sources.color_map)
    } else {
        grayscale(&heights)
    };

    log::debug!(
        "Generated tile at {:?}: lod {}, {} vertices, {} triangles",
        parameters.offset,
        level_of_detail,
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    Ok(GeneratedTile {
        mesh,
        material: Material::new(albedo),
        heights,
    })
}
