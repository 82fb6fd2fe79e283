//! Tile identity and generated tile contents.

use std::fmt;

use glam::{Vec2, Vec3};
use physics::{heightfield_collider, mesh_collider, rapier3d::prelude::vector, Collider, ColliderShape};
use physics::rapier3d::na as nalgebra;
use procgen::{generate, GenerationParameters, Material, MeshData, TILE_SIZE};

use crate::error::StreamingError;

/// Cache key: tile coordinates plus the level of detail the tile is generated at.
/// The same coordinates at two levels of detail are separate tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub x: i32,
    pub y: i32,
    pub lod: u32,
}

impl TileKey {
    pub fn new(x: i32, y: i32, lod: u32) -> Self {
        Self { x, y, lod }
    }

    pub fn coord(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Noise sampling offset of this tile, in grid units.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x as f32 * TILE_SIZE, self.y as f32 * TILE_SIZE)
    }

    /// Position of the tile center relative to the terrain origin.
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x as f32 * TILE_SIZE, 0.0, self.y as f32 * TILE_SIZE)
    }

    /// Worker thread name.
    pub fn task_name(&self) -> String {
        format!("tile-{}-{}-lod{}", self.x, self.y, self.lod)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) lod {}", self.x, self.y, self.lod)
    }
}

/// A generated tile: geometry, material and optional collider, placed relative to
/// the terrain origin.
#[derive(Debug, Clone)]
pub struct Tile {
    pub mesh: MeshData,
    pub material: Material,
    pub collider: Option<Collider>,
    position: Vec3,
    visible: bool,
}

impl Tile {
    pub fn new(mesh: MeshData, material: Material, collider: Option<Collider>) -> Self {
        Self {
            mesh,
            material,
            collider,
            position: Vec3::ZERO,
            visible: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the tile, and its collider with it.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        if let Some(collider) = &mut self.collider {
            collider.set_translation(vector![position.x, position.y, position.z]);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Generate one tile synchronously, with a collider of the requested shape.
///
/// The tile is left at the origin; callers position it.
pub fn generate_tile(
    parameters: &GenerationParameters,
    collider: Option<ColliderShape>,
) -> Result<Tile, StreamingError> {
    let generated = generate(parameters)?;

    let collider = match collider {
        None => None,
        Some(ColliderShape::HeightField) if parameters.mode.builds_terrain_mesh() => {
            let sources = parameters.sources()?;
            Some(heightfield_collider(
                &generated.heights,
                sources.height_curve,
                parameters.height_scale,
                Vec3::ZERO,
            )?)
        }
        // Preview modes only have a placeholder plane, so the collider follows the mesh.
        Some(_) => Some(mesh_collider(&generated.mesh, Vec3::ZERO)?),
    };

    Ok(Tile::new(generated.mesh, generated.material, collider))
}
