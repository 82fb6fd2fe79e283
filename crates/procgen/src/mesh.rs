//! Terrain mesh construction from a height grid.
//!
//! Two topologies are built from the same sampling:
//! - **smooth**: one shared vertex per sampled grid point, normals averaged across the
//!   triangles touching it;
//! - **flat**: six unshared vertices per sampled quad, each triangle carrying its own
//!   normal for a faceted look.
//!
//! Normals are computed per tile only, so smooth tiles show a lighting seam where they
//! meet a neighbour.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::heightfield::{HeightGrid, TILE_SIZE};
use crate::params::{clamp_level_of_detail, MAX_LEVEL_OF_DETAIL};
use crate::sampling::HeightCurve;

/// Largest sampling step, used at the coarsest level of detail.
pub const MAX_INCREMENT: usize = 12;

/// Vertex for terrain meshes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl TerrainVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Triangle list mesh data, ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Raw vertex bytes for a vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for an index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Grid sampling step for a level of detail: every sample at the finest level, every
/// twelfth at level 0. Always within `[1, MAX_INCREMENT]`.
pub fn level_of_detail_increment(level_of_detail: u32) -> usize {
    let level_of_detail = clamp_level_of_detail(level_of_detail);
    (((MAX_LEVEL_OF_DETAIL - level_of_detail) * 2) as usize).clamp(1, MAX_INCREMENT)
}

/// Build either variant.
pub fn build_terrain_mesh(
    grid: &HeightGrid,
    level_of_detail: u32,
    height_curve: &dyn HeightCurve,
    height_scale: f32,
    flat_shading: bool,
) -> MeshData {
    if flat_shading {
        build_flat_mesh(grid, level_of_detail, height_curve, height_scale)
    } else {
        build_smooth_mesh(grid, level_of_detail, height_curve, height_scale)
    }
}

/// Sampled lattice shared by both variants: positions and UVs for every
/// `increment`-th grid point.
struct Lattice {
    per_line: usize,
    positions: Vec<Vec3>,
    uvs: Vec<[f32; 2]>,
}

impl Lattice {
    fn sample(grid: &HeightGrid, level_of_detail: u32, height_curve: &dyn HeightCurve, height_scale: f32) -> Self {
        let size = grid.size();
        let increment = level_of_detail_increment(level_of_detail);
        let per_line = (size.saturating_sub(1)) / increment + 1;
        let center = (size as f32 - 1.0) / 2.0;

        let mut positions = Vec::with_capacity(per_line * per_line);
        let mut uvs = Vec::with_capacity(per_line * per_line);

        for row in 0..per_line {
            let y = row * increment;
            for col in 0..per_line {
                let x = col * increment;
                let height = height_curve.sample(grid.get(x, y)) * height_scale;
                positions.push(Vec3::new(x as f32 - center, height, y as f32 - center));
                uvs.push([x as f32 / size as f32, y as f32 / size as f32]);
            }
        }

        Self {
            per_line,
            positions,
            uvs,
        }
    }

    /// The two triangles of the quad whose top-left lattice vertex is `(row, col)`,
    /// wound so that a flat quad faces +Y.
    fn quad(&self, row: usize, col: usize) -> [[u32; 3]; 2] {
        let a = (row * self.per_line + col) as u32;
        let right = a + 1;
        let below = a + self.per_line as u32;
        let diagonal = below + 1;
        [[a, diagonal, below], [diagonal, a, right]]
    }

    fn quads(&self) -> impl Iterator<Item = [[u32; 3]; 2]> + '_ {
        let cells = self.per_line.saturating_sub(1);
        (0..cells).flat_map(move |row| (0..cells).map(move |col| self.quad(row, col)))
    }
}

/// Un-normalized face normal; its length is twice the triangle area.
fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (c - a).cross(b - a)
}

/// Unit normal, or +Y for degenerate input.
fn unit_or_up(n: Vec3) -> Vec3 {
    let n = n.normalize_or_zero();
    if n == Vec3::ZERO {
        Vec3::Y
    } else {
        n
    }
}

/// Shared-vertex mesh with area-weighted smooth normals.
pub fn build_smooth_mesh(
    grid: &HeightGrid,
    level_of_detail: u32,
    height_curve: &dyn HeightCurve,
    height_scale: f32,
) -> MeshData {
    let lattice = Lattice::sample(grid, level_of_detail, height_curve, height_scale);
    let cells = lattice.per_line.saturating_sub(1);

    let mut indices = Vec::with_capacity(cells * cells * 6);
    for quad in lattice.quads() {
        for tri in quad {
            indices.extend_from_slice(&tri);
        }
    }

    let mut normals = vec![Vec3::ZERO; lattice.positions.len()];
    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let n = face_normal(lattice.positions[ia], lattice.positions[ib], lattice.positions[ic]);
        normals[ia] += n;
        normals[ib] += n;
        normals[ic] += n;
    }

    let vertices = lattice
        .positions
        .iter()
        .zip(&lattice.uvs)
        .zip(&normals)
        .map(|((p, uv), n)| TerrainVertex::new(p.to_array(), unit_or_up(*n).to_array(), *uv))
        .collect();

    MeshData { vertices, indices }
}

/// Faceted mesh: every triangle gets three vertices of its own.
///
/// The per-triangle normal is the cross product of the triangle's edges normalized
/// to unit length, so it can be fed to lighting directly. Degenerate triangles
/// get `+Y`.
pub fn build_flat_mesh(
    grid: &HeightGrid,
    level_of_detail: u32,
    height_curve: &dyn HeightCurve,
    height_scale: f32,
) -> MeshData {
    let lattice = Lattice::sample(grid, level_of_detail, height_curve, height_scale);
    let cells = lattice.per_line.saturating_sub(1);

    let mut vertices = Vec::with_capacity(cells * cells * 6);
    for quad in lattice.quads() {
        for tri in quad {
            let [a, b, c] = tri.map(|i| lattice.positions[i as usize]);
            let normal = unit_or_up(face_normal(a, b, c)).to_array();
            for i in tri {
                let i = i as usize;
                vertices.push(TerrainVertex::new(lattice.positions[i].to_array(), normal, lattice.uvs[i]));
            }
        }
    }

    let indices = (0..vertices.len() as u32).collect();
    MeshData { vertices, indices }
}

/// Flat upward-facing quad covering one tile, centered on the origin.
pub fn build_plane(size: f32) -> MeshData {
    let half = size / 2.0;
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        TerrainVertex::new([-half, 0.0, -half], up, [0.0, 0.0]),
        TerrainVertex::new([half, 0.0, -half], up, [1.0, 0.0]),
        TerrainVertex::new([-half, 0.0, half], up, [0.0, 1.0]),
        TerrainVertex::new([half, 0.0, half], up, [1.0, 1.0]),
    ];
    // Same diagonal and winding as the terrain quads.
    let indices = vec![0, 3, 2, 3, 0, 1];
    MeshData { vertices, indices }
}

/// Placeholder plane sized to a tile.
pub fn build_tile_plane() -> MeshData {
    build_plane(TILE_SIZE)
}
