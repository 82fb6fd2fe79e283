//! Static colliders for terrain tiles.
//!
//! Colliders are built detached from any world: the caller inserts them into its own
//! `ColliderSet` once the tile is placed. Tile geometry is centered on the tile, so
//! `position` is the tile's world position.

use glam::Vec3;
use procgen::{HeightCurve, HeightGrid, MeshData};
use rapier3d::prelude::*;

use crate::collision::env_collision_groups;
use crate::error::ColliderError;

/// Which shape to build for a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColliderShape {
    /// Triangle mesh of the rendered geometry, at the tile's level of detail.
    #[default]
    TriMesh,
    /// Heightfield over every sample of the height grid, independent of level of detail.
    HeightField,
}

/// Triangle mesh collider from generated mesh data.
pub fn mesh_collider(mesh: &MeshData, position: Vec3) -> Result<Collider, ColliderError> {
    if mesh.is_empty() {
        return Err(ColliderError::EmptyMesh);
    }

    let vertex_count = mesh.vertex_count();
    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(ColliderError::IndexOutOfRange { index, vertex_count });
    }

    let vertices: Vec<Point<Real>> = mesh
        .vertices
        .iter()
        .map(|v| point![v.position[0], v.position[1], v.position[2]])
        .collect();
    let indices: Vec<[u32; 3]> = mesh.triangles().collect();

    let builder = ColliderBuilder::trimesh(vertices, indices)
        .map_err(|e| ColliderError::InvalidMesh(format!("{:?}", e)))?;

    Ok(builder
        .translation(vector![position.x, position.y, position.z])
        .collision_groups(env_collision_groups())
        .build())
}

/// Heightfield collider matching the terrain surface: each grid sample is raised by
/// `height_curve(h) * height_scale`, the same response the mesh builder applies.
///
/// Rows of the grid run along Z, columns along X, one world unit per sample.
pub fn heightfield_collider(
    grid: &HeightGrid,
    height_curve: &dyn HeightCurve,
    height_scale: f32,
    position: Vec3,
) -> Result<Collider, ColliderError> {
    let size = grid.size();
    if size < 2 {
        return Err(ColliderError::GridTooSmall(size));
    }

    let heights = DMatrix::from_fn(size, size, |row, col| {
        (height_curve.sample(grid.get(col, row)) * height_scale) as Real
    });
    let extent = (size - 1) as Real;
    let scale = vector![extent, 1.0, extent];

    log::debug!("Building {}x{} heightfield collider at {:?}", size, size, position);

    Ok(ColliderBuilder::heightfield(heights, scale)
        .translation(vector![position.x, position.y, position.z])
        .collision_groups(env_collision_groups())
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgen::{build_plane, build_smooth_mesh, Curve, TerrainVertex};
    use rapier3d::parry::query::RayCast;

    fn drop_ray(collider: &Collider, x: f32, z: f32) -> Option<f32> {
        let ray = Ray::new(point![x, 100.0, z], vector![0.0, -1.0, 0.0]);
        collider.shape().cast_ray(collider.position(), &ray, 1000.0, true)
    }

    #[test]
    fn mesh_collider_follows_tile_position() {
        let collider = mesh_collider(&build_plane(10.0), Vec3::new(5.0, 2.0, 5.0)).unwrap();
        let trimesh = collider.shape().as_trimesh().unwrap();
        assert_eq!(trimesh.indices().len(), 2);

        let toi = drop_ray(&collider, 6.0, 4.5).unwrap();
        assert!((toi - 98.0).abs() < 1e-4, "hit at {}", toi);
        assert!(drop_ray(&collider, 20.0, 20.0).is_none());
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert_eq!(mesh_collider(&MeshData::new(), Vec3::ZERO).unwrap_err(), ColliderError::EmptyMesh);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let up = [0.0, 1.0, 0.0];
        let mesh = MeshData {
            vertices: vec![
                TerrainVertex::new([0.0, 0.0, 0.0], up, [0.0, 0.0]),
                TerrainVertex::new([1.0, 0.0, 0.0], up, [1.0, 0.0]),
            ],
            indices: vec![0, 1, 2],
        };
        assert_eq!(
            mesh_collider(&mesh, Vec3::ZERO).unwrap_err(),
            ColliderError::IndexOutOfRange { index: 2, vertex_count: 2 }
        );
    }

    #[test]
    fn heightfield_applies_curve_and_scale() {
        let grid = HeightGrid::from_values(3, vec![0.5; 9]).unwrap();
        let collider = heightfield_collider(&grid, &Curve::linear(), 10.0, Vec3::new(240.0, 0.0, 0.0)).unwrap();
        let heightfield = collider.shape().as_heightfield().unwrap();
        assert_eq!(heightfield.nrows(), 2);
        assert_eq!(heightfield.ncols(), 2);

        let toi = drop_ray(&collider, 240.3, 0.2).unwrap();
        assert!((toi - 95.0).abs() < 1e-4, "hit at {}", toi);
    }

    #[test]
    fn heightfield_matches_smooth_mesh_vertices() {
        let size = 5;
        let values: Vec<f32> = (0..size * size).map(|i| ((i * 7) % 11) as f32 / 10.0).collect();
        let grid = HeightGrid::from_values(size, values).unwrap();
        let curve = Curve::linear();
        let collider = heightfield_collider(&grid, &curve, 4.0, Vec3::ZERO).unwrap();
        let mesh = build_smooth_mesh(&grid, 6, &curve, 4.0);

        let interior = mesh.vertices.iter().filter(|v| v.position[0].abs() < 2.0 && v.position[2].abs() < 2.0);
        for vertex in interior {
            let [x, y, z] = vertex.position;
            let toi = drop_ray(&collider, x + 1e-4, z + 1e-4).unwrap();
            assert!((100.0 - toi - y).abs() < 2e-3, "vertex {:?} hit at {}", vertex.position, 100.0 - toi);
        }
    }

    #[test]
    fn tiny_grid_is_rejected() {
        let grid = HeightGrid::zeros(1);
        assert_eq!(
            heightfield_collider(&grid, &Curve::linear(), 1.0, Vec3::ZERO).unwrap_err(),
            ColliderError::GridTooSmall(1)
        );
    }
}
