//! Transform component and utilities for spatial positioning.

use glam::{Mat4, Quat, Vec2, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and (possibly non-uniform) scale.
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Horizontal (XZ) offset of `point` from this transform's origin, expressed in
    /// local units: the world-space delta is divided by the X and Z scale.
    /// Rotation is not applied; terrain origins are axis-aligned.
    pub fn local_horizontal_offset(&self, point: Vec3) -> Vec2 {
        let delta = point - self.position;
        Vec2::new(delta.x / self.scale.x, delta.z / self.scale.z)
    }

    /// Map a local-space point into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.to_matrix().transform_point3(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_offset_divides_by_horizontal_scale() {
        let t = Transform::from_position_scale(Vec3::new(10.0, 5.0, -20.0), Vec3::new(2.0, 1.0, 4.0));
        let local = t.local_horizontal_offset(Vec3::new(30.0, 100.0, 20.0));
        assert_eq!(local, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn transform_point_applies_scale_then_translation() {
        let t = Transform::from_position_scale(Vec3::new(1.0, 0.0, 1.0), Vec3::splat(2.0));
        assert_eq!(t.transform_point(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(3.0, 2.0, 3.0));
    }

    #[test]
    fn matrix_translation_matches_position() {
        let m = Transform::from_position(Vec3::new(4.0, 5.0, 6.0)).to_matrix();
        assert_eq!(m.w_axis, glam::Vec4::new(4.0, 5.0, 6.0, 1.0));
    }
}
