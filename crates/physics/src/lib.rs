//! Collision shapes for generated terrain tiles, built with Rapier3D.

pub mod collider;
pub mod collision;
pub mod error;

pub use collider::*;
pub use collision::*;
pub use error::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

pub use rapier3d::prelude::Collider;
