//! Core types shared by the terrain crates.
//!
//! This crate provides the foundational spatial types:
//! - Transform with non-uniform scale (terrain origin, viewer)

pub mod transform;

pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
