use thiserror::Error;

/// Reasons a terrain collider cannot be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColliderError {
    #[error("mesh has no triangles")]
    EmptyMesh,

    #[error("index {index} is out of range for a mesh with {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("height grid of size {0} is too small for a heightfield (need at least 2x2)")]
    GridTooSmall(usize),

    #[error("rejected triangle mesh: {0}")]
    InvalidMesh(String),
}
