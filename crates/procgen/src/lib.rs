//! Procedural generation of terrain tiles: fractal height fields, falloff masks,
//! LOD meshes and height-colored textures.

pub mod error;
pub mod falloff;
pub mod heightfield;
pub mod mesh;
pub mod params;
pub mod pipeline;
pub mod sampling;
pub mod texture;

pub use error::*;
pub use falloff::*;
pub use heightfield::*;
pub use mesh::*;
pub use params::*;
pub use pipeline::*;
pub use sampling::*;
pub use texture::*;
