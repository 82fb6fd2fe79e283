//! Streaming of procedurally generated terrain tiles around a moving viewer.
//!
//! A [`TerrainStreamer`] is driven once per frame with [`TerrainStreamer::tick`]. It
//! works out which tiles the viewer needs at which level of detail, generates missing
//! ones on worker threads, and attaches finished tiles to a host [`Scene`].

pub mod cache;
pub mod config;
pub mod error;
pub mod scene;
pub mod streamer;
pub mod task;
pub mod tile;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use scene::*;
pub use streamer::*;
pub use task::*;
pub use tile::*;
