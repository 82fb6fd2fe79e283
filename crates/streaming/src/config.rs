//! Streaming configuration.

use physics::ColliderShape;
use procgen::{clamp_level_of_detail, MAX_LEVEL_OF_DETAIL};

use crate::task::Executor;

/// How tiles are streamed around the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingConfig {
    /// Level of detail per ring: entry `r` applies to tiles at Chebyshev distance `r`
    /// from the viewer's tile. The length is the view radius plus one.
    pub detail_levels: Vec<u32>,
    /// Maximum jobs started per tick, nearest rings first. `None` is unbounded.
    pub max_launches_per_tick: Option<usize>,
    pub executor: Executor,
    /// Build a collider of this shape alongside each tile.
    pub colliders: Option<ColliderShape>,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            detail_levels: vec![MAX_LEVEL_OF_DETAIL, 4, 2],
            max_launches_per_tick: None,
            executor: Executor::Threaded,
            colliders: None,
        }
    }
}

impl StreamingConfig {
    /// One ring per entry of `detail_levels`.
    pub fn with_detail_levels(detail_levels: impl Into<Vec<u32>>) -> Self {
        Self {
            detail_levels: detail_levels.into(),
            ..Default::default()
        }
    }

    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    /// Clamp detail levels into range, warning about each one that was out of range.
    pub fn sanitize(&mut self) {
        for (ring, lod) in self.detail_levels.iter_mut().enumerate() {
            let clamped = clamp_level_of_detail(*lod);
            if clamped != *lod {
                log::warn!(
                    "Detail level {} for ring {} is out of range, using {}",
                    lod,
                    ring,
                    clamped
                );
                *lod = clamped;
            }
        }
        if self.max_launches_per_tick == Some(0) {
            log::warn!("Launch budget of 0 would never generate tiles, removing the limit");
            self.max_launches_per_tick = None;
        }
    }

    /// Number of rings, i.e. view radius in tiles plus one.
    pub fn ring_count(&self) -> usize {
        self.detail_levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_detail_levels() {
        let mut config = StreamingConfig::with_detail_levels([9, 6, 0]);
        config.max_launches_per_tick = Some(0);
        config.sanitize();
        assert_eq!(config.detail_levels, vec![6, 6, 0]);
        assert_eq!(config.max_launches_per_tick, None);
    }

    #[test]
    fn default_streams_three_rings_finest_first() {
        let config = StreamingConfig::default();
        assert_eq!(config.ring_count(), 3);
        assert_eq!(config.detail_levels[0], MAX_LEVEL_OF_DETAIL);
        assert_eq!(config.executor, Executor::Threaded);
    }
}
