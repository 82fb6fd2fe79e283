//! Error types for tile generation.

use thiserror::Error;

/// Reasons a tile cannot be generated from a parameter snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation parameters have no noise source")]
    MissingNoise,

    #[error("generation parameters have no height curve")]
    MissingCurve,

    #[error("generation parameters have no color gradient")]
    MissingGradient,
}
