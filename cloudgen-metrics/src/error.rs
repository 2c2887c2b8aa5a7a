//! Error type for metric computation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Point cloud is empty")]
    EmptyCloud,

    #[error("Set of point clouds is empty")]
    EmptySet,

    #[error("Point count mismatch: {left} vs {right}")]
    SizeMismatch { left: usize, right: usize },

    #[error("Matrix shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Batch size must be positive")]
    InvalidBatchSize,

    #[error("k = {k} is out of range for {n} samples")]
    InvalidK { k: usize, n: usize },

    #[error("Cost matrix contains a non-finite value")]
    NonFiniteCost,
}
