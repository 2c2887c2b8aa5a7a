//! Top-level error for the `cloudgen` commands.

use cloudgen_data::DataError;
use cloudgen_launch::LaunchError;
use cloudgen_metrics::MetricsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognized generation method for {0}: expected the directory to be named 'pointflow' or 'ours'")]
    UnknownMethod(PathBuf),

    #[error("{generated} generated shapes do not match the {reference} shapes of the test split")]
    CountMismatch { generated: usize, reference: usize },

    #[error("Not enough points were generated in {path}: need {needed}, have {available}")]
    NotEnoughGenerated {
        path: PathBuf,
        needed: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;
