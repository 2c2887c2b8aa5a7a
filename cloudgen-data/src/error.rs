//! Error type shared by every loader in this crate.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PLY parsing error in {path}: {message}")]
    PlyParse { path: PathBuf, message: String },

    #[error("Missing '{property}' at vertex {index}")]
    MissingProperty { property: &'static str, index: usize },

    #[error("Face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: i64,
        vertex_count: usize,
    },

    #[error("NPZ read error in {path}: {message}")]
    Npz { path: PathBuf, message: String },

    #[error("Array '{name}' not found in {path}")]
    MissingArray { path: PathBuf, name: String },

    #[error("Expected an N x 3 array, got shape {0:?}")]
    BadShape(Vec<usize>),

    #[error("Not enough points: need {needed}, have {available}")]
    NotEnoughPoints { needed: usize, available: usize },

    #[error("Mesh has no surface area to sample from")]
    DegenerateMesh,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}
