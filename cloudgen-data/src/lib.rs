//! Cloudgen Data Crate
//!
//! Loading and sampling utilities for point clouds used when evaluating
//! generative models: PLY meshes and point sets, NPZ arrays, and the
//! preprocessed ShapeNet directory layout.

pub mod error;
pub mod npz;
pub mod ply;
pub mod sampling;
pub mod shapenet;
pub mod types;

pub use error::DataError;
pub use npz::load_npz_points;
pub use ply::{PlyVertex, load_mesh_from_ply, load_vertices_from_ply, ply_has_faces};
pub use sampling::{sample_surface, seeded_rng, subsample};
pub use shapenet::{Category, ShapeNetLayout, read_split};
pub use types::{PointCloud, Triangle, TriangleMesh};

pub type Result<T> = std::result::Result<T, DataError>;
