//! PLY file loading and parsing

mod loader;
mod vertex;

pub use loader::{load_mesh_from_ply, load_vertices_from_ply, ply_has_faces};
pub use vertex::PlyVertex;
