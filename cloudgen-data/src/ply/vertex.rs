//! PLY vertex data structures

use glam::Vec3;

/// Vertex data extracted from a PLY file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyVertex {
    pub position: Vec3,
    /// RGB color in 0-1 range, when the file carries one.
    pub color: Option<Vec3>,
}
