//! Core data types for point clouds and triangle meshes.
//!
//! These are plain CPU-side containers. Metrics consume `PointCloud` positions
//! directly, so no color or normal data is carried here.

use crate::DataError;
use glam::Vec3;

/// An ordered set of 3D points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Vec3>,
}

impl PointCloud {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.points
    }
}

/// A triangle given by its three vertex positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the center (centroid) of the triangle.
    pub fn center(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Compute the normal of the triangle (not normalized).
    pub fn normal(&self) -> Vec3 {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(e2)
    }

    /// Compute the area of the triangle.
    pub fn area(&self) -> f32 {
        self.normal().length() * 0.5
    }

    /// Point at barycentric coordinates `(u, v)` measured along the
    /// `v0 -> v1` and `v0 -> v2` edges.
    pub fn interpolate(&self, u: f32, v: f32) -> Vec3 {
        self.v0 + (self.v1 - self.v0) * u + (self.v2 - self.v0) * v
    }
}

/// Indexed triangle mesh. Every face index is valid for `vertices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Build a mesh, rejecting faces that point past the vertex list.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[usize; 3]>) -> Result<Self, DataError> {
        for (face, tri) in faces.iter().enumerate() {
            if let Some(&bad) = tri.iter().find(|&&i| i >= vertices.len()) {
                return Err(DataError::FaceIndexOutOfRange {
                    face,
                    index: bad as i64,
                    vertex_count: vertices.len(),
                });
            }
        }
        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn triangle(&self, face: usize) -> Triangle {
        let [a, b, c] = self.faces[face];
        Triangle::new(self.vertices[a], self.vertices[b], self.vertices[c])
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.faces.len()).map(|f| self.triangle(f))
    }

    pub fn surface_area(&self) -> f32 {
        self.triangles().map(|t| t.area()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_center() {
        let t = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
        );
        assert_eq!(t.center(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_triangle_area() {
        let t = Triangle::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        assert!((t.area() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_interpolate_corners() {
        let t = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(t.interpolate(0.0, 0.0), Vec3::ZERO);
        assert_eq!(t.interpolate(1.0, 0.0), Vec3::X);
        assert_eq!(t.interpolate(0.0, 1.0), Vec3::Y);
    }

    #[test]
    fn test_mesh_rejects_bad_index() {
        let err = TriangleMesh::new(vec![Vec3::ZERO, Vec3::X], vec![[0, 1, 2]]).unwrap_err();
        assert!(matches!(
            err,
            DataError::FaceIndexOutOfRange { face: 0, index: 2, vertex_count: 2 }
        ));
    }

    #[test]
    fn test_mesh_surface_area() {
        let mesh = TriangleMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)],
            vec![[0, 1, 2], [1, 3, 2]],
        )
        .unwrap();
        assert!((mesh.surface_area() - 1.0).abs() < 1e-6);
        assert_eq!(mesh.triangles().count(), 2);
    }
}
