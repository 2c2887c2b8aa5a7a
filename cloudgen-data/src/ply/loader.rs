//! PLY file loading functions

use crate::ply::PlyVertex;
use crate::{DataError, Result, TriangleMesh};
use glam::Vec3;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

// Face structure for PLY files
#[derive(Deserialize, Debug)]
struct PlyFace {
    #[serde(alias = "vertex_index")]
    vertex_indices: Vec<i64>,
}

// PLY file structure
#[derive(Deserialize, Debug)]
struct PlyFile {
    #[serde(rename = "vertex")]
    vertex: Vec<HashMap<String, JsonValue>>,
    #[serde(default, rename = "face")]
    face: Vec<PlyFace>,
}

fn parse_ply(path: &Path) -> Result<PlyFile> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let ply_data: PlyFile = serde_ply::from_reader(reader).map_err(|e| {
        warn!("Failed to parse PLY file: {}", e);
        DataError::PlyParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    info!(
        "PLY file parsed: {} vertices, {} faces",
        ply_data.vertex.len(),
        ply_data.face.len()
    );
    Ok(ply_data)
}

fn get_f32(prop: Option<&JsonValue>) -> Option<f32> {
    prop.and_then(|v| match v {
        JsonValue::Number(n) => n.as_f64().map(|f| f as f32),
        _ => None,
    })
}

fn get_u8(prop: Option<&JsonValue>) -> Option<u8> {
    prop.and_then(|v| match v {
        JsonValue::Number(n) => n
            .as_u64()
            .map(|u| u as u8)
            .or_else(|| n.as_i64().map(|i| i as u8)),
        _ => None,
    })
}

fn extract_vertices(rows: &[HashMap<String, JsonValue>]) -> Result<Vec<PlyVertex>> {
    let mut vertices = Vec::with_capacity(rows.len());

    for (index, vertex) in rows.iter().enumerate() {
        let coord = |property: &'static str| {
            get_f32(vertex.get(property)).ok_or(DataError::MissingProperty { property, index })
        };
        let position = Vec3::new(coord("x")?, coord("y")?, coord("z")?);

        let color = match (
            get_u8(vertex.get("red")),
            get_u8(vertex.get("green")),
            get_u8(vertex.get("blue")),
        ) {
            (Some(r), Some(g), Some(b)) => {
                Some(Vec3::new(r as f32, g as f32, b as f32) / 255.0)
            }
            _ => None,
        };

        vertices.push(PlyVertex { position, color });
    }

    Ok(vertices)
}

/// Split every polygon into triangles as a fan around its first vertex.
fn triangulate_faces(faces: &[PlyFace], vertex_count: usize) -> Result<Vec<[usize; 3]>> {
    let mut triangles = Vec::with_capacity(faces.len());
    let mut skipped = 0usize;

    for (face, poly) in faces.iter().enumerate() {
        let indices = &poly.vertex_indices;
        if indices.len() < 3 {
            skipped += 1;
            continue;
        }
        let resolve = |index: i64| {
            usize::try_from(index)
                .ok()
                .filter(|&i| i < vertex_count)
                .ok_or(DataError::FaceIndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                })
        };
        let first = resolve(indices[0])?;
        for pair in indices[1..].windows(2) {
            triangles.push([first, resolve(pair[0])?, resolve(pair[1])?]);
        }
    }

    if skipped > 0 {
        warn!("Skipped {} faces with fewer than 3 vertices", skipped);
    }
    Ok(triangles)
}

/// Load every vertex of a PLY file. Faces, if any, are ignored.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_vertices_from_ply(path: impl AsRef<Path>) -> Result<Vec<PlyVertex>> {
    let path = path.as_ref();
    debug!("Loading PLY vertices from: {}", path.display());
    let ply_data = parse_ply(path)?;
    let vertices = extract_vertices(&ply_data.vertex)?;
    debug!("Loaded {} vertices from PLY file", vertices.len());
    Ok(vertices)
}

/// Load a PLY file as a triangle mesh. Polygons are fan-triangulated.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_mesh_from_ply(path: impl AsRef<Path>) -> Result<TriangleMesh> {
    let path = path.as_ref();
    debug!("Loading PLY mesh from: {}", path.display());
    let ply_data = parse_ply(path)?;
    let positions: Vec<Vec3> = extract_vertices(&ply_data.vertex)?
        .into_iter()
        .map(|v| v.position)
        .collect();
    let faces = triangulate_faces(&ply_data.face, positions.len())?;
    debug!(
        "Loaded mesh with {} vertices and {} triangles",
        positions.len(),
        faces.len()
    );
    TriangleMesh::new(positions, faces)
}

/// Check if a PLY file contains face data.
pub fn ply_has_faces(path: impl AsRef<Path>) -> Result<bool> {
    let ply_data = parse_ply(path.as_ref())?;
    Ok(!ply_data.face.is_empty())
}
