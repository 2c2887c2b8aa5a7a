//! Reading point arrays out of NumPy `.npz` archives.

use crate::{DataError, PointCloud, Result};
use glam::Vec3;
use ndarray::Array2;
use ndarray_npy::NpzReader;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Load an `N x 3` array named `array` from an `.npz` file.
///
/// The archive entry may be stored with or without the `.npy` suffix, and the
/// array may be `float32` or `float64`.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), array = array))]
pub fn load_npz_points(path: impl AsRef<Path>, array: &str) -> Result<PointCloud> {
    let path = path.as_ref();
    let npz_error = |e: &dyn std::fmt::Display| DataError::Npz {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut npz = NpzReader::new(File::open(path)?).map_err(|e| npz_error(&e))?;
    let names = npz.names().map_err(|e| npz_error(&e))?;
    let wanted = format!("{array}.npy");
    let entry = names
        .into_iter()
        .find(|name| name == array || *name == wanted)
        .ok_or_else(|| DataError::MissingArray {
            path: path.to_path_buf(),
            name: array.to_string(),
        })?;

    let points = match npz.by_name::<ndarray::OwnedRepr<f32>, ndarray::Ix2>(&entry) {
        Ok(values) => to_points(&values)?,
        Err(first) => {
            debug!("float32 read failed ({}), retrying as float64", first);
            let values: Array2<f64> = npz.by_name(&entry).map_err(|e| npz_error(&e))?;
            to_points(&values.mapv(|v| v as f32))?
        }
    };

    debug!("Loaded {} points", points.len());
    Ok(points)
}

fn to_points(values: &Array2<f32>) -> Result<PointCloud> {
    if values.ncols() != 3 {
        return Err(DataError::BadShape(values.shape().to_vec()));
    }
    Ok(PointCloud::new(
        values
            .rows()
            .into_iter()
            .map(|row| Vec3::new(row[0], row[1], row[2]))
            .collect(),
    ))
}
