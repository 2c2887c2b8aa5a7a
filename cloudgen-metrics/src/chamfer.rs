//! Chamfer distance between two point clouds.

use crate::{MetricsError, Result};
use glam::Vec3;

/// Nearest-neighbour squared distances in both directions.
///
/// The first vector has one entry per point of `b` (closest point of `a`),
/// the second one entry per point of `a` (closest point of `b`).
pub fn chamfer_terms(a: &[Vec3], b: &[Vec3]) -> Result<(Vec<f32>, Vec<f32>)> {
    if a.is_empty() || b.is_empty() {
        return Err(MetricsError::EmptyCloud);
    }
    Ok(chamfer_terms_unchecked(a, b))
}

/// Mean squared nearest-neighbour distance from `a` to `b` plus from `b` to `a`.
pub fn chamfer_distance(a: &[Vec3], b: &[Vec3]) -> Result<f32> {
    if a.is_empty() || b.is_empty() {
        return Err(MetricsError::EmptyCloud);
    }
    Ok(chamfer_unchecked(a, b))
}

pub(crate) fn chamfer_unchecked(a: &[Vec3], b: &[Vec3]) -> f32 {
    let (to_b, to_a) = chamfer_terms_unchecked(a, b);
    mean(&to_b) + mean(&to_a)
}

fn chamfer_terms_unchecked(a: &[Vec3], b: &[Vec3]) -> (Vec<f32>, Vec<f32>) {
    let mut nearest_in_a = vec![f32::INFINITY; b.len()];
    let mut nearest_in_b = vec![f32::INFINITY; a.len()];

    for (i, pa) in a.iter().enumerate() {
        for (j, pb) in b.iter().enumerate() {
            let d = pa.distance_squared(*pb);
            if d < nearest_in_a[j] {
                nearest_in_a[j] = d;
            }
            if d < nearest_in_b[i] {
                nearest_in_b[i] = d;
            }
        }
    }

    (nearest_in_a, nearest_in_b)
}

fn mean(values: &[f32]) -> f32 {
    (values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64) as f32
}
