//! Earth Mover's distance between equal-size point clouds.

use crate::{MetricsError, Result, assignment};
use glam::Vec3;

/// Mean Euclidean distance over the optimal one-to-one matching of `a` onto `b`.
pub fn emd(a: &[Vec3], b: &[Vec3]) -> Result<f32> {
    if a.is_empty() || b.is_empty() {
        return Err(MetricsError::EmptyCloud);
    }
    if a.len() != b.len() {
        return Err(MetricsError::SizeMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    emd_unchecked(a, b)
}

pub(crate) fn emd_unchecked(a: &[Vec3], b: &[Vec3]) -> Result<f32> {
    let n = a.len();
    let cost: Vec<f64> = a
        .iter()
        .flat_map(|pa| b.iter().map(move |pb| pa.distance(*pb) as f64))
        .collect();

    let matching = assignment::solve(&cost, n, n)?;
    let total: f64 = matching
        .iter()
        .enumerate()
        .map(|(row, &col)| cost[row * n + col])
        .sum();
    Ok((total / n as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permuted_cloud_has_zero_emd() {
        let a = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        let b = vec![Vec3::Z, Vec3::Y, Vec3::ZERO, Vec3::X];
        assert_eq!(emd(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_translation_moves_every_point() {
        let a = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let shift = Vec3::new(0.0, 0.0, 2.0);
        let b: Vec<Vec3> = a.iter().map(|p| *p + shift).collect();
        assert!((emd(&a, &b).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_emd_is_not_chamfer() {
        // both points of b sit on a[0]; chamfer would ignore a[1] being far away
        let a = vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)];
        let b = vec![Vec3::ZERO, Vec3::ZERO];
        assert!((emd(&a, &b).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_size_mismatch() {
        assert!(matches!(
            emd(&[Vec3::ZERO], &[Vec3::ZERO, Vec3::X]),
            Err(MetricsError::SizeMismatch { left: 1, right: 2 })
        ));
    }
}
