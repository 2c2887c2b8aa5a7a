//! Minimum matching distance (MMD) and coverage (COV).

use crate::{DistanceMatrix, MetricsError, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageStats {
    /// Mean over references of the distance to the closest sample.
    pub lgan_mmd: f64,
    /// Fraction of references that are the nearest reference of some sample.
    pub lgan_cov: f64,
    /// Mean over samples of the distance to the closest reference.
    pub lgan_mmd_smp: f64,
}

/// Index and value of the smallest entry; the first index wins ties.
fn argmin(values: impl Iterator<Item = f32>) -> Option<(usize, f32)> {
    values.enumerate().fold(None, |best, (i, v)| match best {
        Some((_, b)) if b <= v => best,
        _ => Some((i, v)),
    })
}

/// `all_dist` is `samples x refs`.
pub fn lgan_mmd_cov(all_dist: &DistanceMatrix) -> Result<CoverageStats> {
    let (n_sample, n_ref) = all_dist.shape();
    if n_sample == 0 || n_ref == 0 {
        return Err(MetricsError::EmptySet);
    }

    let mut covered = HashSet::new();
    let mut from_samples = 0.0f64;
    for s in 0..n_sample {
        if let Some((r, v)) = argmin(all_dist.row(s).iter().copied()) {
            covered.insert(r);
            from_samples += v as f64;
        }
    }

    let from_refs: f64 = (0..n_ref)
        .filter_map(|r| argmin((0..n_sample).map(|s| all_dist.get(s, r))))
        .map(|(_, v)| v as f64)
        .sum();

    Ok(CoverageStats {
        lgan_mmd: from_refs / n_ref as f64,
        lgan_cov: covered.len() as f64 / n_ref as f64,
        lgan_mmd_smp: from_samples / n_sample as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_match() {
        let m = DistanceMatrix::from_rows(vec![vec![0.0, 5.0], vec![5.0, 0.0]]).unwrap();
        let stats = lgan_mmd_cov(&m).unwrap();
        assert_eq!(stats.lgan_mmd, 0.0);
        assert_eq!(stats.lgan_cov, 1.0);
        assert_eq!(stats.lgan_mmd_smp, 0.0);
    }

    #[test]
    fn test_mode_collapse_halves_coverage() {
        // both samples are closest to ref 0
        let m = DistanceMatrix::from_rows(vec![vec![1.0, 4.0], vec![2.0, 3.0]]).unwrap();
        let stats = lgan_mmd_cov(&m).unwrap();
        assert_eq!(stats.lgan_cov, 0.5);
        // per ref: min(1, 2) = 1, min(4, 3) = 3
        assert_eq!(stats.lgan_mmd, 2.0);
        // per sample: 1, 2
        assert_eq!(stats.lgan_mmd_smp, 1.5);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let m = DistanceMatrix::from_rows(vec![vec![1.0, 1.0, 1.0]]).unwrap();
        let stats = lgan_mmd_cov(&m).unwrap();
        assert!((stats.lgan_cov - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_matrix() {
        let m = DistanceMatrix::from_rows(Vec::new()).unwrap();
        assert!(matches!(lgan_mmd_cov(&m), Err(MetricsError::EmptySet)));
    }
}
