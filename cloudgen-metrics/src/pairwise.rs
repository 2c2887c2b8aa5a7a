//! Distances between sets of point clouds.

use crate::chamfer::chamfer_unchecked;
use crate::emd::emd_unchecked;
use crate::report::MetricReport;
use crate::{DistanceMatrix, MetricsError, Result};
use cloudgen_data::PointCloud;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};

/// CD and EMD between `samples[i]` and `refs[i]` for every `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedDistances {
    pub cd: Vec<f32>,
    pub emd: Vec<f32>,
}

impl PairedDistances {
    /// Means over all pairs, keyed `MMD-CD` and `MMD-EMD`.
    pub fn reduced(&self) -> MetricReport {
        let mean = |v: &[f32]| v.iter().map(|&x| x as f64).sum::<f64>() / v.len().max(1) as f64;
        let mut report = MetricReport::default();
        report.insert("MMD-CD", mean(&self.cd));
        report.insert("MMD-EMD", mean(&self.emd));
        report
    }
}

/// `cd[i][j]` is the Chamfer distance from `a[i]` to `b[j]`; `emd` likewise
/// when requested.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseDistances {
    pub cd: DistanceMatrix,
    pub emd: Option<DistanceMatrix>,
}

fn check_set(set: &[PointCloud]) -> Result<()> {
    if set.is_empty() {
        return Err(MetricsError::EmptySet);
    }
    if set.iter().any(PointCloud::is_empty) {
        return Err(MetricsError::EmptyCloud);
    }
    Ok(())
}

/// Require every cloud in both sets to have the same number of points.
fn check_uniform_size(a: &[PointCloud], b: &[PointCloud]) -> Result<()> {
    let expected = a[0].len();
    if let Some(cloud) = a.iter().chain(b).find(|c| c.len() != expected) {
        return Err(MetricsError::SizeMismatch {
            left: expected,
            right: cloud.len(),
        });
    }
    Ok(())
}

/// Per-pair CD and EMD between two equally long sets, processed in batches
/// of `batch_size` pairs.
pub fn paired_emd_cd(
    samples: &[PointCloud],
    refs: &[PointCloud],
    batch_size: usize,
) -> Result<PairedDistances> {
    if batch_size == 0 {
        return Err(MetricsError::InvalidBatchSize);
    }
    if samples.len() != refs.len() {
        return Err(MetricsError::SizeMismatch {
            left: samples.len(),
            right: refs.len(),
        });
    }
    check_set(samples)?;
    check_set(refs)?;
    check_uniform_size(samples, refs)?;

    let mut cd = Vec::with_capacity(samples.len());
    let mut emd = Vec::with_capacity(samples.len());
    for (batch, (s, r)) in samples
        .chunks(batch_size)
        .zip(refs.chunks(batch_size))
        .enumerate()
    {
        debug!("Paired batch {} ({} pairs)", batch, s.len());
        let results: Vec<(f32, f32)> = s
            .par_iter()
            .zip(r.par_iter())
            .map(|(s, r)| {
                let cd = chamfer_unchecked(s.as_slice(), r.as_slice());
                emd_unchecked(s.as_slice(), r.as_slice()).map(|emd| (cd, emd))
            })
            .collect::<Result<_>>()?;
        for (c, e) in results {
            cd.push(c);
            emd.push(e);
        }
    }

    Ok(PairedDistances { cd, emd })
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Distance matrices from every cloud in `a` to every cloud in `b`.
///
/// Rows are computed in parallel; within a row `b` is split into chunks of
/// `batch_size` clouds.
pub fn pairwise_distances(
    a: &[PointCloud],
    b: &[PointCloud],
    batch_size: usize,
    compute_emd: bool,
    show_progress: bool,
) -> Result<PairwiseDistances> {
    if batch_size == 0 {
        return Err(MetricsError::InvalidBatchSize);
    }
    check_set(a)?;
    check_set(b)?;
    if compute_emd {
        check_uniform_size(a, b)?;
    }

    info!(
        "Computing {}x{} distance matrix (emd: {})",
        a.len(),
        b.len(),
        compute_emd
    );
    let pb = progress_bar(a.len(), show_progress);

    let rows: Vec<(Vec<f32>, Vec<f32>)> = a
        .par_iter()
        .map(|sample| -> Result<(Vec<f32>, Vec<f32>)> {
            let mut cd_row = Vec::with_capacity(b.len());
            let mut emd_row = Vec::new();
            for chunk in b.chunks(batch_size) {
                let values: Vec<(f32, Option<f32>)> = chunk
                    .par_iter()
                    .map(|target| -> Result<(f32, Option<f32>)> {
                        let cd = chamfer_unchecked(sample.as_slice(), target.as_slice());
                        let emd = compute_emd
                            .then(|| emd_unchecked(sample.as_slice(), target.as_slice()))
                            .transpose()?;
                        Ok((cd, emd))
                    })
                    .collect::<Result<_>>()?;
                for (cd, emd) in values {
                    cd_row.push(cd);
                    emd_row.extend(emd);
                }
            }
            pb.inc(1);
            Ok((cd_row, emd_row))
        })
        .collect::<Result<_>>()?;
    pb.finish_and_clear();

    let (cd_rows, emd_rows): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    let cd = DistanceMatrix::from_rows(cd_rows)?;
    let emd = if compute_emd {
        Some(DistanceMatrix::from_rows(emd_rows)?)
    } else {
        None
    };
    Ok(PairwiseDistances { cd, emd })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn cloud_at(x: f32) -> PointCloud {
        PointCloud::new(vec![Vec3::new(x, 0.0, 0.0), Vec3::new(x, 1.0, 0.0)])
    }

    #[test]
    fn test_pairwise_matches_direct_chamfer() {
        let a = vec![cloud_at(0.0), cloud_at(1.0)];
        let b = vec![cloud_at(0.0), cloud_at(2.0), cloud_at(3.0)];
        let result = pairwise_distances(&a, &b, 2, false, false).unwrap();
        assert_eq!(result.cd.shape(), (2, 3));
        assert!(result.emd.is_none());
        for (i, ca) in a.iter().enumerate() {
            for (j, cb) in b.iter().enumerate() {
                let expected = crate::chamfer_distance(ca.as_slice(), cb.as_slice()).unwrap();
                assert_eq!(result.cd.get(i, j), expected);
            }
        }
    }

    #[test]
    fn test_pairwise_with_emd() {
        let a = vec![cloud_at(0.0)];
        let b = vec![cloud_at(0.0), cloud_at(2.0)];
        let result = pairwise_distances(&a, &b, 1, true, false).unwrap();
        let emd = result.emd.unwrap();
        assert_eq!(emd.shape(), (1, 2));
        assert_eq!(emd.get(0, 0), 0.0);
        assert!((emd.get(0, 1) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_emd_requires_uniform_sizes() {
        let a = vec![cloud_at(0.0)];
        let b = vec![PointCloud::new(vec![Vec3::ZERO])];
        assert!(pairwise_distances(&a, &b, 4, false, false).is_ok());
        assert!(matches!(
            pairwise_distances(&a, &b, 4, true, false),
            Err(MetricsError::SizeMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let a = vec![cloud_at(0.0)];
        assert!(matches!(
            pairwise_distances(&a, &a, 0, false, false),
            Err(MetricsError::InvalidBatchSize)
        ));
    }

    #[test]
    fn test_paired_reduced() {
        let samples = vec![cloud_at(0.0), cloud_at(1.0), cloud_at(2.0)];
        let refs = vec![cloud_at(0.0), cloud_at(2.0), cloud_at(2.0)];
        let paired = paired_emd_cd(&samples, &refs, 2).unwrap();
        assert_eq!(paired.cd, vec![0.0, 2.0, 0.0]);
        assert!((paired.emd[1] - 1.0).abs() < 1e-6);

        let report = paired.reduced();
        assert!((report.get("MMD-CD").unwrap() - 2.0 / 3.0).abs() < 1e-6);
        assert!((report.get("MMD-EMD").unwrap() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_paired_length_mismatch() {
        let samples = vec![cloud_at(0.0)];
        let refs = vec![cloud_at(0.0), cloud_at(1.0)];
        assert!(paired_emd_cd(&samples, &refs, 1).is_err());
    }
}
