//! Full generation report: MMD, coverage and 1-NN accuracy of a sample set
//! against a reference set.

use crate::{Result, knn, lgan_mmd_cov, pairwise_distances};
use cloudgen_data::PointCloud;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Settings for [`compute_all_metrics`].
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub batch_size: usize,
    /// EMD needs an O(n³) assignment per pair, so it is opt-in.
    pub compute_emd: bool,
    pub show_progress: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            compute_emd: false,
            show_progress: true,
        }
    }
}

/// Metric name to value, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricReport(BTreeMap<String, f64>);

impl MetricReport {
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for MetricReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name}: {value:.6}")?;
        }
        Ok(())
    }
}

/// Compare generated `samples` against `refs`.
///
/// Keys: `lgan_mmd-CD`, `lgan_cov-CD`, `lgan_mmd_smp-CD`, `1-NN-CD-acc_t`,
/// `1-NN-CD-acc_f`, `1-NN-CD-acc`, and the same with `EMD` when enabled.
pub fn compute_all_metrics(
    samples: &[PointCloud],
    refs: &[PointCloud],
    config: &MetricsConfig,
) -> Result<MetricReport> {
    let pairwise = |a: &[PointCloud], b: &[PointCloud]| {
        pairwise_distances(
            a,
            b,
            config.batch_size,
            config.compute_emd,
            config.show_progress,
        )
    };
    let mut report = MetricReport::default();

    info!("Reference vs sample distances");
    let rs = pairwise(refs, samples)?;
    let cov_cd = lgan_mmd_cov(&rs.cd.transpose())?;
    report.insert("lgan_mmd-CD", cov_cd.lgan_mmd);
    report.insert("lgan_cov-CD", cov_cd.lgan_cov);
    report.insert("lgan_mmd_smp-CD", cov_cd.lgan_mmd_smp);
    if let Some(emd) = &rs.emd {
        let cov_emd = lgan_mmd_cov(&emd.transpose())?;
        report.insert("lgan_mmd-EMD", cov_emd.lgan_mmd);
        report.insert("lgan_cov-EMD", cov_emd.lgan_cov);
        report.insert("lgan_mmd_smp-EMD", cov_emd.lgan_mmd_smp);
    }

    info!("Reference vs reference distances");
    let rr = pairwise(refs, refs)?;
    info!("Sample vs sample distances");
    let ss = pairwise(samples, samples)?;

    let one_nn_cd = knn(&rr.cd, &rs.cd, &ss.cd, 1, false)?;
    for (name, value) in one_nn_cd.accuracies() {
        report.insert(format!("1-NN-CD-{name}"), value);
    }
    if let (Some(rr_emd), Some(rs_emd), Some(ss_emd)) = (&rr.emd, &rs.emd, &ss.emd) {
        let one_nn_emd = knn(rr_emd, rs_emd, ss_emd, 1, false)?;
        for (name, value) in one_nn_emd.accuracies() {
            report.insert(format!("1-NN-EMD-{name}"), value);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn cloud(offset: Vec3) -> PointCloud {
        PointCloud::new(vec![
            offset,
            offset + Vec3::X * 0.1,
            offset + Vec3::Y * 0.1,
            offset + Vec3::Z * 0.1,
        ])
    }

    fn quiet(compute_emd: bool) -> MetricsConfig {
        MetricsConfig {
            batch_size: 2,
            compute_emd,
            show_progress: false,
        }
    }

    #[test]
    fn test_identical_sets() {
        let refs: Vec<PointCloud> = (0..4).map(|i| cloud(Vec3::X * i as f32 * 5.0)).collect();
        let report = compute_all_metrics(&refs, &refs, &quiet(false)).unwrap();

        assert_eq!(report.len(), 6);
        assert_eq!(report.get("lgan_mmd-CD"), Some(0.0));
        assert_eq!(report.get("lgan_cov-CD"), Some(1.0));
        assert_eq!(report.get("lgan_mmd_smp-CD"), Some(0.0));
        // each sample's nearest neighbour is its reference twin, so 1-NN fails
        assert_eq!(report.get("1-NN-CD-acc"), Some(0.0));
        assert!(report.get("lgan_mmd-EMD").is_none());
    }

    #[test]
    fn test_far_apart_sets_are_separable() {
        let refs: Vec<PointCloud> = (0..3).map(|i| cloud(Vec3::X * i as f32)).collect();
        let samples: Vec<PointCloud> = (0..3)
            .map(|i| cloud(Vec3::new(i as f32, 100.0, 0.0)))
            .collect();
        let report = compute_all_metrics(&samples, &refs, &quiet(true)).unwrap();

        assert_eq!(report.len(), 12);
        assert!(report.get("lgan_mmd-CD").unwrap() > 1000.0);
        assert_eq!(report.get("1-NN-CD-acc"), Some(1.0));
        assert_eq!(report.get("1-NN-EMD-acc"), Some(1.0));
        assert!((report.get("lgan_mmd-EMD").unwrap() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_report_display_and_json() {
        let mut report = MetricReport::default();
        report.insert("b", 2.0);
        report.insert("a", 0.5);
        assert_eq!(report.to_string(), "a: 0.500000\nb: 2.000000\n");
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["a"], 0.5);
    }
}
