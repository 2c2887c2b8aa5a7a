//! Leave-one-out k-nearest-neighbour two-sample test.
//!
//! Set X is labelled 1 and set Y is labelled 0. Every element is classified
//! by a vote among its k nearest neighbours in the union, itself excluded.
//! An accuracy near 50% means the two sets are indistinguishable.

use crate::{DistanceMatrix, MetricsError, Result};
use ordered_float::OrderedFloat;
use serde::Serialize;

const EPS: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KnnStats {
    pub tp: f64,
    pub fp: f64,
    #[serde(rename = "fn")]
    pub fn_: f64,
    pub tn: f64,
    pub precision: f64,
    pub recall: f64,
    /// Accuracy on X.
    pub acc_t: f64,
    /// Accuracy on Y.
    pub acc_f: f64,
    pub acc: f64,
}

impl KnnStats {
    /// The accuracy entries, named as they appear in a report.
    pub fn accuracies(&self) -> [(&'static str, f64); 3] {
        [("acc_t", self.acc_t), ("acc_f", self.acc_f), ("acc", self.acc)]
    }
}

/// Entry `(row, col)` of `[[mxx, mxy], [mxyᵀ, myy]]`.
fn joint(
    mxx: &DistanceMatrix,
    mxy: &DistanceMatrix,
    myy: &DistanceMatrix,
    row: usize,
    col: usize,
) -> f32 {
    let n0 = mxx.rows();
    match (row < n0, col < n0) {
        (true, true) => mxx.get(row, col),
        (true, false) => mxy.get(row, col - n0),
        (false, true) => mxy.get(col, row - n0),
        (false, false) => myy.get(row - n0, col - n0),
    }
}

/// `mxx` is `n0 x n0`, `mxy` is `n0 x n1`, `myy` is `n1 x n1`.
/// With `sqrt`, distances are replaced by `sqrt(|d|)` before ranking.
pub fn knn(
    mxx: &DistanceMatrix,
    mxy: &DistanceMatrix,
    myy: &DistanceMatrix,
    k: usize,
    sqrt: bool,
) -> Result<KnnStats> {
    let n0 = mxx.rows();
    let n1 = myy.rows();
    mxx.expect_shape((n0, n0))?;
    mxy.expect_shape((n0, n1))?;
    myy.expect_shape((n1, n1))?;
    let n = n0 + n1;
    if k == 0 || k >= n {
        return Err(MetricsError::InvalidK { k, n });
    }

    let label = |i: usize| if i < n0 { 1.0 } else { 0.0 };
    let (mut tp, mut fp, mut fn_, mut tn) = (0.0, 0.0, 0.0, 0.0);

    for col in 0..n {
        let mut neighbours: Vec<(OrderedFloat<f32>, usize)> = (0..n)
            .filter(|&row| row != col)
            .map(|row| {
                let d = joint(mxx, mxy, myy, row, col);
                let d = if sqrt { d.abs().sqrt() } else { d };
                (OrderedFloat(d), row)
            })
            .collect();
        neighbours.sort_unstable();

        let votes: f64 = neighbours[..k].iter().map(|&(_, row)| label(row)).sum();
        let pred = if votes >= k as f64 / 2.0 { 1.0 } else { 0.0 };
        let truth = label(col);

        tp += pred * truth;
        fp += pred * (1.0 - truth);
        fn_ += (1.0 - pred) * truth;
        tn += (1.0 - pred) * (1.0 - truth);
    }

    Ok(KnnStats {
        tp,
        fp,
        fn_,
        tn,
        precision: tp / (tp + fp + EPS),
        recall: tp / (tp + fn_ + EPS),
        acc_t: tp / (tp + fn_ + EPS),
        acc_f: tn / (tn + fp + EPS),
        acc: (tp + tn) / n as f64,
    })
}
