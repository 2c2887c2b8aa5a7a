//! Cloudgen Metrics Crate
//!
//! Distances between point clouds and the set-level scores used to compare a
//! batch of generated shapes against a reference batch.
//!
//! ## Modules
//!
//! - [`chamfer`]: Chamfer distance
//! - [`emd`]: Earth Mover's distance through exact linear assignment
//! - [`pairwise`]: distance matrices between two sets of clouds
//! - [`coverage`]: minimum matching distance and coverage
//! - [`knn`]: leave-one-out nearest-neighbour accuracy
//! - [`report`]: everything above combined into one report

pub mod assignment;
pub mod chamfer;
pub mod coverage;
pub mod emd;
pub mod error;
pub mod knn;
pub mod matrix;
pub mod pairwise;
pub mod report;

pub use chamfer::{chamfer_distance, chamfer_terms};
pub use coverage::{CoverageStats, lgan_mmd_cov};
pub use emd::emd;
pub use error::MetricsError;
pub use knn::{KnnStats, knn};
pub use matrix::DistanceMatrix;
pub use pairwise::{PairedDistances, PairwiseDistances, paired_emd_cd, pairwise_distances};
pub use report::{MetricReport, MetricsConfig, compute_all_metrics};

pub type Result<T> = std::result::Result<T, MetricsError>;
