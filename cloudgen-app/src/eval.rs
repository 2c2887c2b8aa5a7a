//! Evaluation of generated shapes against the ShapeNet test split.

use crate::{AppError, Result};
use cloudgen_data::{
    Category, PointCloud, ShapeNetLayout, load_mesh_from_ply, load_npz_points,
    load_vertices_from_ply, sample_surface, seeded_rng, subsample,
};
use cloudgen_metrics::{MetricReport, MetricsConfig, compute_all_metrics};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Array holding the points of a reference model.
pub const REFERENCE_ARRAY: &str = "vertices";
pub const TEST_SPLIT: &str = "test";

/// How the files of a generation run are turned into point clouds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMethod {
    /// Files are point sets; their vertices are subsampled.
    PointFlow,
    /// Files are meshes; points are sampled on their surface.
    Ours,
}

impl GenerationMethod {
    /// Method named by the last component of `gen_path`.
    pub fn detect(gen_path: &Path) -> Result<Self> {
        match gen_path.file_name().and_then(|name| name.to_str()) {
            Some("pointflow") => Ok(GenerationMethod::PointFlow),
            Some("ours") => Ok(GenerationMethod::Ours),
            _ => Err(AppError::UnknownMethod(gen_path.to_path_buf())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Root of the preprocessed ShapeNet dataset.
    pub dataset_path: PathBuf,
    /// Directory named after the generation method, holding `<category>/*.ply`.
    pub gen_path: PathBuf,
    pub category: Category,
    pub n_points: usize,
    pub batch_size: usize,
    /// Negative leaves the RNG unseeded.
    pub seed: i64,
    pub compute_emd: bool,
    pub show_progress: bool,
}

impl EvalConfig {
    pub fn new(dataset_path: impl Into<PathBuf>, gen_path: impl Into<PathBuf>, category: Category) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            gen_path: gen_path.into(),
            category,
            n_points: 2048,
            batch_size: 50,
            seed: 41,
            compute_emd: false,
            show_progress: true,
        }
    }
}

/// Load both sets, check they line up, and compute every metric.
#[tracing::instrument(skip_all, fields(category = %config.category))]
pub fn evaluate(config: &EvalConfig) -> Result<MetricReport> {
    let mut rng = seeded_rng(config.seed);

    let layout = ShapeNetLayout::new(&config.dataset_path);
    let refs = load_reference_clouds(&layout, config.category, config.n_points, &mut rng)?;

    let method = GenerationMethod::detect(&config.gen_path)?;
    let samples = load_generated_clouds(
        &config.gen_path.join(config.category.name()),
        method,
        config.n_points,
        &mut rng,
    )?;

    if samples.len() != refs.len() {
        return Err(AppError::CountMismatch {
            generated: samples.len(),
            reference: refs.len(),
        });
    }

    info!(
        "Evaluating {} generated shapes ({:?}) with {} points each",
        samples.len(),
        method,
        config.n_points
    );
    let metrics = MetricsConfig {
        batch_size: config.batch_size,
        compute_emd: config.compute_emd,
        show_progress: config.show_progress,
    };
    Ok(compute_all_metrics(&samples, &refs, &metrics)?)
}

/// Test-split models of `category`, each subsampled to `n_points`.
pub fn load_reference_clouds<R: Rng + ?Sized>(
    layout: &ShapeNetLayout,
    category: Category,
    n_points: usize,
    rng: &mut R,
) -> Result<Vec<PointCloud>> {
    let models = layout.models(category, TEST_SPLIT)?;
    let clouds = models
        .iter()
        .map(|model| -> Result<PointCloud> {
            let cloud = load_npz_points(layout.model_path(category, model), REFERENCE_ARRAY)?;
            debug!("Reference {} has {} points", model, cloud.len());
            Ok(subsample(cloud.as_slice(), n_points, rng)?)
        })
        .collect::<Result<Vec<_>>>()?;
    info!("Loaded {} reference shapes", clouds.len());
    Ok(clouds)
}

/// Every `.ply` file in `dir`, sorted by name.
pub fn generated_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "ply"))
        .collect();
    files.sort();
    Ok(files)
}

/// Point clouds for the generated shapes in `dir`.
pub fn load_generated_clouds<R: Rng + ?Sized>(
    dir: &Path,
    method: GenerationMethod,
    n_points: usize,
    rng: &mut R,
) -> Result<Vec<PointCloud>> {
    let files = generated_files(dir)?;
    let clouds = files
        .iter()
        .map(|path| -> Result<PointCloud> {
            match method {
                GenerationMethod::PointFlow => {
                    let points: Vec<_> = load_vertices_from_ply(path)?
                        .into_iter()
                        .map(|v| v.position)
                        .collect();
                    if points.len() < n_points {
                        return Err(AppError::NotEnoughGenerated {
                            path: path.clone(),
                            needed: n_points,
                            available: points.len(),
                        });
                    }
                    Ok(subsample(&points, n_points, rng)?)
                }
                GenerationMethod::Ours => {
                    let mesh = load_mesh_from_ply(path)?;
                    Ok(sample_surface(&mesh, n_points, rng)?)
                }
            }
        })
        .collect::<Result<Vec<_>>>()?;
    info!("Loaded {} generated shapes from {}", clouds.len(), dir.display());
    Ok(clouds)
}
