//! Random subsampling of point sets and uniform sampling of mesh surfaces.

use crate::{DataError, PointCloud, Result, TriangleMesh};
use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// RNG for a run. A negative seed leaves the generator unseeded.
pub fn seeded_rng(seed: i64) -> ChaCha8Rng {
    match u64::try_from(seed) {
        Ok(seed) => ChaCha8Rng::seed_from_u64(seed),
        Err(_) => ChaCha8Rng::from_entropy(),
    }
}

/// Randomly permute `points` and keep the first `n`.
pub fn subsample<R: Rng + ?Sized>(points: &[Vec3], n: usize, rng: &mut R) -> Result<PointCloud> {
    if points.len() < n {
        return Err(DataError::NotEnoughPoints {
            needed: n,
            available: points.len(),
        });
    }
    let mut shuffled = points.to_vec();
    let (chosen, _) = shuffled.partial_shuffle(rng, n);
    Ok(PointCloud::new(chosen.to_vec()))
}

/// Sample `n` points uniformly over the surface of `mesh`.
///
/// Faces are drawn with probability proportional to their area, then a point
/// is drawn uniformly inside the face.
pub fn sample_surface<R: Rng + ?Sized>(
    mesh: &TriangleMesh,
    n: usize,
    rng: &mut R,
) -> Result<PointCloud> {
    let areas: Vec<f32> = mesh.triangles().map(|t| t.area()).collect();
    let faces = WeightedIndex::new(&areas).map_err(|e| {
        debug!("Cannot weight faces by area: {}", e);
        DataError::DegenerateMesh
    })?;

    let points = (0..n)
        .map(|_| {
            let triangle = mesh.triangle(faces.sample(rng));
            let (mut u, mut v) = (rng.r#gen::<f32>(), rng.r#gen::<f32>());
            // fold the far half of the unit square back into the triangle
            if u + v > 1.0 {
                u = 1.0 - u;
                v = 1.0 - v;
            }
            triangle.interpolate(u, v)
        })
        .collect();

    Ok(PointCloud::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> TriangleMesh {
        TriangleMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_subsample_takes_distinct_input_points() {
        let points: Vec<Vec3> = (0..10).map(|i| Vec3::splat(i as f32)).collect();
        let mut rng = seeded_rng(41);
        let cloud = subsample(&points, 4, &mut rng).unwrap();
        assert_eq!(cloud.len(), 4);
        for p in &cloud.points {
            assert!(points.contains(p));
        }
        let mut xs: Vec<i32> = cloud.points.iter().map(|p| p.x as i32).collect();
        xs.sort();
        xs.dedup();
        assert_eq!(xs.len(), 4);
    }

    #[test]
    fn test_subsample_is_deterministic_for_seed() {
        let points: Vec<Vec3> = (0..50).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let a = subsample(&points, 10, &mut seeded_rng(7)).unwrap();
        let b = subsample(&points, 10, &mut seeded_rng(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_seed_is_unseeded() {
        let points: Vec<Vec3> = (0..1000).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let a = subsample(&points, 20, &mut seeded_rng(-1)).unwrap();
        let b = subsample(&points, 20, &mut seeded_rng(-1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_subsample_not_enough_points() {
        let err = subsample(&[Vec3::ZERO], 2, &mut seeded_rng(0)).unwrap_err();
        assert!(matches!(
            err,
            DataError::NotEnoughPoints { needed: 2, available: 1 }
        ));
    }

    #[test]
    fn test_sample_surface_stays_on_mesh() {
        let cloud = sample_surface(&unit_square(), 500, &mut seeded_rng(3)).unwrap();
        assert_eq!(cloud.len(), 500);
        for p in &cloud.points {
            assert!((-1e-6..=1.0 + 1e-6).contains(&p.x));
            assert!((-1e-6..=1.0 + 1e-6).contains(&p.y));
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_sample_surface_respects_area() {
        // big triangle has 99x the area of the small one
        let mesh = TriangleMesh::new(
            vec![
                Vec3::ZERO,
                Vec3::new(9.9, 0.0, 0.0),
                Vec3::new(0.0, 10.0, 0.0),
                Vec3::new(0.0, 0.0, 5.0),
                Vec3::new(1.0, 0.0, 5.0),
                Vec3::new(0.0, 1.0, 5.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )
        .unwrap();
        let cloud = sample_surface(&mesh, 2000, &mut seeded_rng(11)).unwrap();
        let on_small = cloud.points.iter().filter(|p| p.z > 1.0).count();
        assert!(on_small < 100, "small face got {on_small} samples");
    }

    #[test]
    fn test_sample_surface_degenerate_mesh() {
        let mesh = TriangleMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0], vec![[0, 1, 2]])
            .unwrap();
        let err = sample_surface(&mesh, 10, &mut seeded_rng(0)).unwrap_err();
        assert!(matches!(err, DataError::DegenerateMesh));
    }
}
