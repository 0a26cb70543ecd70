//! Heightfield generation using fractal noise.

use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use super::grid::Grid;
use crate::noise::{
    elevation_from_total, sample_fractal, FractalConfig, FractalConfigError, NoiseSource, Seed,
    SeedPolicy, SeededNoise,
};

/// Errors that can occur during heightfield generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeightfieldError {
    #[error("Invalid fractal configuration: {0}")]
    Config(#[from] FractalConfigError),
}

/// What one generation pass produced besides the new elevations.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// Seed the noise source was built from.
    pub seed: Seed,
    /// Raw fractal totals, one per vertex in vertex order.
    pub samples: Vec<f64>,
    /// Largest raw total seen during the pass; 0 when the grid has no vertices.
    pub running_max: f64,
    /// Wall-clock time of the pass. Diagnostic only.
    pub elapsed: Duration,
}

impl GenerationReport {
    /// Maximum over `samples`, or `None` if there are none.
    pub fn sample_max(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }
}

/// Displaces every vertex of `grid` with fractal noise.
///
/// The grid is flattened first, so repeated calls with the same seed land
/// on the same elevations. Normals are recomputed afterwards.
///
/// # Arguments
/// * `grid` - Grid whose `x`/`y` are sampled and whose `z` is overwritten
/// * `policy` - How to pick the seed for this pass
/// * `config` - Fractal octave configuration
/// * `rng` - Source for fresh seeds when the policy asks for one
pub fn generate_heightfield<N, R>(
    grid: &mut Grid,
    policy: SeedPolicy,
    config: &FractalConfig,
    rng: &mut R,
) -> Result<GenerationReport, HeightfieldError>
where
    N: SeededNoise,
    R: Rng + ?Sized,
{
    config.validate()?;
    let seed = policy.resolve(rng);
    let source = N::from_seed(seed);
    generate_heightfield_with(grid, &source, seed, config)
}

/// Like [`generate_heightfield`] but with an already constructed noise source.
///
/// `seed` is only recorded in the report.
pub fn generate_heightfield_with<N: NoiseSource + ?Sized>(
    grid: &mut Grid,
    source: &N,
    seed: Seed,
    config: &FractalConfig,
) -> Result<GenerationReport, HeightfieldError> {
    config.validate_extent(grid.planar_extent())?;
    let start = Instant::now();

    grid.reset();

    let mut samples = Vec::with_capacity(grid.vertex_count());
    let mut running_max = f64::NEG_INFINITY;

    for vertex in &mut grid.vertices {
        let total = sample_fractal(source, vertex.x as f64, vertex.y as f64, config);
        vertex.z = elevation_from_total(total) as f32;
        running_max = running_max.max(total);
        samples.push(total);
    }
    if samples.is_empty() {
        running_max = 0.0;
    }

    grid.compute_vertex_normals();

    let elapsed = start.elapsed();
    debug!(
        vertices = samples.len(),
        %seed,
        octaves = config.octaves,
        running_max,
        ?elapsed,
        "heightfield generated"
    );

    Ok(GenerationReport {
        seed,
        samples,
        running_max,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::PerlinSource;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_generate_heightfield() {
        let mut grid = Grid::plane(20.0, 20.0, 16, 16).unwrap();
        let report = generate_heightfield::<PerlinSource, _>(
            &mut grid,
            SeedPolicy::Preserve(Seed(42)),
            &FractalConfig::default(),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(report.seed, Seed(42));
        assert_eq!(report.samples.len(), grid.vertex_count());
        let has_relief = grid.vertices.iter().any(|v| v.z != grid.vertices[1].z);
        assert!(has_relief, "Heightfield should not be flat");
    }

    #[test]
    fn test_z_follows_samples() {
        let mut grid = Grid::plane(20.0, 20.0, 8, 8).unwrap();
        let report = generate_heightfield::<PerlinSource, _>(
            &mut grid,
            SeedPolicy::Preserve(Seed(5)),
            &FractalConfig::default(),
            &mut rng(),
        )
        .unwrap();

        for (vertex, total) in grid.vertices.iter().zip(&report.samples) {
            let expected = (total / 15.0 - 5.0) as f32;
            assert_eq!(vertex.z, expected);
        }
    }

    #[test]
    fn test_determinism() {
        let config = FractalConfig::default();
        let mut a = Grid::plane(20.0, 20.0, 12, 12).unwrap();
        let mut b = Grid::plane(20.0, 20.0, 12, 12).unwrap();

        let ra = generate_heightfield::<PerlinSource, _>(&mut a, SeedPolicy::Preserve(Seed(999)), &config, &mut rng())
            .unwrap();
        let rb = generate_heightfield::<PerlinSource, _>(&mut b, SeedPolicy::Preserve(Seed(999)), &config, &mut rng())
            .unwrap();

        assert_eq!(a.vertices, b.vertices);
        assert_eq!(ra.samples, rb.samples);
        assert_eq!(ra.running_max, rb.running_max);
    }

    #[test]
    fn test_repeated_pass_rebuilds_samples() {
        let config = FractalConfig::default();
        let mut grid = Grid::plane(20.0, 20.0, 6, 6).unwrap();
        let first = generate_heightfield::<PerlinSource, _>(&mut grid, SeedPolicy::Preserve(Seed(3)), &config, &mut rng())
            .unwrap();
        let heights = grid.heights();
        let second = generate_heightfield::<PerlinSource, _>(&mut grid, SeedPolicy::Preserve(Seed(3)), &config, &mut rng())
            .unwrap();

        assert_eq!(second.samples.len(), grid.vertex_count());
        assert_eq!(first.samples, second.samples);
        assert_eq!(heights, grid.heights());
    }

    #[test]
    fn test_running_max_matches_samples() {
        let mut grid = Grid::plane(20.0, 20.0, 10, 10).unwrap();
        let report = generate_heightfield::<PerlinSource, _>(
            &mut grid,
            SeedPolicy::Preserve(Seed(11)),
            &FractalConfig::default(),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(report.sample_max(), Some(report.running_max));
    }

    /// Always below zero, falling off with distance from the origin.
    struct Sunken;

    impl NoiseSource for Sunken {
        fn noise3d(&self, x: f64, y: f64, _z: f64) -> f64 {
            -1.0 - x.abs() - y.abs()
        }
    }

    #[test]
    fn test_running_max_with_all_negative_samples() {
        let mut grid = Grid::plane(2.0, 2.0, 1, 1).unwrap();
        let config = FractalConfig {
            octaves: 1,
            scale: 1.0,
            ..Default::default()
        };
        let report = generate_heightfield_with(&mut grid, &Sunken, Seed(0), &config).unwrap();

        assert!(report.samples.iter().all(|&s| s < 0.0));
        assert_eq!(report.running_max, -3.0);
        assert_eq!(report.sample_max(), Some(report.running_max));
    }

    #[test]
    fn test_running_max_single_octave_perlin() {
        let mut grid = Grid::plane(20.0, 20.0, 1, 1).unwrap();
        let report = generate_heightfield::<PerlinSource, _>(
            &mut grid,
            SeedPolicy::Preserve(Seed(3)),
            &FractalConfig::with_octaves(1),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(report.sample_max(), Some(report.running_max));
    }

    #[test]
    fn test_rejects_zero_scale() {
        let mut grid = Grid::plane(20.0, 20.0, 2, 2).unwrap();
        let config = FractalConfig {
            scale: 0.0,
            ..Default::default()
        };
        let result =
            generate_heightfield::<PerlinSource, _>(&mut grid, SeedPolicy::random(), &config, &mut rng());
        assert!(matches!(result, Err(HeightfieldError::Config(FractalConfigError::InvalidScale(_)))));
        assert!(grid.vertices.iter().all(|v| v.z == 0.0), "grid must be untouched on config error");
    }

    #[test]
    fn test_rejects_scale_beyond_sampleable_range() {
        let mut grid = Grid::plane(20.0, 20.0, 2, 2).unwrap();
        let config = FractalConfig {
            scale: 1e-18,
            ..Default::default()
        };
        let result = generate_heightfield::<PerlinSource, _>(&mut grid, SeedPolicy::Preserve(Seed(1)), &config, &mut rng());
        assert!(matches!(
            result,
            Err(HeightfieldError::Config(FractalConfigError::CoordinateOutOfRange { .. }))
        ));
        assert!(grid.vertices.iter().all(|v| v.z == 0.0));

        let config = FractalConfig {
            scale: 1e-200,
            lacunarity: 1e-20,
            ..Default::default()
        };
        let result = generate_heightfield::<PerlinSource, _>(&mut grid, SeedPolicy::Preserve(Seed(1)), &config, &mut rng());
        assert!(matches!(
            result,
            Err(HeightfieldError::Config(FractalConfigError::InvalidPeriod { .. }))
        ));
    }

    #[test]
    fn test_seed_string_replay_on_small_grid() {
        // 3x3 segments, single octave, text seed.
        let config = FractalConfig::with_octaves(1);
        let seed = Seed::parse("test").unwrap();

        let mut grid = Grid::plane(20.0, 20.0, 3, 3).unwrap();
        generate_heightfield::<PerlinSource, _>(&mut grid, SeedPolicy::Preserve(seed), &config, &mut rng()).unwrap();
        let first = grid.heights();
        generate_heightfield::<PerlinSource, _>(&mut grid, SeedPolicy::Preserve(seed), &config, &mut rng()).unwrap();
        assert_eq!(first, grid.heights());

        let other = Seed::parse("other").unwrap();
        assert_ne!(seed, other);
        generate_heightfield::<PerlinSource, _>(&mut grid, SeedPolicy::Fresh { configured: Some(other) }, &config, &mut rng())
            .unwrap();
        assert_ne!(first, grid.heights(), "a different seed should move at least one vertex");
    }
}
