//! A terrain session: configuration, erosion engine and seed RNG in one place.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::config::{SessionOptions, TerrainConfig};
use super::recalc::{recalc, PipelineError, RecalcOutcome};
use crate::erosion::{ErosionEngine, HydraulicErosion};
use crate::export::{generate_map, DrawSurface, HeightmapTile};
use crate::noise::{FractalConfig, NoiseKind, PerlinSource, SeedPolicy, SimplexSource};
use crate::shading::{shade, Color, Shading};
use crate::terrain::{generate_heightfield, GenerationReport, Grid};

/// Drives the generate, recalc, color and export operations for a host.
///
/// The session never holds on to a grid; every operation borrows one for
/// the duration of the call.
#[derive(Debug)]
pub struct TerrainSession<E = HydraulicErosion> {
    pub options: SessionOptions,
    pub fractal: FractalConfig,
    pub noise: NoiseKind,
    engine: E,
    rng: ChaCha8Rng,
}

impl TerrainSession<HydraulicErosion> {
    /// Builds a session with the bundled CPU erosion engine.
    pub fn from_config(config: TerrainConfig) -> Self {
        let engine = HydraulicErosion::new(config.erosion.clone());
        Self::new(config, engine)
    }
}

impl<E: ErosionEngine> TerrainSession<E> {
    /// Builds a session around a custom erosion engine.
    ///
    /// The seed RNG is seeded from the operating system.
    pub fn new(config: TerrainConfig, engine: E) -> Self {
        Self {
            options: config.session,
            fractal: config.fractal,
            noise: config.noise,
            engine,
            rng: ChaCha8Rng::from_os_rng(),
        }
    }

    /// Makes fresh seed draws reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Displaces `grid` with fractal noise.
    ///
    /// With `preserve_seed` the configured seed is replayed. Without it the
    /// configured seed is still used when present; only an empty seed
    /// option produces a new random seed.
    pub fn displace(&mut self, grid: &mut Grid, preserve_seed: bool) -> Result<GenerationReport, PipelineError> {
        let configured = self.options.seed();
        let policy = match (preserve_seed, configured) {
            (true, Some(seed)) => SeedPolicy::Preserve(seed),
            (_, configured) => SeedPolicy::Fresh { configured },
        };
        self.displace_with(grid, policy)
    }

    /// Displaces `grid` with an explicit seed policy.
    pub fn displace_with(&mut self, grid: &mut Grid, policy: SeedPolicy) -> Result<GenerationReport, PipelineError> {
        let report = match self.noise {
            NoiseKind::Perlin => generate_heightfield::<PerlinSource, _>(grid, policy, &self.fractal, &mut self.rng)?,
            NoiseKind::Simplex => {
                generate_heightfield::<SimplexSource, _>(grid, policy, &self.fractal, &mut self.rng)?
            }
        };
        Ok(report)
    }

    /// Recomputes the surface for the configured shading mode.
    pub fn recalc(&mut self, grid: &mut Grid) -> Result<RecalcOutcome, PipelineError> {
        let mode = self.options.shading_mode();
        let seed = self.options.seed();
        match self.noise {
            NoiseKind::Perlin => {
                recalc::<PerlinSource, _, _>(grid, mode, seed, &self.fractal, &self.engine, &mut self.rng)
            }
            NoiseKind::Simplex => {
                recalc::<SimplexSource, _, _>(grid, mode, seed, &self.fractal, &self.engine, &mut self.rng)
            }
        }
    }

    /// Colors `grid` with the configured color mode.
    pub fn color(&self, grid: &Grid) -> Result<Shading, PipelineError> {
        Ok(shade(grid, self.options.color_mode())?)
    }

    /// Rasterizes `colors` onto `surface`.
    pub fn generate_map(
        &self,
        colors: &[Color],
        grid: &Grid,
        surface: Option<&mut dyn DrawSurface>,
    ) -> Result<HeightmapTile, PipelineError> {
        Ok(generate_map(colors, grid.resolution(), surface)?)
    }
}
