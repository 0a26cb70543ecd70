//! Shading mode dispatch: flatten, displace + erode, or leave alone.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::erosion::{ErosionEngine, ErosionError};
use crate::export::HeightmapExportError;
use crate::noise::{FractalConfig, Seed, SeedPolicy, SeededNoise};
use crate::shading::ColorError;
use crate::terrain::{generate_heightfield, GenerationReport, Grid, HeightfieldError};

/// Errors that can occur anywhere in the terrain pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Heightfield generation failed: {0}")]
    Heightfield(#[from] HeightfieldError),
    #[error("Erosion failed: {0}")]
    Erosion(#[from] ErosionError),
    #[error("Coloring failed: {0}")]
    Color(#[from] ColorError),
    #[error("Heightmap export failed: {0}")]
    Export(#[from] HeightmapExportError),
}

/// How the terrain surface is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMode {
    /// Nothing selected; recalculation is a no-op.
    #[default]
    None,
    /// Flat plane shaded only by its geometric normals.
    Stylized,
    /// Fractal displacement followed by erosion.
    Real,
}

impl ShadingMode {
    /// Reads a stored option value. Unknown values fall back to [`ShadingMode::None`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ShadingMode::None,
            Some("stylized") => ShadingMode::Stylized,
            Some("real") => ShadingMode::Real,
            Some(other) => {
                warn!(mode = other, "unrecognized shading mode, leaving terrain unchanged");
                ShadingMode::None
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShadingMode::None => "none",
            ShadingMode::Stylized => "stylized",
            ShadingMode::Real => "real",
        }
    }
}

/// Result of a [`recalc`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecalcOutcome {
    /// No mode selected; grid untouched.
    Unchanged,
    /// Grid reset to flat.
    Flattened,
    /// Grid displaced and eroded.
    Displaced(GenerationReport),
}

impl RecalcOutcome {
    /// Generation time, for displaced passes only.
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            RecalcOutcome::Displaced(report) => Some(report.elapsed),
            _ => None,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, RecalcOutcome::Unchanged)
    }
}

/// Recomputes the grid surface for `mode`.
///
/// * `Real` displaces with `seed` preserved (a fresh seed is drawn when none
///   is configured), erodes with `engine`, then rebuilds normals.
/// * `Stylized` flattens the grid.
/// * `None` returns [`RecalcOutcome::Unchanged`] without touching anything.
///
/// On an erosion error the grid keeps its displaced, un-eroded elevations.
pub fn recalc<N, E, R>(
    grid: &mut Grid,
    mode: ShadingMode,
    seed: Option<Seed>,
    config: &FractalConfig,
    engine: &E,
    rng: &mut R,
) -> Result<RecalcOutcome, PipelineError>
where
    N: SeededNoise,
    E: ErosionEngine + ?Sized,
    R: Rng + ?Sized,
{
    match mode {
        ShadingMode::Real => {
            let policy = seed.map(SeedPolicy::Preserve).unwrap_or_else(SeedPolicy::random);
            let report = generate_heightfield::<N, R>(grid, policy, config, rng)?;
            let resolution = grid.resolution();
            engine.erode(grid, resolution)?;
            grid.compute_vertex_normals();
            info!(seed = %report.seed, elapsed = ?report.elapsed, "terrain displaced and eroded");
            Ok(RecalcOutcome::Displaced(report))
        }
        ShadingMode::Stylized => {
            grid.reset();
            info!("terrain flattened");
            Ok(RecalcOutcome::Flattened)
        }
        ShadingMode::None => Ok(RecalcOutcome::Unchanged),
    }
}
