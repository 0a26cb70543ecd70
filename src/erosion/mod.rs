//! Erosion engines.
//!
//! The heightfield pipeline only relies on the [`ErosionEngine`] contract:
//! take the grid and its resolution, mutate elevation in place, return when
//! done. [`HydraulicErosion`] is the bundled CPU implementation.

mod config;
pub mod cpu;

use thiserror::Error;
use tracing::debug;

use crate::terrain::Grid;
use cpu::hydraulic::{run_hydraulic_thermal_cpu, ErosionCpuOutputs};

pub use config::ErosionConfig;

/// Errors that can occur while eroding a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErosionError {
    #[error("Grid of {vertices} vertices does not fit resolution {resolution}")]
    GridMismatch { resolution: u32, vertices: usize },
}

/// Simulates erosion on a grid, mutating `z` in place.
pub trait ErosionEngine {
    /// Erodes `grid`, whose rows are `resolution + 1` vertices wide.
    fn erode(&self, grid: &mut Grid, resolution: u32) -> Result<(), ErosionError>;
}

impl<E: ErosionEngine + ?Sized> ErosionEngine for &E {
    fn erode(&self, grid: &mut Grid, resolution: u32) -> Result<(), ErosionError> {
        (**self).erode(grid, resolution)
    }
}

impl<E: ErosionEngine + ?Sized> ErosionEngine for Box<E> {
    fn erode(&self, grid: &mut Grid, resolution: u32) -> Result<(), ErosionError> {
        (**self).erode(grid, resolution)
    }
}

/// Engine that leaves the terrain as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoErosion;

impl ErosionEngine for NoErosion {
    fn erode(&self, _grid: &mut Grid, _resolution: u32) -> Result<(), ErosionError> {
        Ok(())
    }
}

/// Hydraulic + thermal erosion on the CPU.
#[derive(Debug, Clone, Default)]
pub struct HydraulicErosion {
    pub config: ErosionConfig,
}

impl HydraulicErosion {
    pub fn new(config: ErosionConfig) -> Self {
        Self { config }
    }

    /// Runs the simulation without touching the grid.
    ///
    /// Returns eroded heights plus the water, sediment and (optionally)
    /// deposition maps, all in vertex order.
    pub fn run(&self, grid: &Grid, resolution: u32) -> Result<ErosionCpuOutputs, ErosionError> {
        let (cols, rows) = grid_shape(grid, resolution)?;
        let heights0 = grid.heights();
        Ok(run_hydraulic_thermal_cpu(cols, rows, grid.cell_size(), &heights0, &self.config))
    }
}

impl ErosionEngine for HydraulicErosion {
    fn erode(&self, grid: &mut Grid, resolution: u32) -> Result<(), ErosionError> {
        let out = self.run(grid, resolution)?;
        grid.set_heights(&out.heights);
        debug!(
            resolution,
            steps = self.config.hydraulic_steps,
            thermal = self.config.thermal_iterations,
            "erosion applied"
        );
        Ok(())
    }
}

/// Derives `(cols, rows)` from the vertex count and resolution.
fn grid_shape(grid: &Grid, resolution: u32) -> Result<(usize, usize), ErosionError> {
    let vertices = grid.vertex_count();
    let cols = resolution as usize + 1;
    let mismatch = ErosionError::GridMismatch { resolution, vertices };

    if resolution == 0 || vertices % cols != 0 {
        return Err(mismatch);
    }
    let rows = vertices / cols;
    if rows < 2 {
        return Err(mismatch);
    }
    Ok((cols, rows))
}
