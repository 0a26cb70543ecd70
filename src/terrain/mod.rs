//! Terrain module.
//!
//! Provides the [`Grid`] data structure the host hands in, plus the
//! fractal heightfield generator that displaces it.

mod grid;
mod heightfield;

pub use grid::{ElevationRange, Face, Grid, GridError};
pub use heightfield::{generate_heightfield, generate_heightfield_with, GenerationReport, HeightfieldError};
