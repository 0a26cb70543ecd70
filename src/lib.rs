//! Procedural terrain heightfield generator.
//!
//! This crate displaces a subdivided plane with seeded fractal noise,
//! optionally erodes it, colors it by elevation, and rasterizes the colors
//! into a heightmap tile.

pub mod noise;
pub mod terrain;
pub mod erosion;
pub mod shading;
pub mod export;
pub mod pipeline;

pub use noise::{FractalConfig, NoiseKind, Seed, SeedPolicy};
pub use terrain::{Face, GenerationReport, Grid};
pub use erosion::{ErosionConfig, ErosionEngine, HydraulicErosion};
pub use shading::{Color, ColorMode, Shading};
pub use export::{generate_map, DrawSurface, HeightmapTile, RasterSurface, Viewport};
pub use pipeline::{recalc, PipelineError, RecalcOutcome, ShadingMode, TerrainConfig, TerrainSession};
