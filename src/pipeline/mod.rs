//! Pipeline module for orchestrating terrain passes.
//!
//! The shading mode picks between flattening, displacement + erosion, or
//! nothing at all. [`TerrainSession`] bundles the configuration a host
//! would otherwise read from ambient storage.

mod config;
mod recalc;
mod session;

pub use config::{ConfigError, SessionOptions, TerrainConfig};
pub use recalc::{recalc, PipelineError, RecalcOutcome, ShadingMode};
pub use session::TerrainSession;
