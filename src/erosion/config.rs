//! Erosion configuration.

use serde::{Deserialize, Serialize};

/// Parameters for the bundled hydraulic + thermal erosion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionConfig {
    /// Number of hydraulic erosion timesteps.
    pub hydraulic_steps: u32,
    /// Rainfall per step (water units per cell per step).
    pub rainfall: f32,
    /// Evaporation factor per step (0-1).
    pub evaporation: f32,

    /// Erosion rate (Ks).
    pub erosion_rate: f32,
    /// Deposition rate (Kd).
    pub deposition_rate: f32,
    /// Sediment capacity factor (Kc).
    pub sediment_capacity: f32,

    /// Thermal erosion iterations.
    pub thermal_iterations: u32,
    /// Angle of repose (radians). Typical: 30-45 degrees.
    pub angle_of_repose_rad: f32,
    /// Fraction of excess slope to move per iteration.
    pub thermal_strength: f32,

    /// If true, report the net per-vertex height delta caused by erosion.
    pub track_deposition: bool,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            hydraulic_steps: 60,
            rainfall: 0.01,
            evaporation: 0.02,

            erosion_rate: 0.02,
            deposition_rate: 0.02,
            sediment_capacity: 0.05,

            thermal_iterations: 30,
            angle_of_repose_rad: 35_f32.to_radians(),
            thermal_strength: 0.25,

            track_deposition: false,
        }
    }
}

impl ErosionConfig {
    /// A configuration that leaves the terrain untouched.
    pub fn disabled() -> Self {
        Self {
            hydraulic_steps: 0,
            thermal_iterations: 0,
            ..Default::default()
        }
    }
}
