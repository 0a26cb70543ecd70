//! Seeded 3D noise sources.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

use super::Seed;

/// A deterministic 3D noise function.
pub trait NoiseSource {
    /// Samples the noise at `(x, y, z)`.
    ///
    /// The output range depends on the source; see the implementors.
    fn noise3d(&self, x: f64, y: f64, z: f64) -> f64;
}

/// A noise source that is keyed by a seed once, at construction.
pub trait SeededNoise: NoiseSource + Sized {
    fn from_seed(seed: Seed) -> Self;
}

/// Selects a noise source at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    /// [`PerlinSource`].
    #[default]
    Perlin,
    /// [`SimplexSource`].
    Simplex,
}

/// Gradient Perlin noise. Output is roughly in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct PerlinSource {
    perlin: Perlin,
}

impl NoiseSource for PerlinSource {
    fn noise3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.perlin.get([x, y, z])
    }
}

impl SeededNoise for PerlinSource {
    fn from_seed(seed: Seed) -> Self {
        Self {
            perlin: Perlin::new(seed.value()),
        }
    }
}

/// Single-octave simplex noise sampled through simdnoise.
///
/// Samples 4D simplex noise with `w = 0`, one point at a time. Slower per
/// call than [`PerlinSource`] but has a different visual character.
///
/// The value is simdnoise's unscaled kernel sum, which stays in a band
/// around 0 that is much narrower than Perlin's (well inside `[-1, 1]`), so
/// the same fractal settings give flatter terrain than with Perlin.
#[derive(Debug, Clone, Copy)]
pub struct SimplexSource {
    seed: i32,
}

impl NoiseSource for SimplexSource {
    fn noise3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let value = NoiseBuilder::fbm_4d_offset(x as f32, 1, y as f32, 1, z as f32, 1, 0.0, 1)
            .with_seed(self.seed)
            .with_freq(1.0)
            .with_octaves(1)
            .generate()
            .0[0];
        value as f64
    }
}

impl SeededNoise for SimplexSource {
    fn from_seed(seed: Seed) -> Self {
        Self {
            seed: seed.value() as i32,
        }
    }
}
