//! Noise generation module for terrain synthesis.
//!
//! Provides seeded 3D noise sources (Perlin via `noise`, simplex via
//! `simdnoise`), seed handling, and the fractal octave accumulator.

mod fractal;
mod seed;
mod source;

pub use fractal::{
    elevation_from_total, sample_fractal, FractalConfig, FractalConfigError, ELEVATION_DIVISOR,
    ELEVATION_OFFSET, MAX_SAMPLE_COORDINATE,
};
pub use seed::{EmptySeed, Seed, SeedPolicy};
pub use source::{NoiseKind, NoiseSource, PerlinSource, SeededNoise, SimplexSource};
