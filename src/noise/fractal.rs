//! Multi-octave fractal noise accumulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::NoiseSource;

/// Divisor applied to the raw fractal total to get an elevation.
pub const ELEVATION_DIVISOR: f64 = 15.0;
/// Offset applied after [`ELEVATION_DIVISOR`].
pub const ELEVATION_OFFSET: f64 = -5.0;
/// Largest coordinate magnitude handed to a noise source.
///
/// Both sources floor coordinates onto an integer lattice; beyond the `i32`
/// range the lattice index is meaningless (simdnoise) or fails to convert
/// (noise-rs).
pub const MAX_SAMPLE_COORDINATE: f64 = 2_147_483_648.0;

/// Errors for fractal configurations that would break sampling.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FractalConfigError {
    #[error("Invalid scale: {0} (must be finite and non-zero)")]
    InvalidScale(f64),
    #[error("Invalid lacunarity: {0} (must be finite and non-zero)")]
    InvalidLacunarity(f64),
    #[error("Octave {octave} has period {period} (must be finite and non-zero)")]
    InvalidPeriod { octave: u8, period: f64 },
    #[error("Extent {extent} over period {period} exceeds the sampleable coordinate range")]
    CoordinateOutOfRange { extent: f64, period: f64 },
}

/// Configuration for multi-octave fractal noise.
///
/// Unlike textbook fBm, `persistence` here defaults to 2 so each octave is
/// *louder* than the last. The elevation constants are tuned against that
/// output range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalConfig {
    /// Number of noise octaves.
    pub octaves: u8,
    /// Base feature size in world units; coordinates are divided by it.
    pub scale: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            octaves: 8,
            scale: 0.06,
            persistence: 2.0,
            lacunarity: 2.0,
        }
    }
}

impl FractalConfig {
    /// Creates a configuration with the given octave count.
    pub fn with_octaves(octaves: u8) -> Self {
        Self {
            octaves,
            ..Default::default()
        }
    }

    /// Per-octave sampling period `scale * lacunarity^i`, in octave order.
    ///
    /// Computed by repeated multiplication, exactly as [`sample_fractal`] does.
    pub fn periods(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.octaves).scan(1.0f64, move |frequency, _| {
            let period = self.scale * *frequency;
            *frequency *= self.lacunarity;
            Some(period)
        })
    }

    /// Checks that every octave's `scale * frequency` is finite and non-zero.
    pub fn validate(&self) -> Result<(), FractalConfigError> {
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(FractalConfigError::InvalidScale(self.scale));
        }
        if !self.lacunarity.is_finite() || self.lacunarity == 0.0 {
            return Err(FractalConfigError::InvalidLacunarity(self.lacunarity));
        }
        for (octave, period) in (0u8..).zip(self.periods()) {
            if !period.is_finite() || period == 0.0 {
                return Err(FractalConfigError::InvalidPeriod { octave, period });
            }
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), and also checks that sampling
    /// positions up to `extent` away from the origin stay within
    /// [`MAX_SAMPLE_COORDINATE`] at every octave.
    pub fn validate_extent(&self, extent: f64) -> Result<(), FractalConfigError> {
        self.validate()?;
        let extent = extent.abs();
        for period in self.periods() {
            let reach = extent / period.abs();
            if !reach.is_finite() || reach > MAX_SAMPLE_COORDINATE {
                return Err(FractalConfigError::CoordinateOutOfRange { extent, period });
            }
        }
        Ok(())
    }
}

/// Samples the raw fractal accumulator at a planar position.
///
/// Each octave samples `noise(x / (scale * frequency), y / (scale * frequency), 0)`,
/// so higher octaves stretch the pattern rather than shrink it.
///
/// # Returns
/// The un-normalized sum of all octaves. Use [`elevation_from_total`] to
/// turn it into a height.
pub fn sample_fractal<N: NoiseSource + ?Sized>(source: &N, x: f64, y: f64, config: &FractalConfig) -> f64 {
    let mut total = 0.0f64;
    let mut frequency = 1.0f64;
    let mut amplitude = 1.0f64;

    for _ in 0..config.octaves {
        let period = config.scale * frequency;
        let noise = source.noise3d(x / period, y / period, 0.0);
        total += noise * amplitude;
        amplitude *= config.persistence;
        frequency *= config.lacunarity;
    }

    total
}

/// Maps a raw fractal total to an elevation.
#[inline]
pub fn elevation_from_total(total: f64) -> f64 {
    total / ELEVATION_DIVISOR + ELEVATION_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a constant so octave weights can be checked by hand.
    struct Constant(f64);

    impl NoiseSource for Constant {
        fn noise3d(&self, _x: f64, _y: f64, _z: f64) -> f64 {
            self.0
        }
    }

    /// Echoes the x coordinate it was sampled at.
    struct EchoX;

    impl NoiseSource for EchoX {
        fn noise3d(&self, x: f64, _y: f64, _z: f64) -> f64 {
            x
        }
    }

    #[test]
    fn test_default_config() {
        let config = FractalConfig::default();
        assert_eq!(config.octaves, 8);
        assert_eq!(config.scale, 0.06);
        assert_eq!(config.persistence, 2.0);
        assert_eq!(config.lacunarity, 2.0);
    }

    #[test]
    fn test_amplitude_grows_per_octave() {
        // 1 + 2 + 4 = 7 with persistence 2.
        let config = FractalConfig {
            octaves: 3,
            ..Default::default()
        };
        let total = sample_fractal(&Constant(1.0), 0.0, 0.0, &config);
        assert_eq!(total, 7.0);
    }

    #[test]
    fn test_frequency_divides_coordinates() {
        let config = FractalConfig {
            octaves: 2,
            scale: 0.5,
            persistence: 1.0,
            lacunarity: 2.0,
        };
        // octave 0: 1 / 0.5 = 2, octave 1: 1 / 1.0 = 1
        let total = sample_fractal(&EchoX, 1.0, 0.0, &config);
        assert_eq!(total, 3.0);
    }

    #[test]
    fn test_zero_octaves() {
        let config = FractalConfig::with_octaves(0);
        assert_eq!(sample_fractal(&Constant(1.0), 3.0, 4.0, &config), 0.0);
    }

    #[test]
    fn test_elevation_constants() {
        assert_eq!(elevation_from_total(0.0), -5.0);
        assert_eq!(elevation_from_total(75.0), 0.0);
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let config = FractalConfig {
            scale: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(FractalConfigError::InvalidScale(0.0)));

        let config = FractalConfig {
            lacunarity: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FractalConfigError::InvalidLacunarity(_))));

        assert!(FractalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_underflowing_period() {
        let config = FractalConfig {
            scale: 1e-200,
            lacunarity: 1e-20,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FractalConfigError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_periods_match_sampling() {
        let config = FractalConfig {
            octaves: 3,
            scale: 0.5,
            persistence: 1.0,
            lacunarity: 3.0,
        };
        let periods: Vec<f64> = config.periods().collect();
        assert_eq!(periods, vec![0.5, 1.5, 4.5]);
    }

    #[test]
    fn test_validate_extent_rejects_tiny_scale() {
        let config = FractalConfig {
            scale: 1e-18,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.validate_extent(10.0),
            Err(FractalConfigError::CoordinateOutOfRange { .. })
        ));
        assert!(FractalConfig::default().validate_extent(10.0).is_ok());
        assert!(FractalConfig::default().validate_extent(0.0).is_ok());
    }

    #[test]
    fn test_config_json_defaults() {
        let config: FractalConfig = serde_json::from_str(r#"{"octaves": 1}"#).unwrap();
        assert_eq!(config.octaves, 1);
        assert_eq!(config.scale, 0.06);
    }
}
