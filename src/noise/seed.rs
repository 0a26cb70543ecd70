//! Noise seeds and the policy for choosing one per generation pass.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh32::xxh32;

/// Deterministic initializer for a noise source.
///
/// Same seed and same inputs always produce the same noise values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(pub u32);

impl Seed {
    /// Parses a seed from free-form text as a host would store it.
    ///
    /// Returns `None` for empty or whitespace-only input. Integers are used
    /// verbatim (negative values wrap), fractions in `(0, 1)` are scaled by
    /// 65536 the way a uniform random draw is turned into a seed, other
    /// floats are truncated, and any remaining text is hashed with xxh32.
    pub fn parse(raw: &str) -> Option<Seed> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(v) = text.parse::<u32>() {
            return Some(Seed(v));
        }
        if let Ok(v) = text.parse::<i64>() {
            return Some(Seed(v as u32));
        }
        if let Ok(v) = text.parse::<f64>() {
            if v.is_finite() {
                let folded = if v > 0.0 && v < 1.0 {
                    (v * 65536.0).floor() as u32
                } else {
                    v.trunc() as i64 as u32
                };
                return Some(Seed(folded));
            }
        }

        Some(Seed(xxh32(text.as_bytes(), 0)))
    }

    /// Draws a uniformly distributed seed.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Seed {
        Seed(rng.random())
    }

    /// Returns the raw seed value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an empty seed string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("seed text is empty")]
pub struct EmptySeed;

impl FromStr for Seed {
    type Err = EmptySeed;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Seed::parse(s).ok_or(EmptySeed)
    }
}

/// How a generation pass picks its seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Reuse the given seed verbatim (deterministic replay).
    Preserve(Seed),
    /// Use the configured seed when there is one, otherwise draw a new one.
    Fresh { configured: Option<Seed> },
}

impl SeedPolicy {
    /// A fresh pass with no configured seed.
    pub const fn random() -> Self {
        SeedPolicy::Fresh { configured: None }
    }

    /// Resolves the policy to a concrete seed.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Seed {
        match *self {
            SeedPolicy::Preserve(seed) => seed,
            SeedPolicy::Fresh { configured: Some(seed) } => seed,
            SeedPolicy::Fresh { configured: None } => Seed::random(rng),
        }
    }
}
