//! Session configuration and its validation rules.

use geocoin_core::GeoPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of a cell in degrees; roughly eleven metres of latitude.
pub const DEFAULT_TILE_DEGREES: f64 = 1e-4;
/// Chebyshev radius, in cells, of the neighbourhood revealed around the player.
pub const DEFAULT_NEIGHBORHOOD_RADIUS: u32 = 8;
/// Probability that any given cell hosts a cache.
pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.1;
/// Exclusive upper bound on the number of coins a new cache starts with.
pub const DEFAULT_MAX_INITIAL_COINS: u32 = 5;
/// Location the player starts at.
pub const DEFAULT_ORIGIN: GeoPoint = GeoPoint::new(36.98949379578401, -122.06277128548504);
/// Largest neighbourhood radius accepted by [`Config::validate`].
pub const MAX_NEIGHBORHOOD_RADIUS: u32 = 64;

/// Parameters shaping a single game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Side length of each grid cell measured in degrees.
    pub tile_degrees: f64,
    /// Chebyshev radius of the revealed neighbourhood, in cells.
    pub neighborhood_radius: u32,
    /// Probability in `[0, 1]` that a cell hosts a cache.
    pub spawn_probability: f64,
    /// New caches start with `0..max_initial_coins` coins.
    pub max_initial_coins: u32,
    /// Seed salting every luck roll.
    pub luck_seed: u64,
    /// Starting location of the player.
    pub origin: GeoPoint,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tile_degrees: DEFAULT_TILE_DEGREES,
            neighborhood_radius: DEFAULT_NEIGHBORHOOD_RADIUS,
            spawn_probability: DEFAULT_SPAWN_PROBABILITY,
            max_initial_coins: DEFAULT_MAX_INITIAL_COINS,
            luck_seed: 0,
            origin: DEFAULT_ORIGIN,
        }
    }
}

impl Config {
    /// Checks that every parameter lies within its supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tile_degrees.is_finite() || self.tile_degrees <= 0.0 {
            return Err(ConfigError::InvalidTileDegrees(self.tile_degrees));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::InvalidSpawnProbability(self.spawn_probability));
        }
        if self.neighborhood_radius > MAX_NEIGHBORHOOD_RADIUS {
            return Err(ConfigError::InvalidNeighborhoodRadius(
                self.neighborhood_radius,
            ));
        }
        if self.max_initial_coins == 0 {
            return Err(ConfigError::InvalidMaxInitialCoins);
        }
        if !self.origin.is_finite() {
            return Err(ConfigError::InvalidOrigin(self.origin));
        }
        Ok(())
    }
}

/// Reasons a [`Config`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Cells must have a finite, positive size.
    #[error("tile size must be a positive finite number of degrees (received {0})")]
    InvalidTileDegrees(f64),
    /// Probabilities live in the closed unit interval.
    #[error("spawn probability must lie within [0, 1] (received {0})")]
    InvalidSpawnProbability(f64),
    /// The revealed neighbourhood would be unreasonably large.
    #[error(
        "neighborhood radius must be at most {max} (received {0})",
        max = MAX_NEIGHBORHOOD_RADIUS
    )]
    InvalidNeighborhoodRadius(u32),
    /// Caches need at least one possible coin count.
    #[error("max initial coins must be positive")]
    InvalidMaxInitialCoins,
    /// The starting point must be a real location.
    #[error("origin must have finite coordinates (received {0:?})")]
    InvalidOrigin(GeoPoint),
}
