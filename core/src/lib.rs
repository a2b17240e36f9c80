#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Geocoin Carrier engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player intent (reveal the neighbourhood, collect, deposit,
//! move), the world executes those commands via its `apply` entry point, and
//! then broadcasts [`Event`] values that renderers and systems react to.
//! Caches are always identified by their [`CellCoord`]; renderer handles never
//! cross this boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Geocoin Carrier";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Re-evaluates which caches exist around the provided point, replacing
    /// every cache that is currently visible.
    RevealNeighborhood {
        /// Geographic point the neighbourhood is centred on.
        center: GeoPoint,
    },
    /// Moves the last coin of the cache at `cell` into the player's inventory.
    Collect {
        /// Cell hosting the cache the player interacted with.
        cell: CellCoord,
    },
    /// Moves the last coin of the player's inventory into the cache at `cell`.
    Deposit {
        /// Cell hosting the cache the player interacted with.
        cell: CellCoord,
    },
    /// Moves one specific coin out of whichever visible cache currently holds it.
    CollectCoin {
        /// Coin the player picked from the cache popup.
        coin: Coin,
    },
    /// Shifts the player one tile in the provided direction.
    MovePlayer {
        /// Direction of travel.
        direction: Direction,
    },
    /// Forgets every cache memento, empties the inventory and returns the
    /// player to the configured origin.
    ResetSession,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Every visible cache was removed from view.
    CachesCleared,
    /// A cache became visible at the provided cell.
    CacheSpawned {
        /// Cell hosting the cache.
        cell: CellCoord,
        /// Geographic rectangle covered by the cell.
        bounds: GeoBounds,
        /// Number of coins the cache holds.
        coin_count: usize,
    },
    /// The coin count of a visible cache changed.
    CacheUpdated {
        /// Cell hosting the cache.
        cell: CellCoord,
        /// Number of coins the cache now holds.
        coin_count: usize,
    },
    /// The player's inventory changed.
    InventoryChanged {
        /// Coins held by the player, oldest first.
        coins: Vec<Coin>,
    },
    /// A single coin moved between a cache and the inventory.
    CoinTransferred {
        /// Coin that moved.
        coin: Coin,
        /// Cell of the cache on the other side of the transfer.
        cell: CellCoord,
        /// Which way the coin travelled.
        transfer: Transfer,
    },
    /// The player stepped into a new position.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
        /// Geographic position of the player after moving.
        position: GeoPoint,
    },
    /// The session was reset to its initial state.
    SessionReset {
        /// Geographic position the player was returned to.
        position: GeoPoint,
    },
}

/// Direction a coin travelled during a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transfer {
    /// The coin moved from a cache into the inventory.
    Collected,
    /// The coin moved from the inventory into a cache.
    Deposited,
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing latitude.
    North,
    /// Movement toward increasing longitude.
    East,
    /// Movement toward decreasing latitude.
    South,
    /// Movement toward decreasing longitude.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Offset applied to the `(i, j)` cell indices by a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (1, 0),
            Self::East => (0, 1),
            Self::South => (-1, 0),
            Self::West => (0, -1),
        }
    }
}

/// Location of a single grid cell expressed as latitude and longitude indices.
///
/// Cells compare and hash by value, so two separately constructed cells with
/// the same indices always address the same cache.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    i: i32,
    j: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Index along the latitude axis.
    #[must_use]
    pub const fn i(&self) -> i32 {
        self.i
    }

    /// Index along the longitude axis.
    #[must_use]
    pub const fn j(&self) -> i32 {
        self.j
    }

    /// Returns the neighbouring cell one step away in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (di, dj) = direction.offset();
        Self::new(self.i.wrapping_add(di), self.j.wrapping_add(dj))
    }

    /// Computes the Chebyshev distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.i.abs_diff(other.i).max(self.j.abs_diff(other.j))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.i, self.j)
    }
}

/// Collectible unit minted by a cache.
///
/// `cell` identifies the cache that minted the coin and `serial` is unique
/// within that cache, so the pair is a globally unique identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coin {
    cell: CellCoord,
    serial: u32,
}

impl Coin {
    /// Creates a coin minted at `cell` with the provided serial number.
    #[must_use]
    pub const fn new(cell: CellCoord, serial: u32) -> Self {
        Self { cell, serial }
    }

    /// Cell of the cache that minted the coin.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Zero-based sequence number within the minting cache.
    #[must_use]
    pub const fn serial(&self) -> u32 {
        self.serial
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.cell, self.serial)
    }
}

/// Geographic coordinate measured in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new geographic point.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reports whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Axis-aligned geographic rectangle, closed at the south-west corner and open
/// at the north-east corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    south_west: GeoPoint,
    north_east: GeoPoint,
}

impl GeoBounds {
    /// Creates bounds from their south-west and north-east corners.
    #[must_use]
    pub const fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Corner with the smallest latitude and longitude.
    #[must_use]
    pub const fn south_west(&self) -> GeoPoint {
        self.south_west
    }

    /// Corner with the largest latitude and longitude.
    #[must_use]
    pub const fn north_east(&self) -> GeoPoint {
        self.north_east
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn midpoint(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Reports whether `point` lies inside the half-open rectangle.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south_west.lat
            && point.lat < self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng < self.north_east.lng
    }
}
