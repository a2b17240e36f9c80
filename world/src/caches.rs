//! Per-cell cache contents and the memento store that outlives them.
//!
//! A cell is either unknown (never found lucky this session) or known (a
//! memento exists). The first lucky visit mints the cache's coins from the
//! luck source and writes a memento immediately; every later visit rebuilds
//! the cache from that memento and never re-rolls.

use std::collections::HashMap;

use geocoin_core::{CellCoord, Coin};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    config::Config,
    luck::{coin_count_key, spawn_key, Luck},
};

/// Transient coin holder materialised when a lucky cell is visited.
///
/// Coins behave like a stack: collecting removes the last coin and
/// depositing appends to the end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cache {
    cell: CellCoord,
    coins: Vec<Coin>,
}

impl Cache {
    fn new(cell: CellCoord, coins: Vec<Coin>) -> Self {
        Self { cell, coins }
    }

    /// Cell hosting the cache.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Coins currently held, bottom of the stack first.
    #[must_use]
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Number of coins currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// Reports whether the cache holds no coins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Reports whether the cache holds `coin`.
    #[must_use]
    pub fn contains(&self, coin: Coin) -> bool {
        self.coins.contains(&coin)
    }

    pub(crate) fn pop(&mut self) -> Option<Coin> {
        self.coins.pop()
    }

    pub(crate) fn push(&mut self, coin: Coin) {
        self.coins.push(coin);
    }

    pub(crate) fn remove(&mut self, coin: Coin) -> Option<Coin> {
        let position = self.coins.iter().position(|held| *held == coin)?;
        Some(self.coins.remove(position))
    }
}

#[derive(Serialize, Deserialize)]
struct CacheMemento {
    coins: Vec<Coin>,
}

/// Session-lifetime store of cache mementos keyed by cell.
#[derive(Clone, Debug)]
pub struct CacheStore {
    luck: Luck,
    spawn_probability: f64,
    max_initial_coins: u32,
    mementos: HashMap<CellCoord, String>,
}

impl CacheStore {
    /// Creates an empty store that rolls against the provided luck source.
    #[must_use]
    pub fn new(luck: Luck, spawn_probability: f64, max_initial_coins: u32) -> Self {
        Self {
            luck,
            spawn_probability,
            max_initial_coins,
            mementos: HashMap::new(),
        }
    }

    /// Creates an empty store using the luck parameters of `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Luck::new(config.luck_seed),
            config.spawn_probability,
            config.max_initial_coins,
        )
    }

    /// Spawn-probability test: reports whether `cell` hosts a cache.
    #[must_use]
    pub fn is_lucky(&self, cell: CellCoord) -> bool {
        self.luck.roll(&spawn_key(cell)) < self.spawn_probability
    }

    /// Number of coins a cache at `cell` starts with on its first visit.
    #[must_use]
    pub fn initial_coin_count(&self, cell: CellCoord) -> u32 {
        let roll = self.luck.roll(&coin_count_key(cell));
        let scaled = (roll * f64::from(self.max_initial_coins)).floor() as u32;
        scaled.min(self.max_initial_coins.saturating_sub(1))
    }

    /// Materialises the cache at `cell`, or returns `None` when the cell is
    /// not lucky.
    ///
    /// # Panics
    ///
    /// Panics if the cell's stored memento cannot be decoded, which means the
    /// store's own bookkeeping is broken.
    pub fn visit(&mut self, cell: CellCoord) -> Option<Cache> {
        if !self.is_lucky(cell) {
            return None;
        }

        if let Some(memento) = self.mementos.get(&cell) {
            trace!(%cell, "restoring cache from memento");
            return Some(restore(cell, memento));
        }

        let count = self.initial_coin_count(cell);
        let coins = (0..count).map(|serial| Coin::new(cell, serial)).collect();
        let cache = Cache::new(cell, coins);
        debug!(%cell, coins = count, "minted cache");
        self.commit(&cache);
        Some(cache)
    }

    /// Overwrites the memento of the cache's cell with its current coins.
    pub fn commit(&mut self, cache: &Cache) {
        let memento = CacheMemento {
            coins: cache.coins.clone(),
        };
        let encoded =
            serde_json::to_string(&memento).expect("cache memento serialization never fails");
        trace!(cell = %cache.cell, coins = cache.len(), "committed cache memento");
        let _ = self.mementos.insert(cache.cell, encoded);
    }

    /// Reports whether a memento exists for `cell`.
    #[must_use]
    pub fn is_known(&self, cell: CellCoord) -> bool {
        self.mementos.contains_key(&cell)
    }

    /// Cells with a stored memento, in row-major order.
    #[must_use]
    pub fn known_cells(&self) -> Vec<CellCoord> {
        let mut cells: Vec<CellCoord> = self.mementos.keys().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Serialised memento stored for `cell`, if any.
    #[must_use]
    pub fn memento(&self, cell: CellCoord) -> Option<&str> {
        self.mementos.get(&cell).map(String::as_str)
    }

    /// Forgets every memento, returning all cells to the unknown state.
    pub fn clear(&mut self) {
        self.mementos.clear();
    }
}

fn restore(cell: CellCoord, memento: &str) -> Cache {
    let decoded: CacheMemento = serde_json::from_str(memento)
        .unwrap_or_else(|error| panic!("memento for cache {cell} is corrupt: {error}"));
    Cache::new(cell, decoded.coins)
}
