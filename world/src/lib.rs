#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Geocoin Carrier.
//!
//! The world owns the board, the cache memento store, the player's inventory
//! and position. Adapters mutate it exclusively through [`apply`] and observe
//! it through the read-only [`query`] module.

pub mod board;
pub mod caches;
pub mod config;
pub mod inventory;
pub mod luck;

use std::collections::BTreeMap;

use geocoin_core::{
    CellCoord, Coin, Command, Direction, Event, GeoPoint, Transfer, WELCOME_BANNER,
};
use tracing::{debug, info};

use crate::{
    board::Board,
    caches::{Cache, CacheStore},
    config::{Config, ConfigError},
    inventory::Inventory,
};

/// Represents the authoritative Geocoin Carrier session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: Config,
    board: Board,
    store: CacheStore,
    inventory: Inventory,
    origin_cell: CellCoord,
    player_cell: CellCoord,
    active: BTreeMap<CellCoord, Cache>,
    history: Vec<GeoPoint>,
}

impl World {
    /// Creates a new session using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(Config::default())
    }

    /// Creates a new session after validating `config`.
    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: Config) -> Self {
        let board = Board::new(config.tile_degrees, config.neighborhood_radius);
        let origin_cell = board.cell_for_point(config.origin);
        Self {
            banner: WELCOME_BANNER,
            board,
            store: CacheStore::from_config(&config),
            inventory: Inventory::new(),
            origin_cell,
            player_cell: origin_cell,
            active: BTreeMap::new(),
            history: vec![config.origin],
            config,
        }
    }

    /// Position inside the player's cell at the same offset the origin has
    /// inside its own cell.
    fn player_position(&self) -> GeoPoint {
        let origin = self.config.origin;
        if self.player_cell == self.origin_cell {
            return origin;
        }

        let home = self.board.cell_bounds(self.origin_cell).south_west();
        let bounds = self.board.cell_bounds(self.player_cell);
        let south_west = bounds.south_west();
        let north_east = bounds.north_east();
        let mut lat = south_west.lat + (origin.lat - home.lat);
        let mut lng = south_west.lng + (origin.lng - home.lng);
        // Rounding may push the offset across the far edge.
        if !(south_west.lat..north_east.lat).contains(&lat) {
            lat = (south_west.lat + north_east.lat) / 2.0;
        }
        if !(south_west.lng..north_east.lng).contains(&lng) {
            lng = (south_west.lng + north_east.lng) / 2.0;
        }
        GeoPoint::new(lat, lng)
    }

    fn reveal(&mut self, center: GeoPoint, out_events: &mut Vec<Event>) {
        for cache in self.active.values() {
            self.store.commit(cache);
        }
        self.active.clear();
        out_events.push(Event::CachesCleared);

        for cell in self.board.cells_near(center) {
            let Some(cache) = self.store.visit(cell) else {
                continue;
            };
            out_events.push(Event::CacheSpawned {
                cell,
                bounds: self.board.cell_bounds(cell),
                coin_count: cache.len(),
            });
            let _ = self.active.insert(cell, cache);
        }
        debug!(
            lat = center.lat,
            lng = center.lng,
            caches = self.active.len(),
            "revealed neighborhood"
        );
    }

    fn transfer(&mut self, cell: CellCoord, transfer: Transfer, out_events: &mut Vec<Event>) {
        let Some(cache) = self.active.get_mut(&cell) else {
            debug!(%cell, ?transfer, "ignored transfer with a cache that is not visible");
            return;
        };

        let moved = match transfer {
            Transfer::Collected => self.inventory.collect(cache),
            Transfer::Deposited => self.inventory.deposit(cache),
        };
        let Some(coin) = moved else {
            debug!(%cell, ?transfer, "ignored transfer with nothing to move");
            return;
        };

        self.store.commit(cache);
        let coin_count = cache.len();
        self.announce_transfer(coin, cell, transfer, coin_count, out_events);
    }

    fn collect_coin(&mut self, coin: Coin, out_events: &mut Vec<Event>) {
        let holder = self
            .active
            .iter_mut()
            .find(|(_, cache)| cache.contains(coin));
        let Some((&cell, cache)) = holder else {
            debug!(%coin, "ignored collection of a coin no visible cache holds");
            return;
        };

        if self.inventory.collect_coin(cache, coin).is_none() {
            return;
        }
        self.store.commit(cache);
        let coin_count = cache.len();
        self.announce_transfer(coin, cell, Transfer::Collected, coin_count, out_events);
    }

    fn announce_transfer(
        &self,
        coin: Coin,
        cell: CellCoord,
        transfer: Transfer,
        coin_count: usize,
        out_events: &mut Vec<Event>,
    ) {
        debug!(%coin, %cell, ?transfer, "transferred coin");
        out_events.push(Event::CoinTransferred {
            coin,
            cell,
            transfer,
        });
        out_events.push(Event::CacheUpdated { cell, coin_count });
        out_events.push(Event::InventoryChanged {
            coins: self.inventory.coins().to_vec(),
        });
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.player_cell;
        let to = from.step(direction);
        self.player_cell = to;
        let position = self.player_position();
        self.history.push(position);
        debug!(?direction, %from, %to, "player moved");
        out_events.push(Event::PlayerMoved { from, to, position });
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.store.clear();
        self.inventory.clear();
        self.active.clear();
        self.player_cell = self.origin_cell;
        self.history = vec![self.config.origin];
        info!("session reset");
        out_events.push(Event::CachesCleared);
        out_events.push(Event::InventoryChanged { coins: Vec::new() });
        out_events.push(Event::SessionReset {
            position: self.config.origin,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Transfers that have nothing to move, or that target a cell without a
/// visible cache, are ignored and emit no events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RevealNeighborhood { center } => world.reveal(center, out_events),
        Command::Collect { cell } => world.transfer(cell, Transfer::Collected, out_events),
        Command::Deposit { cell } => world.transfer(cell, Transfer::Deposited, out_events),
        Command::CollectCoin { coin } => world.collect_coin(coin, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::ResetSession => world.reset(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use geocoin_core::{CellCoord, Coin, GeoBounds, GeoPoint};

    use super::{Board, Cache, Config, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the configuration the session runs with.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Provides read-only access to the board's grid geometry.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Current geographic position of the player.
    #[must_use]
    pub fn player_position(world: &World) -> GeoPoint {
        world.player_position()
    }

    /// Cell the player currently occupies.
    #[must_use]
    pub fn player_cell(world: &World) -> CellCoord {
        world.player_cell
    }

    /// Coins held by the player, oldest first.
    #[must_use]
    pub fn inventory(world: &World) -> &[Coin] {
        world.inventory.coins()
    }

    /// Visible cache hosted at `cell`, if any.
    #[must_use]
    pub fn active_cache(world: &World, cell: CellCoord) -> Option<&Cache> {
        world.active.get(&cell)
    }

    /// Cells hosting a visible cache, in row-major order.
    #[must_use]
    pub fn active_cells(world: &World) -> Vec<CellCoord> {
        world.active.keys().copied().collect()
    }

    /// Reports whether a memento exists for `cell`.
    #[must_use]
    pub fn is_known(world: &World, cell: CellCoord) -> bool {
        world.store.is_known(cell)
    }

    /// Positions the player has occupied this session, starting at the origin.
    #[must_use]
    pub fn location_history(world: &World) -> &[GeoPoint] {
        &world.history
    }

    /// Captures a read-only view of the visible caches.
    #[must_use]
    pub fn cache_view(world: &World) -> CacheView {
        let snapshots = world
            .active
            .values()
            .map(|cache| CacheSnapshot {
                cell: cache.cell(),
                bounds: world.board.cell_bounds(cache.cell()),
                coins: cache.coins().to_vec(),
            })
            .collect();
        CacheView { snapshots }
    }

    /// Read-only snapshot describing every visible cache.
    #[derive(Clone, Debug, Default)]
    pub struct CacheView {
        snapshots: Vec<CacheSnapshot>,
    }

    impl CacheView {
        /// Iterator over the captured cache snapshots in row-major order.
        pub fn iter(&self) -> impl Iterator<Item = &CacheSnapshot> {
            self.snapshots.iter()
        }

        /// Total number of coins held across the visible caches.
        #[must_use]
        pub fn total_coins(&self) -> usize {
            self.snapshots.iter().map(|snapshot| snapshot.coins.len()).sum()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<CacheSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single visible cache.
    #[derive(Clone, Debug, PartialEq)]
    pub struct CacheSnapshot {
        /// Cell hosting the cache.
        pub cell: CellCoord,
        /// Geographic rectangle covered by the cell.
        pub bounds: GeoBounds,
        /// Coins currently held, bottom of the stack first.
        pub coins: Vec<Coin>,
    }
}
