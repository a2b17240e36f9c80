//! Coins carried by the player and the transfer protocol with caches.

use geocoin_core::Coin;

use crate::caches::Cache;

/// Ordered collection of coins held by the player.
///
/// The inventory only changes through transfers with a [`Cache`]; every
/// transfer moves exactly one coin so the combined coin count is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    coins: Vec<Coin>,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub const fn new() -> Self {
        Self { coins: Vec::new() }
    }

    /// Coins held, oldest first.
    #[must_use]
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Number of coins held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// Reports whether the player holds no coins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Moves the cache's last coin into the inventory.
    ///
    /// Returns `None`, leaving both sides untouched, when the cache is empty.
    pub fn collect(&mut self, cache: &mut Cache) -> Option<Coin> {
        let coin = cache.pop()?;
        self.coins.push(coin);
        Some(coin)
    }

    /// Moves the inventory's last coin into the cache.
    ///
    /// Returns `None`, leaving both sides untouched, when the inventory is
    /// empty.
    pub fn deposit(&mut self, cache: &mut Cache) -> Option<Coin> {
        let coin = self.coins.pop()?;
        cache.push(coin);
        Some(coin)
    }

    /// Moves one specific coin from the cache into the inventory.
    pub fn collect_coin(&mut self, cache: &mut Cache, coin: Coin) -> Option<Coin> {
        let coin = cache.remove(coin)?;
        self.coins.push(coin);
        Some(coin)
    }

    pub(crate) fn clear(&mut self) {
        self.coins.clear();
    }
}
