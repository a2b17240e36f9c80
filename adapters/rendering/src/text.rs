//! Text shown in the status panel and cache popups.

use geocoin_core::{CellCoord, Coin};

/// Message shown while the inventory holds no coins.
pub const EMPTY_INVENTORY: &str = "No coins yet";

/// Status panel text listing every coin the player carries.
#[must_use]
pub fn status_text(coins: &[Coin]) -> String {
    if coins.is_empty() {
        return EMPTY_INVENTORY.to_owned();
    }

    coins
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Popup text describing the cache at `cell`.
#[must_use]
pub fn popup_text(cell: CellCoord, coin_count: usize) -> String {
    format!(
        "Location: ({} : {}), Number of coins: {coin_count}",
        cell.i(),
        cell.j()
    )
}
