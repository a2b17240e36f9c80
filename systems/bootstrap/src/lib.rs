#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a fresh Geocoin Carrier session.

use geocoin_core::{Command, GeoPoint};
use geocoin_world::{query, World};

/// Produces data required to greet the player and populate the first view.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Position the player starts from.
    #[must_use]
    pub fn starting_position(&self, world: &World) -> GeoPoint {
        query::player_position(world)
    }

    /// Commands that reveal the caches around the player's starting position.
    #[must_use]
    pub fn initial_commands(&self, world: &World) -> Vec<Command> {
        vec![Command::RevealNeighborhood {
            center: self.starting_position(world),
        }]
    }
}
