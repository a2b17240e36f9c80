#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that keeps the revealed neighbourhood centred on the player.

use geocoin_core::{Command, Event, GeoPoint};
use tracing::trace;

/// Emits a neighbourhood reveal whenever the player's position changes.
#[derive(Debug, Default)]
pub struct Neighborhood {
    last_center: Option<GeoPoint>,
}

impl Neighborhood {
    /// Creates a new neighbourhood system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and emits at most one reveal command.
    ///
    /// Several moves within one event batch collapse into a single reveal at
    /// the final position.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let latest = events.iter().rev().find_map(|event| match event {
            Event::PlayerMoved { position, .. } | Event::SessionReset { position } => {
                Some(*position)
            }
            _ => None,
        });

        let Some(center) = latest else {
            return;
        };

        trace!(lat = center.lat, lng = center.lng, "player position changed");
        self.last_center = Some(center);
        out.push(Command::RevealNeighborhood { center });
    }

    /// Centre of the most recent reveal this system requested.
    #[must_use]
    pub fn last_center(&self) -> Option<GeoPoint> {
        self.last_center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocoin_core::CellCoord;

    #[test]
    fn ignores_batches_without_movement() {
        let mut system = Neighborhood::new();
        let mut commands = Vec::new();
        system.handle(
            &[
                Event::CachesCleared,
                Event::CacheUpdated {
                    cell: CellCoord::new(0, 0),
                    coin_count: 1,
                },
            ],
            &mut commands,
        );
        assert!(commands.is_empty());
        assert!(system.last_center().is_none());
    }

    #[test]
    fn collapses_moves_to_the_final_position() {
        let mut system = Neighborhood::new();
        let mut commands = Vec::new();
        let final_position = GeoPoint::new(2.0, 3.0);
        system.handle(
            &[
                Event::PlayerMoved {
                    from: CellCoord::new(0, 0),
                    to: CellCoord::new(1, 0),
                    position: GeoPoint::new(1.0, 0.0),
                },
                Event::PlayerMoved {
                    from: CellCoord::new(1, 0),
                    to: CellCoord::new(2, 0),
                    position: final_position,
                },
            ],
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![Command::RevealNeighborhood {
                center: final_position
            }]
        );
        assert_eq!(system.last_center(), Some(final_position));
    }
}
