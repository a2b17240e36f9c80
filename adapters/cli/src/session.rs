//! Drives one game session: the world, its systems and the presenter.

use geocoin_core::{Command, Event};
use geocoin_rendering::{FrameInput, MapRenderer, Presenter, Scene, Viewport};
use geocoin_system_bootstrap::Bootstrap;
use geocoin_system_neighborhood::Neighborhood;
use geocoin_world::{
    self as world,
    config::{Config, ConfigError},
    query, World,
};
use tracing::trace;

/// Owns the authoritative world and routes commands through every system.
#[derive(Debug)]
pub(crate) struct GameLoop {
    world: World,
    neighborhood: Neighborhood,
    presenter: Presenter,
}

impl GameLoop {
    /// Creates a session from a configuration.
    pub(crate) fn new(config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            world: World::with_config(config)?,
            neighborhood: Neighborhood::new(),
            presenter: Presenter::new(),
        })
    }

    /// Read-only access to the authoritative world.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Issues the bootstrap commands that populate the first view.
    pub(crate) fn start<R>(&mut self, renderer: &mut R) -> Vec<Event>
    where
        R: MapRenderer + ?Sized,
    {
        let commands = Bootstrap.initial_commands(&self.world);
        self.run(commands, renderer)
    }

    /// Applies `command` and every follow-up command the systems request.
    ///
    /// The returned events have already been presented to `renderer`.
    pub(crate) fn submit<R>(&mut self, command: Command, renderer: &mut R) -> Vec<Event>
    where
        R: MapRenderer + ?Sized,
    {
        self.run(vec![command], renderer)
    }

    fn run<R>(&mut self, mut pending: Vec<Command>, renderer: &mut R) -> Vec<Event>
    where
        R: MapRenderer + ?Sized,
    {
        let mut all_events = Vec::new();
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                trace!(?command, "applying command");
                world::apply(&mut self.world, command, &mut events);
            }
            self.neighborhood.handle(&events, &mut pending);
            self.presenter.present(&events, renderer);
            all_events.extend(events);
        }
        all_events
    }

    /// Translates one frame of graphical input into commands.
    pub(crate) fn handle_frame(
        &mut self,
        input: FrameInput,
        viewport: &Viewport,
        scene: &mut Scene,
    ) {
        if let Some(position) = input.select {
            scene.selected = scene
                .cache_at_screen(viewport, position)
                .map(|cache| cache.cell);
        }

        if let Some(cell) = scene.selected {
            if input.collect {
                let _ = self.submit(Command::Collect { cell }, scene);
            }
            if input.deposit {
                let _ = self.submit(Command::Deposit { cell }, scene);
            }
        }

        if let Some(coin) = input.take {
            let _ = self.submit(Command::CollectCoin { coin }, scene);
        }

        if let Some(direction) = input.movement {
            let _ = self.submit(Command::MovePlayer { direction }, scene);
            if let Some(cell) = scene.selected {
                if query::active_cache(&self.world, cell).is_none() {
                    scene.selected = None;
                }
            }
        }

        if input.reset {
            let _ = self.submit(Command::ResetSession, scene);
        }

        scene.selected_coins = scene
            .selected
            .and_then(|cell| query::active_cache(&self.world, cell))
            .map(|cache| cache.coins().to_vec())
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocoin_core::Direction;
    use glam::Vec2;

    fn started() -> (GameLoop, Scene) {
        let mut game = GameLoop::new(Config::default()).expect("default config is valid");
        let mut scene = Scene::new(query::player_position(game.world()));
        let _ = game.start(&mut scene);
        (game, scene)
    }

    fn viewport_for(scene: &Scene) -> Viewport {
        Viewport::new(scene.player, 400_000.0, Vec2::splat(960.0)).expect("valid viewport")
    }

    fn richest_cache(scene: &Scene) -> geocoin_rendering::SceneCache {
        *scene
            .caches
            .iter()
            .max_by_key(|cache| cache.coin_count)
            .expect("default neighborhood holds caches")
    }

    #[test]
    fn start_reveals_the_neighborhood() {
        let (game, scene) = started();
        assert!(!scene.caches.is_empty());
        assert_eq!(scene.caches.len(), query::active_cells(game.world()).len());
    }

    #[test]
    fn moving_triggers_a_follow_up_reveal() {
        let (mut game, mut scene) = started();
        let events = game.submit(
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut scene,
        );

        assert!(matches!(events.first(), Some(Event::PlayerMoved { .. })));
        assert!(events.contains(&Event::CachesCleared));
        assert_eq!(scene.player, query::player_position(game.world()));
    }

    #[test]
    fn clicking_a_cache_then_collecting_moves_a_coin() {
        let (mut game, mut scene) = started();
        let viewport = viewport_for(&scene);
        let target = richest_cache(&scene);
        assert!(target.coin_count > 0);

        let click = viewport.project(target.bounds.midpoint());
        game.handle_frame(
            FrameInput {
                select: Some(click),
                collect: true,
                ..FrameInput::default()
            },
            &viewport,
            &mut scene,
        );

        assert_eq!(scene.selected, Some(target.cell));
        assert_eq!(
            scene.cache(target.cell).map(|cache| cache.coin_count),
            Some(target.coin_count - 1)
        );
        assert_eq!(scene.inventory.len(), 1);
    }

    #[test]
    fn picking_a_listed_coin_collects_exactly_that_coin() {
        let (mut game, mut scene) = started();
        let viewport = viewport_for(&scene);
        let target = richest_cache(&scene);
        assert!(target.coin_count > 1);

        let click = viewport.project(target.bounds.midpoint());
        game.handle_frame(
            FrameInput {
                select: Some(click),
                ..FrameInput::default()
            },
            &viewport,
            &mut scene,
        );
        assert_eq!(scene.selected_coins.len(), target.coin_count);

        let oldest = scene.selected_coins[0];
        game.handle_frame(
            FrameInput {
                take: Some(oldest),
                ..FrameInput::default()
            },
            &viewport,
            &mut scene,
        );

        assert_eq!(scene.inventory, vec![oldest]);
        assert_eq!(scene.selected_coins.len(), target.coin_count - 1);
        assert!(!scene.selected_coins.contains(&oldest));
        assert_eq!(
            scene.cache(target.cell).map(|cache| cache.coin_count),
            Some(target.coin_count - 1)
        );
    }

    #[test]
    fn collect_without_selection_does_nothing() {
        let (mut game, mut scene) = started();
        let viewport = viewport_for(&scene);
        let before = scene.clone();

        game.handle_frame(
            FrameInput {
                collect: true,
                deposit: true,
                ..FrameInput::default()
            },
            &viewport,
            &mut scene,
        );

        assert_eq!(scene, before);
    }

    #[test]
    fn reset_returns_to_the_origin_with_empty_inventory() {
        let (mut game, mut scene) = started();
        let viewport = viewport_for(&scene);
        let origin = scene.player;
        let target = richest_cache(&scene);
        scene.selected = Some(target.cell);

        game.handle_frame(
            FrameInput {
                collect: true,
                movement: Some(Direction::North),
                ..FrameInput::default()
            },
            &viewport,
            &mut scene,
        );
        game.handle_frame(
            FrameInput {
                reset: true,
                ..FrameInput::default()
            },
            &viewport,
            &mut scene,
        );

        assert_eq!(scene.player, origin);
        assert!(scene.inventory.is_empty());
        assert!(query::inventory(game.world()).is_empty());
        assert_eq!(
            scene.cache(target.cell).map(|cache| cache.coin_count),
            Some(target.coin_count)
        );
    }
}
