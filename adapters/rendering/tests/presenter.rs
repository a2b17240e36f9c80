use geocoin_core::{Command, Direction, Event};
use geocoin_rendering::{text, Presenter, Scene};
use geocoin_world::{self as world, query, World};

fn submit(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn reveal(world: &mut World) -> Vec<Event> {
    let center = query::player_position(world);
    submit(world, Command::RevealNeighborhood { center })
}

#[test]
fn scene_mirrors_the_visible_caches() {
    let mut world = World::new();
    let mut scene = Scene::new(query::player_position(&world));
    let mut presenter = Presenter::new();

    presenter.present(&reveal(&mut world), &mut scene);

    let mut drawn: Vec<_> = scene.caches.iter().map(|cache| cache.cell).collect();
    drawn.sort();
    assert_eq!(drawn, query::active_cells(&world));
    for cache in &scene.caches {
        let active = query::active_cache(&world, cache.cell).expect("visible");
        assert_eq!(cache.coin_count, active.len());
        assert!(presenter.handle_for(cache.cell).is_some());
    }
}

#[test]
fn collecting_updates_the_drawn_cache_and_status() {
    let mut world = World::new();
    let mut scene = Scene::new(query::player_position(&world));
    let mut presenter = Presenter::new();
    presenter.present(&reveal(&mut world), &mut scene);

    let cell = query::active_cells(&world)
        .into_iter()
        .find(|cell| query::active_cache(&world, *cell).is_some_and(|cache| !cache.is_empty()))
        .expect("default neighborhood holds a cache with coins");
    let before = scene.cache(cell).expect("drawn").coin_count;

    presenter.present(&submit(&mut world, Command::Collect { cell }), &mut scene);

    assert_eq!(scene.cache(cell).expect("drawn").coin_count, before - 1);
    assert_eq!(scene.inventory, query::inventory(&world));
    assert_eq!(scene.status_text(), text::status_text(query::inventory(&world)));
    assert!(scene.last_transfer.is_some());
}

#[test]
fn moving_redraws_around_the_player() {
    let mut world = World::new();
    let mut scene = Scene::new(query::player_position(&world));
    let mut presenter = Presenter::new();
    presenter.present(&reveal(&mut world), &mut scene);

    let mut events = submit(
        &mut world,
        Command::MovePlayer {
            direction: Direction::North,
        },
    );
    events.extend(reveal(&mut world));
    presenter.present(&events, &mut scene);

    assert_eq!(scene.player, query::player_position(&world));
    assert_eq!(scene.trail.len(), 2);
    assert_eq!(scene.caches.len(), query::active_cells(&world).len());
}
