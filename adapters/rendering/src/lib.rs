#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Geocoin Carrier adapters.
//!
//! The world never touches renderer resources. Instead a [`Presenter`]
//! translates world events into calls on a [`MapRenderer`], remembering which
//! renderer-owned [`CacheHandle`] belongs to which cell. [`Scene`] is the
//! headless renderer shared by the terminal and graphical adapters.

pub mod text;

use anyhow::Result as AnyResult;
use geocoin_core::{CellCoord, Coin, Direction, Event, GeoBounds, GeoPoint, Transfer};
use glam::{DVec2, Vec2};
use std::{collections::HashMap, error::Error, fmt};
use tracing::trace;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Renderer-owned identifier of a drawn cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheHandle(u32);

impl CacheHandle {
    /// Creates a handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Drawing surface the core notifies about cache and inventory changes.
pub trait MapRenderer {
    /// Draws a cache over `bounds` and returns the handle identifying it.
    fn spawn_cache_at(&mut self, cell: CellCoord, bounds: GeoBounds, coin_count: usize)
        -> CacheHandle;

    /// Removes every drawn cache. Previously returned handles become invalid.
    fn clear_all_caches(&mut self);

    /// Refreshes the coin count shown for a drawn cache.
    fn update_cache_display(&mut self, handle: CacheHandle, coin_count: usize);

    /// Refreshes the inventory panel; the coin count is `coins.len()`.
    fn update_inventory_display(&mut self, coins: &[Coin]);

    /// Moves the player marker to `position`.
    fn move_player_marker(&mut self, position: GeoPoint);

    /// Forgets the trail of previously visited positions.
    fn clear_trail(&mut self) {}

    /// Announces a single coin transfer.
    fn show_transfer(&mut self, _coin: Coin, _transfer: Transfer) {}
}

/// Translates world events into [`MapRenderer`] calls.
#[derive(Debug, Default)]
pub struct Presenter {
    handles: HashMap<CellCoord, CacheHandle>,
}

impl Presenter {
    /// Creates a presenter that has not drawn anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwards `events` to `renderer` in order.
    ///
    /// Updates for cells that were never spawned are ignored.
    pub fn present<R>(&mut self, events: &[Event], renderer: &mut R)
    where
        R: MapRenderer + ?Sized,
    {
        for event in events {
            match event {
                Event::CachesCleared => {
                    renderer.clear_all_caches();
                    self.handles.clear();
                }
                Event::CacheSpawned {
                    cell,
                    bounds,
                    coin_count,
                } => {
                    let handle = renderer.spawn_cache_at(*cell, *bounds, *coin_count);
                    let _ = self.handles.insert(*cell, handle);
                }
                Event::CacheUpdated { cell, coin_count } => match self.handles.get(cell) {
                    Some(handle) => renderer.update_cache_display(*handle, *coin_count),
                    None => trace!(%cell, "skipped update for a cache that is not drawn"),
                },
                Event::InventoryChanged { coins } => renderer.update_inventory_display(coins),
                Event::CoinTransferred { coin, transfer, .. } => {
                    renderer.show_transfer(*coin, *transfer);
                }
                Event::PlayerMoved { position, .. } => renderer.move_player_marker(*position),
                Event::SessionReset { position } => {
                    renderer.clear_trail();
                    renderer.move_player_marker(*position);
                }
            }
        }
    }

    /// Handle of the drawn cache at `cell`, if any.
    #[must_use]
    pub fn handle_for(&self, cell: CellCoord) -> Option<CacheHandle> {
        self.handles.get(&cell).copied()
    }
}

/// Cache drawn in a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneCache {
    /// Handle returned when the cache was spawned.
    pub handle: CacheHandle,
    /// Cell hosting the cache.
    pub cell: CellCoord,
    /// Geographic rectangle covered by the cache.
    pub bounds: GeoBounds,
    /// Coin count last reported for the cache.
    pub coin_count: usize,
}

/// Headless map scene describing everything an adapter draws.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Caches currently on the map, in spawn order.
    pub caches: Vec<SceneCache>,
    /// Position of the player marker.
    pub player: GeoPoint,
    /// Positions the player marker has visited, oldest first.
    pub trail: Vec<GeoPoint>,
    /// Coins shown in the inventory panel.
    pub inventory: Vec<Coin>,
    /// Cache whose popup is open, if any.
    pub selected: Option<CellCoord>,
    /// Coins held by the selected cache, oldest first.
    pub selected_coins: Vec<Coin>,
    /// Most recent transfer announcement.
    pub last_transfer: Option<(Coin, Transfer)>,
    next_handle: u32,
}

impl Scene {
    /// Creates an empty scene with the player marker at `player`.
    #[must_use]
    pub fn new(player: GeoPoint) -> Self {
        Self {
            caches: Vec::new(),
            player,
            trail: vec![player],
            inventory: Vec::new(),
            selected: None,
            selected_coins: Vec::new(),
            last_transfer: None,
            next_handle: 0,
        }
    }

    /// Drawn cache hosted at `cell`, if any.
    #[must_use]
    pub fn cache(&self, cell: CellCoord) -> Option<&SceneCache> {
        self.caches.iter().find(|cache| cache.cell == cell)
    }

    /// Drawn cache whose bounds contain `point`, if any.
    #[must_use]
    pub fn cache_at(&self, point: GeoPoint) -> Option<&SceneCache> {
        self.caches.iter().find(|cache| cache.bounds.contains(point))
    }

    /// Drawn cache under the screen position `screen`, if any.
    #[must_use]
    pub fn cache_at_screen(&self, viewport: &Viewport, screen: Vec2) -> Option<&SceneCache> {
        self.cache_at(viewport.unproject(screen))
    }

    /// Opens the popup of the cache under `point`, closing any other popup.
    pub fn select_at(&mut self, point: GeoPoint) -> Option<CellCoord> {
        self.selected = self.cache_at(point).map(|cache| cache.cell);
        self.selected
    }

    /// Popup text for the selected cache, if its popup is open.
    #[must_use]
    pub fn popup_text(&self) -> Option<String> {
        let cache = self.cache(self.selected?)?;
        Some(text::popup_text(cache.cell, cache.coin_count))
    }

    /// Status panel text describing the inventory.
    #[must_use]
    pub fn status_text(&self) -> String {
        text::status_text(&self.inventory)
    }
}

impl MapRenderer for Scene {
    fn spawn_cache_at(
        &mut self,
        cell: CellCoord,
        bounds: GeoBounds,
        coin_count: usize,
    ) -> CacheHandle {
        let handle = CacheHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.caches.push(SceneCache {
            handle,
            cell,
            bounds,
            coin_count,
        });
        handle
    }

    fn clear_all_caches(&mut self) {
        self.caches.clear();
    }

    fn update_cache_display(&mut self, handle: CacheHandle, coin_count: usize) {
        if let Some(cache) = self.caches.iter_mut().find(|cache| cache.handle == handle) {
            cache.coin_count = coin_count;
        }
    }

    fn update_inventory_display(&mut self, coins: &[Coin]) {
        self.inventory = coins.to_vec();
    }

    fn move_player_marker(&mut self, position: GeoPoint) {
        self.player = position;
        if self.trail.last() != Some(&position) {
            self.trail.push(position);
        }
    }

    fn clear_trail(&mut self) {
        self.trail.clear();
        self.selected = None;
        self.selected_coins.clear();
        self.last_transfer = None;
    }

    fn show_transfer(&mut self, coin: Coin, transfer: Transfer) {
        self.last_transfer = Some((coin, transfer));
    }
}

/// Projection between geographic coordinates and screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    center: DVec2,
    pixels_per_degree: f64,
    screen_size: Vec2,
}

impl Viewport {
    /// Creates a viewport centred on `center`.
    pub fn new(
        center: GeoPoint,
        pixels_per_degree: f64,
        screen_size: Vec2,
    ) -> Result<Self, RenderingError> {
        if !pixels_per_degree.is_finite() || pixels_per_degree <= 0.0 {
            return Err(RenderingError::InvalidScale { pixels_per_degree });
        }
        Ok(Self {
            center: to_dvec(center),
            pixels_per_degree,
            screen_size,
        })
    }

    /// Returns a copy of the viewport recentred on `center`.
    #[must_use]
    pub fn centered_on(self, center: GeoPoint) -> Self {
        Self {
            center: to_dvec(center),
            ..self
        }
    }

    /// Returns a copy of the viewport sized for a new screen.
    #[must_use]
    pub fn with_screen_size(self, screen_size: Vec2) -> Self {
        Self {
            screen_size,
            ..self
        }
    }

    /// Screen dimensions in pixels.
    #[must_use]
    pub const fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    /// Number of pixels spanned by one degree on either axis.
    #[must_use]
    pub const fn pixels_per_degree(&self) -> f64 {
        self.pixels_per_degree
    }

    /// Maps a geographic point onto the screen; north points up.
    #[must_use]
    pub fn project(&self, point: GeoPoint) -> Vec2 {
        let offset = (to_dvec(point) - self.center) * self.pixels_per_degree;
        let half = self.screen_size.as_dvec2() / 2.0;
        DVec2::new(half.x + offset.x, half.y - offset.y).as_vec2()
    }

    /// Maps a screen position back to geographic coordinates.
    #[must_use]
    pub fn unproject(&self, screen: Vec2) -> GeoPoint {
        let half = self.screen_size.as_dvec2() / 2.0;
        let screen = screen.as_dvec2();
        let offset = DVec2::new(screen.x - half.x, half.y - screen.y) / self.pixels_per_degree;
        let point = self.center + offset;
        GeoPoint::new(point.y, point.x)
    }

    /// Screen-space rectangle `(top_left, size)` covering `bounds`.
    #[must_use]
    pub fn project_bounds(&self, bounds: GeoBounds) -> (Vec2, Vec2) {
        let south_west = self.project(bounds.south_west());
        let north_east = self.project(bounds.north_east());
        let top_left = Vec2::new(south_west.x, north_east.y);
        let size = Vec2::new(north_east.x - south_west.x, south_west.y - north_east.y);
        (top_left, size)
    }
}

fn to_dvec(point: GeoPoint) -> DVec2 {
    DVec2::new(point.lng, point.lat)
}

/// Input snapshot gathered by adapters for a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Movement button pressed this frame, if any.
    pub movement: Option<Direction>,
    /// Screen position clicked this frame, if any.
    pub select: Option<Vec2>,
    /// Whether the popup's collect button was pressed.
    pub collect: bool,
    /// Whether the popup's deposit button was pressed.
    pub deposit: bool,
    /// Coin picked from the popup's coin list, if any.
    pub take: Option<Coin>,
    /// Whether the reset button was pressed.
    pub reset: bool,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Projection used to place the scene on screen.
    pub viewport: Viewport,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, viewport: Viewport, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            viewport,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Geocoin Carrier scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the per-frame input
    /// captured by the adapter, plus the viewport used to interpret it, and
    /// mutates the scene before it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &Viewport, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The viewport scale must be a positive finite number.
    InvalidScale {
        /// Provided scale that failed validation.
        pixels_per_degree: f64,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScale { pixels_per_degree } => {
                write!(
                    f,
                    "pixels_per_degree must be positive and finite (received {pixels_per_degree})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(i: i32, j: i32) -> GeoBounds {
        let tile = 1e-4;
        GeoBounds::new(
            GeoPoint::new(f64::from(i) * tile, f64::from(j) * tile),
            GeoPoint::new(f64::from(i + 1) * tile, f64::from(j + 1) * tile),
        )
    }

    #[test]
    fn presenter_routes_updates_through_handles() {
        let mut scene = Scene::new(GeoPoint::new(0.0, 0.0));
        let mut presenter = Presenter::new();
        let first = CellCoord::new(0, 0);
        let second = CellCoord::new(2, 3);

        presenter.present(
            &[
                Event::CachesCleared,
                Event::CacheSpawned {
                    cell: first,
                    bounds: bounds(0, 0),
                    coin_count: 3,
                },
                Event::CacheSpawned {
                    cell: second,
                    bounds: bounds(2, 3),
                    coin_count: 1,
                },
                Event::CacheUpdated {
                    cell: second,
                    coin_count: 4,
                },
            ],
            &mut scene,
        );

        assert_eq!(scene.cache(first).map(|cache| cache.coin_count), Some(3));
        assert_eq!(scene.cache(second).map(|cache| cache.coin_count), Some(4));
        assert_eq!(
            presenter.handle_for(second),
            scene.cache(second).map(|cache| cache.handle)
        );
    }

    #[test]
    fn clearing_invalidates_handles() {
        let mut scene = Scene::new(GeoPoint::new(0.0, 0.0));
        let mut presenter = Presenter::new();
        let cell = CellCoord::new(1, 1);

        presenter.present(
            &[
                Event::CacheSpawned {
                    cell,
                    bounds: bounds(1, 1),
                    coin_count: 2,
                },
                Event::CachesCleared,
                Event::CacheUpdated {
                    cell,
                    coin_count: 0,
                },
            ],
            &mut scene,
        );

        assert!(scene.caches.is_empty());
        assert!(presenter.handle_for(cell).is_none());
    }

    #[test]
    fn respawned_caches_receive_fresh_handles() {
        let mut scene = Scene::new(GeoPoint::new(0.0, 0.0));
        let mut presenter = Presenter::new();
        let cell = CellCoord::new(0, 0);
        let spawn = Event::CacheSpawned {
            cell,
            bounds: bounds(0, 0),
            coin_count: 1,
        };

        presenter.present(&[spawn.clone()], &mut scene);
        let before = presenter.handle_for(cell);
        presenter.present(&[Event::CachesCleared, spawn], &mut scene);

        assert_ne!(presenter.handle_for(cell), before);
        assert_eq!(scene.caches.len(), 1);
    }

    #[test]
    fn reset_clears_trail_and_moves_marker() {
        let start = GeoPoint::new(0.0, 0.0);
        let mut scene = Scene::new(start);
        let mut presenter = Presenter::new();
        presenter.present(
            &[Event::PlayerMoved {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(1, 0),
                position: GeoPoint::new(1e-4, 0.0),
            }],
            &mut scene,
        );
        assert_eq!(scene.trail.len(), 2);

        presenter.present(&[Event::SessionReset { position: start }], &mut scene);

        assert_eq!(scene.player, start);
        assert_eq!(scene.trail, vec![start]);
    }

    #[test]
    fn selecting_a_cache_opens_its_popup() {
        let mut scene = Scene::new(GeoPoint::new(0.0, 0.0));
        let cell = CellCoord::new(0, 0);
        let _ = scene.spawn_cache_at(cell, bounds(0, 0), 2);

        assert_eq!(scene.select_at(bounds(0, 0).midpoint()), Some(cell));
        assert_eq!(
            scene.popup_text().as_deref(),
            Some("Location: (0 : 0), Number of coins: 2")
        );
        assert_eq!(scene.select_at(bounds(5, 5).midpoint()), None);
        assert!(scene.popup_text().is_none());
    }

    #[test]
    fn cache_under_the_cursor_is_found_through_the_viewport() {
        let mut scene = Scene::new(GeoPoint::new(0.0, 0.0));
        let cell = CellCoord::new(1, 2);
        let _ = scene.spawn_cache_at(cell, bounds(1, 2), 4);
        let viewport = Viewport::new(scene.player, 400_000.0, Vec2::splat(960.0))
            .expect("valid viewport");

        let screen = viewport.project(bounds(1, 2).midpoint());
        assert_eq!(
            scene
                .cache_at_screen(&viewport, screen)
                .map(|cache| cache.cell),
            Some(cell)
        );
        assert!(scene
            .cache_at_screen(&viewport, viewport.project(bounds(0, 0).midpoint()))
            .is_none());
    }

    #[test]
    fn viewport_rejects_non_positive_scale() {
        let error = Viewport::new(GeoPoint::new(0.0, 0.0), 0.0, Vec2::splat(100.0))
            .expect_err("zero scale must be rejected");
        assert_eq!(
            error,
            RenderingError::InvalidScale {
                pixels_per_degree: 0.0
            }
        );
    }

    #[test]
    fn viewport_places_center_mid_screen_with_north_up() {
        let center = GeoPoint::new(10.0, 20.0);
        let viewport =
            Viewport::new(center, 100.0, Vec2::new(200.0, 100.0)).expect("valid viewport");

        assert_eq!(viewport.project(center), Vec2::new(100.0, 50.0));
        let north = viewport.project(GeoPoint::new(10.1, 20.0));
        let east = viewport.project(GeoPoint::new(10.0, 20.1));
        assert!(north.y < 50.0);
        assert!(east.x > 100.0);
    }

    #[test]
    fn unproject_inverts_project() {
        let viewport = Viewport::new(
            GeoPoint::new(36.9895, -122.0628),
            400_000.0,
            Vec2::new(960.0, 960.0),
        )
        .expect("valid viewport");
        let point = GeoPoint::new(36.9897, -122.0625);
        let restored = viewport.unproject(viewport.project(point));

        assert!((restored.lat - point.lat).abs() < 1e-6);
        assert!((restored.lng - point.lng).abs() < 1e-6);
    }

    #[test]
    fn projected_bounds_have_positive_size() {
        let viewport = Viewport::new(GeoPoint::new(0.0, 0.0), 400_000.0, Vec2::splat(960.0))
            .expect("valid viewport");
        let (_, size) = viewport.project_bounds(bounds(0, 0));
        assert!((size.x - 40.0).abs() < 1e-3);
        assert!((size.y - 40.0).abs() < 1e-3);
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert!((color.red - 0.5).abs() < f32::EPSILON);
        assert!((color.alpha - 1.0).abs() < f32::EPSILON);
    }
}
