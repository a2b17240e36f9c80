#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Geocoin Carrier.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter uses Macroquad's immediate-mode UI module for the control panel
//! and the cache popup. All UI-specific calls live inside the local `ui` module
//! to avoid leaking Macroquad UI types throughout the renderer.

mod ui;

use self::ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult};
use anyhow::Result;
use geocoin_core::{Coin, Direction};
use geocoin_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, SceneCache, Viewport,
};
use glam::Vec2;
use macroquad::{
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
    math::Vec2 as MacroquadVec2,
};

/// Width of the control panel docked to the right edge of the window.
const CONTROL_PANEL_WIDTH: f32 = 280.0;

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    movement_latched: Option<Direction>,
    reset_latched: bool,
    collect_latched: bool,
    deposit_latched: bool,
    take_latched: Option<Coin>,
}

impl ControlPanelInputState {
    /// Returns the latched movement request, clearing it so the step fires once.
    pub fn take_movement(&mut self) -> Option<Direction> {
        self.movement_latched.take()
    }

    /// Records that a movement button was pressed this frame.
    pub fn register_movement(&mut self, direction: Direction) {
        self.movement_latched = Some(direction);
    }

    /// Returns whether the UI requested a reset and clears the latch.
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_latched)
    }

    /// Records that the reset button was pressed this frame.
    pub fn register_reset(&mut self) {
        self.reset_latched = true;
    }

    /// Returns whether the popup requested a collect and clears the latch.
    pub fn take_collect(&mut self) -> bool {
        std::mem::take(&mut self.collect_latched)
    }

    /// Records that the popup's collect button was pressed this frame.
    pub fn register_collect(&mut self) {
        self.collect_latched = true;
    }

    /// Returns whether the popup requested a deposit and clears the latch.
    pub fn take_deposit(&mut self) -> bool {
        std::mem::take(&mut self.deposit_latched)
    }

    /// Records that the popup's deposit button was pressed this frame.
    pub fn register_deposit(&mut self) {
        self.deposit_latched = true;
    }

    /// Returns the coin picked from the popup's coin list and clears the latch.
    pub fn take_coin(&mut self) -> Option<Coin> {
        self.take_latched.take()
    }

    /// Records that a coin button in the popup was pressed this frame.
    pub fn register_coin(&mut self, coin: Coin) {
        self.take_latched = Some(coin);
    }

    fn register(&mut self, result: ControlPanelUiResult) {
        if let Some(direction) = result.movement {
            self.register_movement(direction);
        }
        if result.reset {
            self.register_reset();
        }
        if result.collect {
            self.register_collect();
        }
        if result.deposit {
            self.register_deposit();
        }
        if let Some(coin) = result.take {
            self.register_coin(coin);
        }
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// Arrow keys step the player one cell.
    movement: Option<Direction>,
    /// `C` collects from the selected cache.
    collect: bool,
    /// `D` deposits into the selected cache.
    deposit: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let movement = [
            (KeyCode::Up, Direction::North),
            (KeyCode::Right, Direction::East),
            (KeyCode::Down, Direction::South),
            (KeyCode::Left, Direction::West),
        ]
        .into_iter()
        .find(|(key, _)| is_key_pressed(*key))
        .map(|(_, direction)| direction);

        Self {
            quit_requested,
            movement,
            collect: is_key_pressed(KeyCode::C),
            deposit: is_key_pressed(KeyCode::D),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &Viewport, &mut Scene) + 'static,
    {
        let Self { swap_interval } = self;

        let Presentation {
            window_title,
            clear_color,
            viewport,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960 + CONTROL_PANEL_WIDTH as i32,
            window_height: 960,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let panel_background = to_macroquad_color(clear_color.lighten(0.15));
            let mut control_panel_input = ControlPanelInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let map_size = map_area(screen_width, screen_height);

                let viewport_before = viewport
                    .with_screen_size(map_size)
                    .centered_on(scene.player);
                let (cursor_x, cursor_y) = mouse_position();
                let click = is_mouse_button_pressed(MouseButton::Left)
                    .then_some(Vec2::new(cursor_x, cursor_y));
                let frame_input = frame_input_from_observations(
                    keyboard,
                    &mut control_panel_input,
                    click,
                    map_size,
                );

                update_scene(frame_input, &viewport_before, &mut scene);

                let frame_viewport = viewport_before.centered_on(scene.player);
                draw_grid(&scene, &frame_viewport, map_size);
                draw_caches(&scene, &frame_viewport);
                draw_trail(&scene, &frame_viewport);
                draw_player(&scene, &frame_viewport);

                let status = scene.status_text();
                let popup = scene.popup_text();
                let left = map_size.x;
                macroquad::shapes::draw_rectangle(
                    left,
                    0.0,
                    screen_width - left,
                    screen_height,
                    panel_background,
                );
                let mut control_panel_ui = macroquad::ui::root_ui();
                let result = draw_control_panel_ui(
                    &mut control_panel_ui,
                    ControlPanelUiContext {
                        origin: MacroquadVec2::new(left, 0.0),
                        size: MacroquadVec2::new(screen_width - left, screen_height),
                        background: panel_background,
                        status: &status,
                        popup: popup.as_deref(),
                        coins: &scene.selected_coins,
                    },
                );
                control_panel_input.register(result);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn map_area(screen_width: f32, screen_height: f32) -> Vec2 {
    Vec2::new(
        (screen_width - CONTROL_PANEL_WIDTH).max(0.0),
        screen_height.max(0.0),
    )
}

/// Merges keyboard shortcuts with latched UI presses into the frame's input.
///
/// Clicks landing on the control panel are left to the UI and never select a
/// cache.
fn frame_input_from_observations(
    keyboard: KeyboardShortcuts,
    latched: &mut ControlPanelInputState,
    click: Option<Vec2>,
    map_size: Vec2,
) -> FrameInput {
    let movement = latched.take_movement().or(keyboard.movement);
    let reset = latched.take_reset();
    let collect = latched.take_collect() || keyboard.collect;
    let deposit = latched.take_deposit() || keyboard.deposit;
    let take = latched.take_coin();
    let select = click.filter(|position| {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x < map_size.x
            && position.y < map_size.y
    });

    FrameInput {
        movement,
        select,
        collect,
        deposit,
        take,
        reset,
    }
}

/// Cell-sized guide lines spanning the visible map, aligned with the drawn caches.
fn draw_grid(scene: &Scene, viewport: &Viewport, map_size: Vec2) {
    let Some((top_left, tile)) = tile_on_screen(scene, viewport) else {
        return;
    };
    let color = macroquad::color::Color::from_rgba(255, 255, 255, 20);

    let mut x = top_left.x.rem_euclid(tile.x);
    while x < map_size.x {
        macroquad::shapes::draw_line(x, 0.0, x, map_size.y, 1.0, color);
        x += tile.x;
    }

    let mut y = top_left.y.rem_euclid(tile.y);
    while y < map_size.y {
        macroquad::shapes::draw_line(0.0, y, map_size.x, y, 1.0, color);
        y += tile.y;
    }
}

/// Screen rectangle of any drawn cache, used as the reference cell size.
///
/// Grids finer than a few pixels are skipped.
fn tile_on_screen(scene: &Scene, viewport: &Viewport) -> Option<(Vec2, Vec2)> {
    let cache = scene.caches.first()?;
    let (top_left, size) = viewport.project_bounds(cache.bounds);
    (size.x >= 4.0 && size.y >= 4.0 && size.is_finite()).then_some((top_left, size))
}

fn draw_caches(scene: &Scene, viewport: &Viewport) {
    for cache in &scene.caches {
        let (top_left, size) = viewport.project_bounds(cache.bounds);
        let fill = to_macroquad_color(cache_color(cache));
        macroquad::shapes::draw_rectangle(top_left.x, top_left.y, size.x, size.y, fill);

        let selected = scene.selected == Some(cache.cell);
        let (thickness, outline) = if selected {
            (3.0, macroquad::color::WHITE)
        } else {
            (1.0, macroquad::color::Color::from_rgba(20, 20, 20, 255))
        };
        macroquad::shapes::draw_rectangle_lines(
            top_left.x,
            top_left.y,
            size.x,
            size.y,
            thickness,
            outline,
        );

        let center = viewport.project(cache.bounds.midpoint());
        let label = cache.coin_count.to_string();
        let font_size = (size.y * 0.6).clamp(10.0, 32.0);
        let _ = macroquad::text::draw_text(
            &label,
            center.x - font_size * 0.25 * label.len() as f32,
            center.y + font_size * 0.3,
            font_size,
            macroquad::color::BLACK,
        );
    }
}

fn cache_color(cache: &SceneCache) -> Color {
    if cache.coin_count == 0 {
        Color::from_rgb_u8(120, 120, 120)
    } else {
        let richness = (cache.coin_count.min(8) as f32) / 8.0;
        Color::from_rgb_u8(214, 162, 32).lighten(0.5 * (1.0 - richness))
    }
}

fn draw_trail(scene: &Scene, viewport: &Viewport) {
    let color = macroquad::color::Color::from_rgba(80, 160, 255, 200);
    for pair in scene.trail.windows(2) {
        let from = viewport.project(pair[0]);
        let to = viewport.project(pair[1]);
        macroquad::shapes::draw_line(from.x, from.y, to.x, to.y, 3.0, color);
    }
}

fn draw_player(scene: &Scene, viewport: &Viewport) {
    let position = viewport.project(scene.player);
    let radius =
        tile_on_screen(scene, viewport).map_or(6.0, |(_, tile)| tile.min_element() * 0.3);
    macroquad::shapes::draw_circle(
        position.x,
        position.y,
        radius,
        macroquad::color::Color::from_rgba(40, 110, 230, 255),
    );
    macroquad::shapes::draw_circle_lines(
        position.x,
        position.y,
        radius,
        2.0,
        macroquad::color::WHITE,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocoin_core::{CellCoord, GeoBounds, GeoPoint};

    const MAP: Vec2 = Vec2::new(960.0, 960.0);

    #[test]
    fn clicks_on_the_map_select_a_cache() {
        let mut latched = ControlPanelInputState::default();
        let input = frame_input_from_observations(
            KeyboardShortcuts::default(),
            &mut latched,
            Some(Vec2::new(480.0, 300.0)),
            MAP,
        );

        assert_eq!(input.select, Some(Vec2::new(480.0, 300.0)));
    }

    #[test]
    fn clicks_on_the_control_panel_are_ignored() {
        let mut latched = ControlPanelInputState::default();
        let input = frame_input_from_observations(
            KeyboardShortcuts::default(),
            &mut latched,
            Some(Vec2::new(1_000.0, 300.0)),
            MAP,
        );

        assert!(input.select.is_none());
    }

    #[test]
    fn latched_buttons_take_precedence_over_keys_and_fire_once() {
        let mut latched = ControlPanelInputState::default();
        latched.register_movement(Direction::West);
        latched.register_collect();
        let keyboard = KeyboardShortcuts {
            movement: Some(Direction::North),
            ..KeyboardShortcuts::default()
        };

        let first = frame_input_from_observations(keyboard, &mut latched, None, MAP);
        assert_eq!(first.movement, Some(Direction::West));
        assert!(first.collect);

        let second =
            frame_input_from_observations(KeyboardShortcuts::default(), &mut latched, None, MAP);
        assert_eq!(second, FrameInput::default());
    }

    #[test]
    fn popup_coin_buttons_reach_the_frame_input_once() {
        let coin = Coin::new(CellCoord::new(2, -1), 3);
        let mut latched = ControlPanelInputState::default();
        latched.register(ControlPanelUiResult {
            take: Some(coin),
            ..ControlPanelUiResult::default()
        });

        let first =
            frame_input_from_observations(KeyboardShortcuts::default(), &mut latched, None, MAP);
        assert_eq!(first.take, Some(coin));
        assert!(!first.collect);

        let second =
            frame_input_from_observations(KeyboardShortcuts::default(), &mut latched, None, MAP);
        assert_eq!(second, FrameInput::default());
    }

    #[test]
    fn empty_caches_are_drawn_grey() {
        let cache = SceneCache {
            handle: geocoin_rendering::CacheHandle::new(0),
            cell: CellCoord::new(0, 0),
            bounds: GeoBounds::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(1e-4, 1e-4)),
            coin_count: 0,
        };
        assert_eq!(cache_color(&cache), Color::from_rgb_u8(120, 120, 120));

        let full = SceneCache {
            coin_count: 8,
            ..cache
        };
        assert_eq!(cache_color(&full), Color::from_rgb_u8(214, 162, 32));
    }

    #[test]
    fn map_area_leaves_room_for_the_panel() {
        assert_eq!(
            map_area(960.0 + CONTROL_PANEL_WIDTH, 960.0),
            Vec2::new(960.0, 960.0)
        );
        assert_eq!(map_area(100.0, 50.0), Vec2::new(0.0, 50.0));
    }
}
