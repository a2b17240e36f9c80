//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use geocoin_core::{Coin, Direction};
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Outcome of rendering the control panel UI during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Movement button pressed during this frame, if any.
    pub(crate) movement: Option<Direction>,
    /// Whether the reset button was pressed during this frame.
    pub(crate) reset: bool,
    /// Whether the popup's collect button was pressed during this frame.
    pub(crate) collect: bool,
    /// Whether the popup's deposit button was pressed during this frame.
    pub(crate) deposit: bool,
    /// Coin whose button was pressed in the popup's coin list, if any.
    pub(crate) take: Option<Coin>,
}

/// Snapshot of the control panel's UI layout and data for the current frame.
#[derive(Clone, Debug)]
pub(crate) struct ControlPanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour applied to the window skin so the UI matches the
    /// adapter's solid rectangle.
    pub(crate) background: Color,
    /// Inventory listing shown in the status area.
    pub(crate) status: &'a str,
    /// Description of the selected cache, when its popup is open.
    pub(crate) popup: Option<&'a str>,
    /// Coins held by the selected cache, listed as buttons in the popup.
    pub(crate) coins: &'a [Coin],
}

const MOVEMENT_BUTTONS: [(&str, Direction); 4] = [
    ("North", Direction::North),
    ("South", Direction::South),
    ("West", Direction::West),
    ("East", Direction::East),
];

/// Renders the control panel's interactive elements for the current frame.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext<'_>,
) -> ControlPanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(16.0, 16.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .color_selected(Color::from_rgba(70, 70, 70, 255))
        .color_selected_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_inactive(Color::from_rgba(56, 56, 56, 200))
        .margin(RectOffset::new(0.0, 0.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut result = ControlPanelUiResult::default();
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        ui.label(None, "Inventory:");
        ui.label(None, context.status);

        ui.label(None, "Move with the arrow keys or the buttons below.");
        for (label, direction) in MOVEMENT_BUTTONS {
            if ui.button(None, label) {
                result.movement = Some(direction);
            }
        }

        if ui.button(None, "Reset") {
            result.reset = true;
        }

        if let Some(popup) = context.popup {
            ui.separator();
            ui.label(None, popup);
            result.collect = ui.button(None, "Collect");
            result.deposit = ui.button(None, "Deposit");
            for &coin in context.coins {
                if ui.button(None, format!("Take {coin}").as_str()) {
                    result.take = Some(coin);
                }
            }
        } else {
            ui.label(None, "Click a cache to open it.");
        }
    });

    ui.pop_skin();

    result
}
