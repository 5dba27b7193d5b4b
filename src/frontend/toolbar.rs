//! Toolbar: zoom presets, reset, refresh and theme toggle.

use egui::{RichText, Ui};

use crate::chart::theme::Theme;
use crate::config::ZOOM_PRESETS_HOURS;

/// Context needed to render the toolbar.
pub struct ToolbarContext {
    /// Preset shown as selected
    pub active_preset: Option<u32>,
    /// A zoom is active and can be cleared
    pub reset_visible: bool,
    pub theme: Theme,
}

/// Something the user asked for from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    ZoomPreset(u32),
    ResetZoom,
    RefreshNow,
    ToggleTheme,
}

/// Render the toolbar and return the actions clicked this frame.
pub fn render_toolbar(ui: &mut Ui, ctx: &ToolbarContext) -> Vec<ToolbarAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 4.0;

        ui.label("Zoom:");
        for hours in ZOOM_PRESETS_HOURS {
            let selected = ctx.active_preset == Some(hours);
            if ui
                .selectable_label(selected, format!("{}h", hours))
                .on_hover_text(format!("Show the last {} hours", hours))
                .clicked()
            {
                actions.push(ToolbarAction::ZoomPreset(hours));
            }
        }

        if ctx.reset_visible
            && ui
                .button("Reset zoom")
                .on_hover_text("Show all data (or double-click a chart)")
                .clicked()
        {
            actions.push(ToolbarAction::ResetZoom);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let theme_label = if ctx.theme.is_dark() { "Light" } else { "Dark" };
            if ui
                .button(RichText::new(theme_label))
                .on_hover_text("Switch color theme")
                .clicked()
            {
                actions.push(ToolbarAction::ToggleTheme);
            }
            if ui.button("Refresh").on_hover_text("Fetch now").clicked() {
                actions.push(ToolbarAction::RefreshNow);
            }
        });
    });

    actions
}
