//! Status bar: last fetch outcome, bucket width and device clock.

use chrono::{DateTime, Local};
use egui::{Color32, RichText, Ui};

use crate::types::FetchStatus;

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub device_url: &'a str,
    pub fetch_status: &'a FetchStatus,
    pub bucket_seconds: Option<u32>,
    pub last_update: Option<DateTime<Local>>,
    /// Malformed tuples dropped from the last batch
    pub dropped: usize,
}

/// Bucket width as shown to the user; `--` until the device reports one
pub fn bucket_label(bucket_seconds: Option<u32>) -> String {
    match bucket_seconds {
        Some(s) => format!("{} s", s),
        None => "--".to_string(),
    }
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let (status_color, status_text) = match ctx.fetch_status {
            FetchStatus::Idle => (Color32::GRAY, "Waiting"),
            FetchStatus::Ok => (Color32::GREEN, "Online"),
            FetchStatus::TimedOut(_) => (Color32::YELLOW, "Timed out"),
            FetchStatus::Failed(_) => (Color32::RED, "Error"),
        };
        ui.colored_label(status_color, "●");
        ui.label(RichText::new(format!("{}: {}", status_text, ctx.device_url)).small());

        ui.separator();

        ui.label(RichText::new(format!("Bucket: {}", bucket_label(ctx.bucket_seconds))).small());

        if let Some(at) = ctx.last_update {
            ui.separator();
            ui.label(RichText::new(format!("Updated {}", at.format("%H:%M:%S"))).small());
        }

        if ctx.dropped > 0 {
            ui.separator();
            ui.colored_label(
                Color32::LIGHT_RED,
                RichText::new(format!("Dropped: {}", ctx.dropped)).small(),
            );
        }

        // === Error message (right-aligned) ===
        if let FetchStatus::TimedOut(msg) | FetchStatus::Failed(msg) = ctx.fetch_status {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(Color32::RED, RichText::new(msg).small());
            });
        }
    });
}
