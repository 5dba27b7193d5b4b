//! Frontend module for egui UI
//!
//! This module provides the dashboard UI using eframe/egui. It receives
//! batches from the backend through crossbeam channels and feeds them to
//! the chart engine, which produces the geometry painted here.
//!
//! # Main Types
//!
//! - [`StationVisApp`] - Main application state implementing [`eframe::App`]
//!
//! # Submodules
//!
//! - `plot` - Pane painting, tooltip and pointer/touch translation
//! - `toolbar` - Zoom presets, reset, refresh and theme toggle
//! - `status_bar` - Fetch status, bucket width and last update

pub mod plot;
pub mod status_bar;
pub mod toolbar;

pub use plot::{paint_pane, paint_tooltip, show_pane, touch_starts_on_pane, PaneInputState};
pub use status_bar::{render_status_bar, StatusBarContext};
pub use toolbar::{render_toolbar, ToolbarAction, ToolbarContext};

use crate::backend::{BackendMessage, FrontendReceiver};
use crate::chart::{ChartDashboard, Theme, WallClock};
use crate::config::{app_state_path, AppState, DashboardConfig, DeviceChartConfig};
use crate::types::{BucketBatch, FetchStatus};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

/// Idle repaint interval; new batches arrive every few seconds
const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

/// egui visuals matching a theme
pub fn visuals_for(theme: Theme) -> egui::Visuals {
    if theme.is_dark() {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    }
}

/// Main application state
pub struct StationVisApp {
    frontend: FrontendReceiver,
    config: DashboardConfig,
    app_state: AppState,
    /// Where preferences are written; `None` disables persistence
    state_path: Option<PathBuf>,
    dashboard: ChartDashboard,
    fetch_status: FetchStatus,
    last_update: Option<DateTime<Local>>,
    last_dropped: usize,
    /// The saved preset is applied once, after the first batch
    preset_pending: bool,
    pane_inputs: Vec<PaneInputState>,
    touch_scroll_locked: bool,
}

impl StationVisApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        frontend: FrontendReceiver,
        config: DashboardConfig,
        app_state: AppState,
    ) -> Self {
        let app = Self::from_parts(frontend, config, app_state, app_state_path());
        cc.egui_ctx.set_visuals(visuals_for(app.dashboard.theme()));
        app
    }

    /// Build without an egui context
    pub fn from_parts(
        frontend: FrontendReceiver,
        config: DashboardConfig,
        app_state: AppState,
        state_path: Option<PathBuf>,
    ) -> Self {
        let mut dashboard = ChartDashboard::from_chart_config(
            &config.chart_config(),
            config.viewport,
            WallClock::Local,
        );
        dashboard.set_theme(Theme::from_dark_mode(app_state.ui_preferences.dark_mode));
        let pane_inputs = vec![PaneInputState::default(); dashboard.panes().len()];

        Self {
            frontend,
            config,
            app_state,
            state_path,
            dashboard,
            fetch_status: FetchStatus::Idle,
            last_update: None,
            last_dropped: 0,
            preset_pending: true,
            pane_inputs,
            touch_scroll_locked: false,
        }
    }

    pub fn dashboard(&self) -> &ChartDashboard {
        &self.dashboard
    }

    pub fn fetch_status(&self) -> &FetchStatus {
        &self.fetch_status
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    fn process_backend_messages(&mut self) -> bool {
        let messages = self.frontend.drain();
        let had_messages = !messages.is_empty();

        for msg in messages {
            self.handle_message(msg);
        }

        had_messages
    }

    fn handle_message(&mut self, msg: BackendMessage) {
        match msg {
            BackendMessage::ChartConfig(config) => self.apply_chart_config(config),
            BackendMessage::Batch(batch) => self.apply_batch(batch),
            BackendMessage::FetchStatus(status) => {
                if status.is_error() && !self.fetch_status.is_error() {
                    tracing::warn!("Station fetch failing: {:?}", status);
                }
                self.fetch_status = status;
            }
            BackendMessage::Shutdown => {
                tracing::info!("Backend shutdown received");
            }
        }
    }

    fn apply_chart_config(&mut self, config: DeviceChartConfig) {
        tracing::info!("Using device plot layout with {} plots", config.plots.len());
        let had_zoom = self.dashboard.zoom_extent().is_some();
        let max_points = config.effective_max_plot_points();
        self.dashboard.set_plots(config.plots, max_points);
        self.pane_inputs = vec![PaneInputState::default(); self.dashboard.panes().len()];
        self.touch_scroll_locked = false;
        // A new layout clears the zoom; bring the saved preset back
        if had_zoom {
            self.preset_pending = true;
            self.apply_pending_preset();
        }
    }

    fn apply_batch(&mut self, batch: BucketBatch) {
        self.last_dropped = batch.dropped;
        self.last_update = Some(Local::now());
        self.dashboard.set_batch(batch);
        self.apply_pending_preset();
    }

    fn apply_pending_preset(&mut self) {
        if !self.preset_pending || self.dashboard.full_extent().is_none() {
            return;
        }
        self.preset_pending = false;
        let hours = self.app_state.ui_preferences.zoom_preset();
        let now = self.now();
        self.dashboard.apply_zoom_preset(hours, now);
    }

    /// Device clock when known, local clock otherwise
    fn now(&self) -> f64 {
        self.dashboard
            .device_now()
            .unwrap_or_else(|| Local::now().timestamp() as f64)
    }

    fn handle_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::ZoomPreset(hours) => {
                let now = self.now();
                self.dashboard.apply_zoom_preset(hours, now);
                self.preset_pending = false;
                if self.app_state.ui_preferences.set_zoom_preset(hours) {
                    self.save_state();
                }
            }
            ToolbarAction::ResetZoom => self.dashboard.reset_zoom(),
            ToolbarAction::RefreshNow => self.frontend.refresh_now(),
            ToolbarAction::ToggleTheme => {
                let dark = !self.app_state.ui_preferences.dark_mode;
                self.app_state.ui_preferences.dark_mode = dark;
                self.dashboard.set_theme(Theme::from_dark_mode(dark));
                self.save_state();
            }
        }
    }

    /// Scrolling stays off while a pane gesture is live, including one whose
    /// touch starts in this frame's `events`
    fn scroll_locked(&self, events: &[egui::Event]) -> bool {
        self.touch_scroll_locked
            || self.dashboard.is_dragging()
            || touch_starts_on_pane(events, &self.pane_inputs)
    }

    fn save_state(&self) {
        let Some(path) = &self.state_path else {
            return;
        };
        let result = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .map_err(|e| crate::error::StationVisError::Config(e.to_string()))
            .and_then(|_| self.app_state.save_to(path));
        if let Err(e) = result {
            tracing::warn!("Failed to save app state: {}", e);
        }
    }
}

impl eframe::App for StationVisApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.process_backend_messages() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let toolbar_ctx = ToolbarContext {
                active_preset: self.dashboard.active_preset(),
                reset_visible: self.dashboard.reset_visible(),
                theme: self.dashboard.theme(),
            };
            for action in render_toolbar(ui, &toolbar_ctx) {
                self.handle_action(action);
                if action == ToolbarAction::ToggleTheme {
                    ctx.set_visuals(visuals_for(self.dashboard.theme()));
                }
            }
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render_status_bar(
                ui,
                &StatusBarContext {
                    device_url: &self.config.device_url,
                    fetch_status: &self.fetch_status,
                    bucket_seconds: self.dashboard.bucket_seconds(),
                    last_update: self.last_update,
                    dropped: self.last_dropped,
                },
            );
        });

        let scroll_locked = ctx.input(|i| self.scroll_locked(&i.events));
        let central = egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .enable_scrolling(!scroll_locked)
                .show(ui, |ui| {
                    let mut locked = false;
                    for index in 0..self.dashboard.panes().len() {
                        if let Some(input) = self.pane_inputs.get_mut(index) {
                            locked |= show_pane(ui, &mut self.dashboard, index, input);
                        }
                        ui.add_space(8.0);
                    }
                    self.touch_scroll_locked = locked;
                });
        });

        paint_tooltip(ctx, &self.dashboard, central.response.rect);

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.frontend.shutdown();
        self.save_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendCommand;
    use crate::types::Sample;
    use crossbeam_channel::{bounded, Receiver, Sender};
    use tempfile::tempdir;

    fn test_app(
        state_path: Option<PathBuf>,
    ) -> (StationVisApp, Sender<BackendMessage>, Receiver<BackendCommand>) {
        let (msg_tx, msg_rx) = bounded(16);
        let (cmd_tx, cmd_rx) = bounded(16);
        let frontend = FrontendReceiver {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };
        let app = StationVisApp::from_parts(
            frontend,
            DashboardConfig::default(),
            AppState::default(),
            state_path,
        );
        (app, msg_tx, cmd_rx)
    }

    fn day_batch(now: i64) -> BucketBatch {
        let samples = (0..=24)
            .map(|h| Sample::new((now - 86_400 + h * 3600) as f64).with("avgWind", h as f64))
            .collect();
        BucketBatch {
            now_epoch: Some(now),
            bucket_seconds: Some(600),
            samples,
            dropped: 1,
        }
    }

    #[test]
    fn test_batch_applies_saved_preset_once() {
        let (mut app, tx, _cmd) = test_app(None);
        app.app_state.ui_preferences.zoom_preset_hours = 6;

        tx.send(BackendMessage::Batch(day_batch(1_000_000))).unwrap();
        assert!(app.process_backend_messages());

        assert_eq!(app.dashboard().active_preset(), Some(6));
        assert!(app.dashboard().reset_visible());
        assert_eq!(app.dashboard().bucket_seconds(), Some(600));
        assert_eq!(app.last_dropped, 1);
        assert!(app.last_update.is_some());

        // A reset sticks across later batches
        app.handle_action(ToolbarAction::ResetZoom);
        tx.send(BackendMessage::Batch(day_batch(1_000_600))).unwrap();
        app.process_backend_messages();
        assert!(!app.dashboard().reset_visible());
    }

    #[test]
    fn test_empty_batch_keeps_preset_pending() {
        let (mut app, tx, _cmd) = test_app(None);
        tx.send(BackendMessage::Batch(BucketBatch::default())).unwrap();
        app.process_backend_messages();
        assert!(app.preset_pending);
        assert!(!app.dashboard().reset_visible());
    }

    #[test]
    fn test_fetch_status_and_shutdown_messages() {
        let (mut app, tx, _cmd) = test_app(None);
        assert!(!app.process_backend_messages());

        tx.send(BackendMessage::FetchStatus(FetchStatus::TimedOut("slow".into())))
            .unwrap();
        tx.send(BackendMessage::Shutdown).unwrap();
        app.process_backend_messages();
        assert_eq!(app.fetch_status(), &FetchStatus::TimedOut("slow".into()));
    }

    #[test]
    fn test_chart_config_replaces_panes() {
        let (mut app, tx, _cmd) = test_app(None);
        let mut config = DeviceChartConfig::default();
        config.plots.truncate(2);
        config.max_plot_points = 0;

        tx.send(BackendMessage::ChartConfig(config)).unwrap();
        app.process_backend_messages();

        assert_eq!(app.dashboard().panes().len(), 2);
        assert_eq!(app.pane_inputs.len(), 2);
        assert_eq!(
            app.dashboard().options().max_plot_points,
            crate::types::DEFAULT_MAX_PLOT_POINTS
        );
    }

    #[test]
    fn test_scroll_locks_in_the_frame_a_gesture_starts() {
        let (mut app, _tx, _cmd) = test_app(None);
        assert!(!app.scroll_locked(&[]));

        // Pane laid out last frame; a finger lands on it this frame
        app.pane_inputs[0].rect = Some(egui::Rect::from_min_max(
            egui::pos2(0.0, 0.0),
            egui::pos2(600.0, 200.0),
        ));
        let start = egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(1),
            phase: egui::TouchPhase::Start,
            pos: egui::pos2(100.0, 100.0),
            force: None,
        };
        assert!(app.scroll_locked(&[start]));

        // A drag already in progress locks without any new events
        app.dashboard.on_touch_start(0, 100.0, std::time::Instant::now());
        assert!(app.scroll_locked(&[]));
    }

    #[test]
    fn test_refresh_action_sends_command() {
        let (mut app, _tx, cmd) = test_app(None);
        app.handle_action(ToolbarAction::RefreshNow);
        assert_eq!(cmd.try_recv().unwrap(), BackendCommand::RefreshNow);
    }

    #[test]
    fn test_preferences_saved_on_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("app_state.json");
        let (mut app, tx, _cmd) = test_app(Some(path.clone()));
        tx.send(BackendMessage::Batch(day_batch(1_000_000))).unwrap();
        app.process_backend_messages();

        app.handle_action(ToolbarAction::ZoomPreset(3));
        app.handle_action(ToolbarAction::ToggleTheme);

        assert_eq!(app.dashboard().active_preset(), Some(3));
        assert_eq!(app.dashboard().theme(), Theme::Light);

        let saved = AppState::load_from(&path).unwrap();
        assert_eq!(saved.ui_preferences.zoom_preset_hours, 3);
        assert!(!saved.ui_preferences.dark_mode);
    }
}
