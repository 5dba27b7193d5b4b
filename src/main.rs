//! Weather Station Dashboard - Main Entry Point
//!
//! Usage: `stationvis-rs [CONFIG.toml]`. Without an argument the config is
//! read from the app data directory, falling back to built-in defaults.

use stationvis_rs::{
    config::{AppState, DashboardConfig},
    frontend::StationVisApp,
    StationBackend,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stationvis_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting StationVis");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = DashboardConfig::load_or_default(config_path.as_deref());
    let app_state = AppState::load_or_default();

    tracing::info!("Polling {} every {:?}", config.device_url, config.poll_interval());

    let (backend, frontend) = match StationBackend::new(config.clone()) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Failed to create backend: {}", e);
            std::process::exit(1);
        }
    };
    let stop = backend.stop_handle();
    let backend_handle = std::thread::Builder::new()
        .name("station-poll".to_string())
        .spawn(move || backend.run());
    if let Err(e) = &backend_handle {
        tracing::error!("Failed to spawn backend thread: {}", e);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 900.0])
            .with_min_inner_size([360.0, 480.0])
            .with_title("Weather Station"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "StationVis",
        native_options,
        Box::new(|cc| Ok(Box::new(StationVisApp::new(cc, frontend, config, app_state)))),
    );

    // Signal backend to stop and wait for it
    tracing::info!("Shutting down...");
    stop.store(false, std::sync::atomic::Ordering::SeqCst);
    if let Ok(handle) = backend_handle {
        let _ = handle.join();
    }

    result
}
