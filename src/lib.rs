//! # StationVis-RS: Weather Station Dashboard
//!
//! A desktop dashboard for a small weather station that serves aggregated
//! readings over HTTP. The architecture separates the polling backend from
//! the UI rendering frontend.
//!
//! ## Architecture
//!
//! - **Backend**: Polls the station's JSON API with reqwest on a tokio runtime
//!   in a separate thread
//! - **Chart**: Pure chart engine (domains, downsampling, axes, zoom, hover)
//!   producing geometry in logical viewport pixels
//! - **Frontend**: Paints that geometry with eframe/egui and routes pointer
//!   and touch input back to the engine
//! - **Communication**: Crossbeam channels for thread-safe data transfer
//!
//! ## Configuration
//!
//! The dashboard configuration (`stationvis.toml`) and the persisted UI
//! preferences (`app_state.json`) live in the platform data directory under
//! `dev.stationvis.stationvis-rs`.
//!
//! ## Example
//!
//! ```ignore
//! use stationvis_rs::{AppState, DashboardConfig, StationBackend, StationVisApp};
//!
//! fn main() -> eframe::Result<()> {
//!     let config = DashboardConfig::load_or_default(None);
//!     let app_state = AppState::load_or_default();
//!
//!     let (backend, frontend) = StationBackend::new(config.clone())
//!         .expect("HTTP client");
//!     std::thread::spawn(move || backend.run());
//!
//!     eframe::run_native(
//!         "StationVis",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| Ok(Box::new(StationVisApp::new(cc, frontend, config, app_state)))),
//!     )
//! }
//! ```

pub mod backend;
pub mod chart;
pub mod config;
pub mod error;
pub mod frontend;
pub mod types;

// Re-export commonly used types
pub use backend::{BackendCommand, BackendMessage, StationBackend};
pub use chart::ChartDashboard;
pub use config::{AppState, DashboardConfig};
pub use error::{Result, StationVisError};
pub use frontend::StationVisApp;
pub use types::{BucketBatch, FetchStatus, Sample};
