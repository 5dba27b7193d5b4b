//! Backend module for polling the weather station
//!
//! This module handles all HTTP communication in a separate thread to keep
//! the UI responsive. It uses crossbeam channels for thread-safe
//! communication with the frontend.
//!
//! # Architecture
//!
//! - [`BackendCommand`] - Messages sent from UI to backend (refresh, shutdown)
//! - [`BackendMessage`] - Messages sent from backend to UI (batches, status)
//! - [`FrontendReceiver`] - UI-side handle for sending commands and receiving messages
//! - [`StationBackend`] - Entry point that owns the runtime and the poll worker
//!
//! # Components
//!
//! - [`DeviceClient`] - reqwest client for the station's JSON API
//! - [`PollWorker`] - Interval loop with an in-flight guard
//! - [`decode_buckets`] - Lenient decoding of the compact bucket format
//!
//! # Example
//!
//! ```ignore
//! use stationvis_rs::backend::{BackendMessage, StationBackend};
//! use stationvis_rs::config::DashboardConfig;
//!
//! let (backend, frontend) = StationBackend::new(DashboardConfig::default())?;
//! std::thread::spawn(move || backend.run());
//!
//! for msg in frontend.drain() {
//!     if let BackendMessage::Batch(batch) = msg {
//!         dashboard.set_batch(batch);
//!     }
//! }
//! ```

pub mod buckets;
pub mod client;
pub mod worker;

pub use buckets::{clean_sparse_json, decode_buckets};
pub use client::{DeviceApi, DeviceClient, BUCKETS_PATH, CONFIG_PATH};
pub use worker::{InFlightGuard, PollWorker};

use crate::config::{DashboardConfig, DeviceChartConfig};
use crate::error::Result;
use crate::types::{BucketBatch, FetchStatus};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Command sent from the UI to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Fetch buckets now instead of waiting for the next tick
    RefreshNow,
    /// Stop the worker
    Shutdown,
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// Plot layout served by the device
    ChartConfig(DeviceChartConfig),
    /// Freshly decoded bucket batch
    Batch(BucketBatch),
    /// Outcome of the last refresh
    FetchStatus(FetchStatus),
    /// Backend is shutting down
    Shutdown,
}

/// Frontend receiver for backend messages
pub struct FrontendReceiver {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
}

impl FrontendReceiver {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        self.receiver.try_iter().collect()
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Ask for an immediate refresh
    pub fn refresh_now(&self) {
        let _ = self.command_sender.send(BackendCommand::RefreshNow);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BackendCommand::Shutdown);
    }
}

/// The station backend that runs in a separate thread
pub struct StationBackend<A: DeviceApi = DeviceClient> {
    api: A,
    config: DashboardConfig,
    command_receiver: Receiver<BackendCommand>,
    message_sender: Sender<BackendMessage>,
    running: Arc<AtomicBool>,
}

impl StationBackend<DeviceClient> {
    /// Create a backend talking to `config.device_url`
    pub fn new(config: DashboardConfig) -> Result<(Self, FrontendReceiver)> {
        let api = DeviceClient::new(config.device_url.clone())?;
        Ok(Self::with_api(api, config))
    }
}

impl<A: DeviceApi + 'static> StationBackend<A> {
    /// Create a backend over any transport
    pub fn with_api(api: A, config: DashboardConfig) -> (Self, FrontendReceiver) {
        let (cmd_tx, cmd_rx) = bounded(64);
        // A batch every few seconds at most; the UI drains every frame
        let (msg_tx, msg_rx) = bounded(256);

        let backend = Self {
            api,
            config,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
        };

        let frontend = FrontendReceiver {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, frontend)
    }

    /// Run the backend loop on the calling thread
    pub fn run(self) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to start backend runtime: {}", e);
                self.running.store(false, Ordering::SeqCst);
                let _ = self.message_sender.try_send(BackendMessage::Shutdown);
                return;
            }
        };

        let mut worker = PollWorker::new(
            self.api,
            self.config,
            self.command_receiver,
            self.message_sender,
            self.running,
        );
        runtime.block_on(worker.run());
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
