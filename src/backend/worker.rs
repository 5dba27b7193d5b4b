//! Poll worker
//!
//! Runs on the backend thread inside a tokio current-thread runtime. Each
//! poll tick starts one bucket refresh as a separate task, unless the
//! previous refresh is still in flight, in which case the tick is skipped.
//! UI commands arrive over a crossbeam channel and are drained on a short
//! timer of their own.

use crate::backend::client::{fetch_buckets, fetch_chart_config, DeviceApi};
use crate::backend::{BackendCommand, BackendMessage};
use crate::config::DashboardConfig;
use crate::error::StationVisError;
use crate::types::FetchStatus;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};

/// How often pending UI commands are drained
pub const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Token held by the refresh in flight; dropping it frees the slot
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    /// Take the slot if it is free
    pub fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Background poller for one station
pub struct PollWorker<A: DeviceApi> {
    api: Arc<A>,
    config: Arc<DashboardConfig>,
    command_rx: Receiver<BackendCommand>,
    message_tx: Sender<BackendMessage>,
    running: Arc<AtomicBool>,
    in_flight: Arc<AtomicBool>,
    /// Ticks skipped because a refresh was still running
    skipped_ticks: u64,
}

impl<A: DeviceApi + 'static> PollWorker<A> {
    pub fn new(
        api: A,
        config: DashboardConfig,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            api: Arc::new(api),
            config: Arc::new(config),
            command_rx,
            message_tx,
            running,
            in_flight: Arc::new(AtomicBool::new(false)),
            skipped_ticks: 0,
        }
    }

    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run until shutdown is requested or the UI goes away
    pub async fn run(&mut self) {
        tracing::info!(
            device = %self.config.device_url,
            interval_secs = self.config.poll_interval_secs,
            "Poll worker started"
        );

        if self.config.fetch_device_config {
            self.load_device_config().await;
        }

        let mut poll = interval(self.config.poll_interval());
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut commands = interval(COMMAND_POLL_INTERVAL);
        commands.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = poll.tick() => self.start_refresh(),
                _ = commands.tick() => self.process_commands(),
            }
        }

        self.try_send_message(BackendMessage::Shutdown);
        tracing::info!(skipped_ticks = self.skipped_ticks, "Poll worker stopped");
    }

    /// Replace the local plot layout with the device's, if it serves one
    async fn load_device_config(&mut self) {
        match fetch_chart_config(&*self.api, self.config.timeouts.default_timeout()).await {
            Ok(chart) => {
                tracing::info!(plots = chart.plots.len(), "Loaded chart config from device");
                self.try_send_message(BackendMessage::ChartConfig(chart));
            }
            Err(e) => {
                tracing::warn!("Device chart config unavailable, using local plots: {}", e);
            }
        }
    }

    /// Spawn a refresh unless one is already running
    fn start_refresh(&mut self) {
        let Some(guard) = InFlightGuard::try_acquire(&self.in_flight) else {
            self.skipped_ticks += 1;
            tracing::debug!("Skipping poll tick, refresh still in flight");
            return;
        };
        tokio::spawn(refresh(
            self.api.clone(),
            self.config.clone(),
            self.message_tx.clone(),
            guard,
        ));
    }

    /// Process pending commands from the UI
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::RefreshNow => {
                tracing::debug!("Refresh requested by UI");
                self.start_refresh();
            }
            BackendCommand::Shutdown => {
                tracing::info!("Shutdown requested");
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Send without blocking; a full queue drops the message
    fn try_send_message(&self, msg: BackendMessage) {
        if self.message_tx.try_send(msg).is_err() {
            tracing::warn!("UI message queue full, dropping message");
        }
    }
}

/// One bucket fetch; the guard is released when this returns
async fn refresh<A: DeviceApi>(
    api: Arc<A>,
    config: Arc<DashboardConfig>,
    message_tx: Sender<BackendMessage>,
    _guard: InFlightGuard,
) {
    let started = Instant::now();
    let local_now = chrono::Local::now().timestamp();

    let status = match fetch_buckets(&*api, &config, local_now).await {
        Ok(batch) => {
            tracing::debug!(
                samples = batch.samples.len(),
                dropped = batch.dropped,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Bucket refresh complete"
            );
            if message_tx.try_send(BackendMessage::Batch(batch)).is_err() {
                tracing::warn!("UI message queue full, dropping bucket batch");
            }
            FetchStatus::Ok
        }
        Err(e) => fetch_failure(&e),
    };
    if message_tx.try_send(BackendMessage::FetchStatus(status)).is_err() {
        tracing::debug!("UI message queue unavailable, dropping fetch status");
    }
}

fn fetch_failure(e: &StationVisError) -> FetchStatus {
    if e.is_timeout() {
        tracing::warn!("Bucket refresh timed out: {}", e);
        FetchStatus::TimedOut(e.to_string())
    } else {
        tracing::warn!("Bucket refresh failed: {}", e);
        FetchStatus::Failed(e.to_string())
    }
}
