//! Timer-driven runtime around [`ProximityMonitor`].
//!
//! Re-evaluates every tick and whenever the position watch changes. Speech is
//! dispatched on a task set owned by the loop, so stopping the runtime also
//! cancels anything still speaking.

use std::sync::Arc;
use std::time::Duration;

use safecross_core::{config::ProximityConfig, Position, SignalLocation, Speaker};
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};

use crate::monitor::{Evaluation, ProximityMonitor};

struct RunningMonitor {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the evaluation loop and its lifecycle.
///
/// Dropping the runtime aborts the loop.
pub struct MonitorRuntime {
    config: ProximityConfig,
    signals: Vec<SignalLocation>,
    speaker: Arc<dyn Speaker>,
    status_tx: watch::Sender<Option<Evaluation>>,
    running: Option<RunningMonitor>,
}

impl MonitorRuntime {
    pub fn new(
        config: ProximityConfig,
        signals: Vec<SignalLocation>,
        speaker: Arc<dyn Speaker>,
    ) -> Self {
        let (status_tx, _) = watch::channel(None);
        Self {
            config,
            signals,
            speaker,
            status_tx,
            running: None,
        }
    }

    /// Latest evaluation, updated every tick.
    pub fn subscribe(&self) -> watch::Receiver<Option<Evaluation>> {
        self.status_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|r| !r.handle.is_finished())
            .unwrap_or(false)
    }

    /// Start watching `positions`. Any previous watch is torn down and
    /// awaited first, and the monitor starts over with fresh state.
    pub async fn start(&mut self, positions: watch::Receiver<Option<Position>>) {
        if let Some(previous) = self.running.take() {
            tracing::debug!("Tearing down previous position watch");
            previous.handle.abort();
            join_loop(previous.handle).await;
        }

        let monitor = ProximityMonitor::new(self.config.clone(), self.signals.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_loop(
            monitor,
            self.speaker.clone(),
            positions,
            self.status_tx.clone(),
            shutdown_rx,
        ));

        tracing::info!(signals = self.signals.len(), "Proximity monitor started");
        self.running = Some(RunningMonitor {
            shutdown: shutdown_tx,
            handle,
        });
    }

    /// Stop the loop and wait for it to exit. Harmless when not running.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(());
        join_loop(running.handle).await;
        tracing::info!("Proximity monitor stopped");
    }
}

async fn join_loop(handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        if !e.is_cancelled() {
            tracing::error!(error = %e, "Proximity monitor task failed");
        }
    }
}

impl Drop for MonitorRuntime {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
        }
    }
}

async fn run_loop(
    mut monitor: ProximityMonitor,
    speaker: Arc<dyn Speaker>,
    mut positions: watch::Receiver<Option<Position>>,
    status_tx: watch::Sender<Option<Evaluation>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let period = Duration::from_millis(monitor.config().tick_interval_ms.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut speeches: JoinSet<()> = JoinSet::new();
    let mut positions_open = true;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
            changed = positions.changed(), if positions_open => {
                if changed.is_err() {
                    tracing::debug!("Position source closed, continuing on timer only");
                    positions_open = false;
                    continue;
                }
            }
            Some(joined) = speeches.join_next(), if !speeches.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "Speech task panicked");
                }
                monitor.utterance_finished();
                continue;
            }
        }

        let position = *positions.borrow_and_update();
        let evaluation = monitor.evaluate(position, Instant::now().into_std());

        if let Some(utterance) = evaluation.utterance.clone() {
            let speaker = speaker.clone();
            speeches.spawn(async move {
                if let Err(e) = speaker.speak(&utterance).await {
                    tracing::warn!(error = %e, text = %utterance.text, "Failed to speak alert");
                }
            });
        }

        status_tx.send_replace(Some(evaluation));
    }

    speeches.shutdown().await;
}
