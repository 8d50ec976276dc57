//! Reaper - periodic eviction of idle keyed sessions.
//!
//! Eviction is deliberately lossy: queued commands and unclaimed results
//! are discarded without notifying anyone. The default session is never
//! considered. Tests call [`Broker::sweep_idle`] directly for a
//! deterministic pass instead of waiting on the real clock.

use crate::broker::Broker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle to the background reaper task.
pub struct Reaper {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Reaper {
    /// Spawn the reaper loop, sweeping every `interval` with the given
    /// idle threshold. Returns a handle used to stop it.
    pub fn start(broker: Arc<Broker>, interval: Duration, idle_threshold: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; nothing can be idle yet.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let evicted = broker.sweep_idle(idle_threshold);
                        if evicted > 0 {
                            log::info!("reaper: evicted {} idle session(s)", evicted);
                        }
                    }
                }
            }
            log::debug!("reaper: stopped");
        });

        Self {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Check if the reaper is still running.
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Stop the background loop and wait for it to finish.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}
