//! Periodic cleanup of expired signals, idle bots and old log entries.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::service::RelayService;
use crate::config::SweepConfig;

pub struct Sweeper {
    relay: RelayService,
    config: SweepConfig,
}

impl Sweeper {
    pub fn new(relay: RelayService, config: SweepConfig) -> Self {
        Self { relay, config }
    }

    /// Run one fast pass: signals and idle bots
    pub async fn sweep_signals_and_bots(&self) -> (usize, usize) {
        let signals = self.relay.sweep_signals().await;
        if signals > 0 {
            info!("Cleanup remote trades: removed {}", signals);
        }
        let bots = self.relay.evict_idle_bots().await;
        if bots > 0 {
            info!("Cleanup idle bots: removed {}", bots);
        }
        (signals, bots)
    }

    /// Run one retention pass over the command log
    pub async fn sweep_log(&self) -> usize {
        let removed = self.relay.sweep_log().await;
        if removed > 0 {
            info!("Cleanup old commands: removed {}", removed);
        }
        removed
    }

    /// Spawn the sweep loops; they exit when `shutdown` fires or its sender is dropped.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let signal_every = Duration::from_secs(self.config.signal_interval_secs.max(1));
        let retention_every = Duration::from_secs(self.config.retention_interval_secs.max(1));

        tokio::spawn(async move {
            let mut signal_tick = tokio::time::interval(signal_every);
            let mut retention_tick = tokio::time::interval(retention_every);
            signal_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            retention_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = signal_tick.tick() => {
                        self.sweep_signals_and_bots().await;
                    }
                    _ = retention_tick.tick() => {
                        self.sweep_log().await;
                    }
                    _ = shutdown.recv() => {
                        debug!("Sweeper stopping");
                        break;
                    }
                }
            }
        })
    }
}
