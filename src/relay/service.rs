//! Relay façade: authorization, locking and deferred timers around [`RelayCore`].

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::action::{Confirmation, ControllerCommand};
use super::auth::{Credentials, Role};
use super::engine::{Deferred, RelayCore};
use super::snapshot::*;
use crate::config::TimingConfig;
use crate::domain::{BotIdentity, TrendState};
use crate::error::Result;

/// Cloneable handle shared by request handlers, timers and the sweeper.
///
/// Every operation holds the core lock exactly once, so each one is a single
/// critical section over all four stores.
#[derive(Clone)]
pub struct RelayService {
    core: Arc<RwLock<RelayCore>>,
    credentials: Arc<Credentials>,
    timing: TimingConfig,
    started_at: DateTime<Utc>,
}

impl RelayService {
    pub fn new(credentials: Credentials, timing: TimingConfig) -> Self {
        Self {
            core: Arc::new(RwLock::new(RelayCore::new(&timing))),
            credentials: Arc::new(credentials),
            timing,
            started_at: Utc::now(),
        }
    }

    /// Credential check for callers that must reject a request before it reaches the core
    pub fn authorize(&self, role: Role, credential: Option<&str>) -> Result<()> {
        self.credentials.authorize(role, credential)
    }

    /// Apply a controller command and return the resulting state.
    pub async fn submit_command(
        &self,
        credential: Option<&str>,
        command: ControllerCommand,
    ) -> Result<StateSummary> {
        self.credentials.authorize(Role::Controller, credential)?;

        let (summary, deferred) = {
            let mut core = self.core.write().await;
            core.submit(command, Utc::now())?
        };

        if let Some(deferred) = deferred {
            self.schedule(deferred);
        }
        Ok(summary)
    }

    /// Bot poll: state, pending signals and log entries newer than `since`.
    pub async fn fetch_sync(
        &self,
        credential: Option<&str>,
        identity: &BotIdentity,
        since: Option<DateTime<Utc>>,
    ) -> Result<SyncSnapshot> {
        self.credentials.authorize(Role::Bot, credential)?;

        let mut core = self.core.write().await;
        let now = Utc::now();
        core.touch(identity, now);
        let snapshot = core.sync(since, now);
        debug!(
            bot = %identity,
            "Sync sent: trend={}, remote_trades={}, break_even={}, commands={}",
            snapshot.current_trend.direction,
            snapshot.remote_trades.len(),
            snapshot.break_even_command.active,
            snapshot.recent_commands.len()
        );
        Ok(snapshot)
    }

    /// Bot execution report.
    pub async fn confirm_execution(
        &self,
        credential: Option<&str>,
        identity: &BotIdentity,
        confirmation: Confirmation,
    ) -> Result<()> {
        self.credentials.authorize(Role::Bot, credential)?;

        let mut core = self.core.write().await;
        let now = Utc::now();
        core.touch(identity, now);
        core.confirm(confirmation, now);
        Ok(())
    }

    /// Wipe every store in one step.
    pub async fn reset(&self, credential: Option<&str>) -> Result<()> {
        self.credentials.authorize(Role::Controller, credential)?;

        self.core.write().await.reset();
        info!("Complete reset performed, all relay state cleared");
        Ok(())
    }

    /// Credential check only; no liveness side effect.
    pub async fn verify_bot(&self, credential: Option<&str>) -> Result<TrendState> {
        self.credentials.authorize(Role::Bot, credential)?;
        Ok(self.core.read().await.state.snapshot())
    }

    pub async fn quick_status(
        &self,
        credential: Option<&str>,
        identity: &BotIdentity,
    ) -> Result<QuickStatus> {
        self.credentials.authorize(Role::Bot, credential)?;

        let mut core = self.core.write().await;
        let now = Utc::now();
        core.touch(identity, now);
        Ok(core.quick_status(now))
    }

    pub async fn health(&self) -> HealthSnapshot {
        self.core.read().await.health(Utc::now())
    }

    pub async fn stats(&self) -> RelayStats {
        self.core.read().await.stats(Utc::now(), self.started_at)
    }

    pub async fn debug_dump(&self) -> DebugDump {
        self.core.read().await.debug_dump()
    }

    pub async fn sweep_signals(&self) -> usize {
        self.core.write().await.sweep_signals(Utc::now())
    }

    pub async fn sweep_log(&self) -> usize {
        self.core.write().await.sweep_log(Utc::now())
    }

    pub async fn evict_idle_bots(&self) -> usize {
        self.core.write().await.evict_idle_bots(Utc::now())
    }

    fn delay_for(&self, deferred: &Deferred) -> Duration {
        match deferred {
            Deferred::ResetForceClose => self.timing.force_close_reset(),
            Deferred::ExpireSignal(_) => self.timing.trade_signal_ttl(),
            Deferred::ExpireBreakEven => self.timing.break_even_timeout(),
        }
    }

    /// Fire `deferred` after its configured delay. Not cancellable.
    fn schedule(&self, deferred: Deferred) {
        let delay = self.delay_for(&deferred);
        let core = Arc::clone(&self.core);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            core.write().await.fire(&deferred);
        });
    }
}
