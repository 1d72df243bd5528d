//! The four relay stores and the protocol operations over them.
//!
//! `RelayCore` is plain synchronous state; callers provide the clock and are
//! responsible for running each operation as one critical section. Operations
//! that need a follow-up after a delay return a [`Deferred`] for the caller to
//! schedule.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::action::{Confirmation, ControllerAction, ControllerCommand};
use super::command_log::CommandLog;
use super::liveness::LivenessRegistry;
use super::signal_registry::SignalRegistry;
use super::snapshot::*;
use super::state_store::StateStore;
use crate::config::TimingConfig;
use crate::domain::{BotIdentity, CommandKind, CommandRecord, CommandType};
use crate::error::{RelayError, Result};

const STATS_TAIL: usize = 10;
const BOT_ID_DISPLAY_LEN: usize = 20;

/// Follow-up action that must run after a fixed delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Write force-close back to false
    ResetForceClose,
    /// Drop the signal if nobody executed it
    ExpireSignal(String),
    /// Deactivate the break-even command if still active
    ExpireBreakEven,
}

#[derive(Debug, Clone)]
pub struct RelayCore {
    pub state: StateStore,
    pub signals: SignalRegistry,
    pub log: CommandLog,
    pub bots: LivenessRegistry,
    retention: Duration,
    bot_idle: Duration,
}

fn chrono_ms(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX / 1_000_000))
}

fn chrono_secs(secs: u64) -> Duration {
    chrono_ms(secs.saturating_mul(1_000))
}

impl RelayCore {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            state: StateStore::new(),
            signals: SignalRegistry::new(chrono_ms(timing.trade_signal_ttl_ms)),
            log: CommandLog::new(timing.command_log_capacity),
            bots: LivenessRegistry::new(),
            retention: chrono_secs(timing.command_retention_secs),
            bot_idle: chrono_secs(timing.bot_idle_secs),
        }
    }

    /// Apply a controller directive, log it, and report the resulting state.
    pub fn submit(
        &mut self,
        command: ControllerCommand,
        now: DateTime<Utc>,
    ) -> Result<(StateSummary, Option<Deferred>)> {
        debug!(action = command.action.name(), "Controller command received");
        let carries_account = command.action.carries_account();
        let (record, deferred) = match command.action {
            ControllerAction::TrendChange { trend } => {
                let trend = trend.ok_or_else(|| {
                    RelayError::InvalidArgument("Invalid trend direction".to_string())
                })?;
                let previous = self
                    .state
                    .apply_trend_change(&trend, now)
                    .map_err(|_| RelayError::InvalidArgument("Invalid trend direction".to_string()))?;
                let current = self.state.snapshot().direction;
                info!("Trend changed: {} -> {}", previous, current);
                (
                    Some(CommandKind::TrendChange {
                        old_trend: previous,
                        new_trend: current,
                    }),
                    None,
                )
            }
            ControllerAction::StartStop { active } => {
                let previous = self.state.apply_start_stop(active, now);
                info!("Trading {}", if active { "started" } else { "stopped" });
                (Some(CommandKind::start_stop(previous, active)), None)
            }
            ControllerAction::ForceClose { close } => {
                self.state.apply_force_close(close, now);
                info!("Force close {}", if close { "activated" } else { "deactivated" });
                let deferred = close.then_some(Deferred::ResetForceClose);
                (Some(CommandKind::ForceClose { force_close: close }), deferred)
            }
            ControllerAction::RemoteTrade { trade_type } => {
                let signal = self.signals.submit(trade_type.as_deref().unwrap_or(""), now)?;
                info!(
                    trade_id = %signal.id,
                    "Remote trade {} issued, expires at {}",
                    signal.trade_type,
                    signal.expires_at
                );
                (
                    Some(CommandKind::RemoteTrade {
                        trade_id: signal.id.clone(),
                        trade_type: signal.trade_type,
                    }),
                    Some(Deferred::ExpireSignal(signal.id)),
                )
            }
            ControllerAction::BreakevenClose => {
                self.state.activate_break_even(now);
                info!("Break-even close activated");
                (Some(CommandKind::BreakevenClose), Some(Deferred::ExpireBreakEven))
            }
            ControllerAction::StatusUpdate(update) => {
                let state = self.state.apply_status_update(&update, now);
                info!(
                    "Status updated: trend={}, active={}, force_close={}",
                    state.direction, state.is_active, state.force_close
                );
                (
                    Some(CommandKind::StatusUpdate {
                        trend: state.direction,
                        active: state.is_active,
                        force_close: state.force_close,
                    }),
                    None,
                )
            }
            ControllerAction::Unknown(name) => {
                debug!("Ignoring unknown controller action {:?}", name);
                (None, None)
            }
        };

        if let Some(kind) = record {
            self.log.append(CommandRecord::new(kind), now);
        }
        if carries_account {
            if let Some(account) = command.account {
                self.state.update_account(account, now);
                info!(
                    "Controller account updated: balance={}, equity={}",
                    self.state.account().get("balance").map(|v| v.to_string()).unwrap_or_default(),
                    self.state.account().get("equity").map(|v| v.to_string()).unwrap_or_default(),
                );
            }
        }

        Ok((self.summary(), deferred))
    }

    /// Run a deferred action. Conditions are re-checked at fire time.
    pub fn fire(&mut self, deferred: &Deferred) -> bool {
        match deferred {
            Deferred::ResetForceClose => {
                self.state.clear_force_close();
                info!("Force close reset automatically");
                true
            }
            Deferred::ExpireSignal(id) => {
                let removed = self.signals.expire(id);
                if removed {
                    info!(trade_id = %id, "Remote trade expired unexecuted");
                }
                removed
            }
            Deferred::ExpireBreakEven => {
                let was_active = self.state.deactivate_break_even();
                if was_active {
                    info!("Break-even close reset automatically");
                }
                was_active
            }
        }
    }

    /// Everything a bot needs; the log is filtered by the optional cursor.
    pub fn sync(&mut self, since: Option<DateTime<Utc>>, now: DateTime<Utc>) -> SyncSnapshot {
        let cursor = self.log.mark_served(now);
        SyncSnapshot {
            current_trend: self.state.snapshot(),
            recent_commands: self.log.since(since),
            remote_trades: self.signals.list_pending(),
            break_even_command: self.state.break_even(),
            controller_account: self.state.account().clone(),
            server_time: cursor.timestamp_millis(),
        }
    }

    /// Apply a bot's execution report and log it.
    pub fn confirm(&mut self, confirmation: Confirmation, now: DateTime<Utc>) {
        let command_type = confirmation
            .command_type
            .as_deref()
            .and_then(|t| CommandType::try_from(t).ok());

        match (command_type, confirmation.trade_id.as_deref()) {
            (Some(CommandType::RemoteTrade), Some(trade_id)) => {
                if self.signals.confirm(trade_id) {
                    info!(trade_id = %trade_id, "Remote trade executed");
                } else {
                    debug!(trade_id = %trade_id, "Confirmation for unknown or executed trade");
                }
            }
            (Some(CommandType::BreakevenClose), _) => {
                self.state.deactivate_break_even();
                info!("Break-even close executed");
            }
            _ => {}
        }

        info!(
            "Bot confirmation: {} -> {} ({})",
            confirmation.command_type.as_deref().unwrap_or("unknown"),
            confirmation.status.as_deref().unwrap_or("unknown"),
            confirmation.message.as_deref().unwrap_or("no message"),
        );

        self.log.append(
            CommandRecord::new(CommandKind::BotConfirmation {
                original_command: confirmation.command_type,
                confirmation_status: confirmation.status,
                message: confirmation.message,
                trade_id: confirmation.trade_id,
            }),
            now,
        );
    }

    pub fn touch(&mut self, identity: &BotIdentity, now: DateTime<Utc>) {
        self.bots.touch(identity, now);
    }

    pub fn sweep_signals(&mut self, now: DateTime<Utc>) -> usize {
        self.signals.sweep(now)
    }

    pub fn sweep_log(&mut self, now: DateTime<Utc>) -> usize {
        self.log.sweep(now - self.retention)
    }

    pub fn evict_idle_bots(&mut self, now: DateTime<Utc>) -> usize {
        self.bots.evict_idle(now, self.bot_idle)
    }

    /// Restore every store to its startup state
    pub fn reset(&mut self) {
        self.state.reset();
        self.signals.clear();
        self.log.clear();
        self.bots.clear();
    }

    pub fn summary(&self) -> StateSummary {
        let trend = self.state.snapshot();
        StateSummary {
            trend: trend.direction,
            active: trend.is_active,
            force_close: trend.force_close,
            break_even_active: self.state.break_even().active,
            pending_trades: self.signals.len(),
            last_update: trend.last_update,
        }
    }

    pub fn quick_status(&self, now: DateTime<Utc>) -> QuickStatus {
        let trend = self.state.snapshot();
        QuickStatus {
            trend: trend.direction,
            active: trend.is_active,
            force_close: trend.force_close,
            break_even_active: self.state.break_even().active,
            pending_trades: self.signals.pending_count(),
            last_update: trend.last_update,
            server_time: now.timestamp_millis(),
        }
    }

    pub fn health(&self, now: DateTime<Utc>) -> HealthSnapshot {
        let trend = self.state.snapshot();
        HealthSnapshot {
            status: "online",
            time: now,
            current_trend: trend.direction,
            is_active: trend.is_active,
            force_close: trend.force_close,
            connected_bots: self.bots.active_count(),
            recent_commands: self.log.len(),
            remote_trades: self.signals.len(),
            break_even_active: self.state.break_even().active,
            controller_account: self
                .state
                .account()
                .number()
                .unwrap_or_else(|| "N/A".to_string()),
        }
    }

    /// Aggregate view; bots idle past the window are left out but not evicted.
    pub fn stats(&self, now: DateTime<Utc>, started_at: DateTime<Utc>) -> RelayStats {
        let trend = self.state.snapshot();
        let bots = self.bots.seen_since(now - self.bot_idle);
        let uptime_ms = (now - started_at).num_milliseconds().max(0);

        RelayStats {
            summary: StatsSummary {
                current_trend: trend.direction,
                is_active: trend.is_active,
                force_close: trend.force_close,
                break_even_active: self.state.break_even().active,
                pending_remote_trades: self.signals.pending_count(),
                last_update: trend.last_update,
                connected_bots: bots.len(),
                recent_commands: self.log.len(),
            },
            command_stats: self.log.counts_by_type(),
            recent_commands: self.log.tail(STATS_TAIL),
            remote_trades: self.signals.all().to_vec(),
            controller_account: self.state.account().clone(),
            connected_bots: bots
                .into_iter()
                .map(|(id, entry)| BotSummary {
                    id: format!(
                        "{}...",
                        id.to_string().chars().take(BOT_ID_DISPLAY_LEN).collect::<String>()
                    ),
                    last_access: entry.last_access,
                    ip: entry.ip,
                })
                .collect(),
            server_uptime: uptime_ms as f64 / 1000.0,
        }
    }

    pub fn debug_dump(&self) -> DebugDump {
        DebugDump {
            current_trend: self.state.snapshot(),
            remote_trades: self.signals.all().to_vec(),
            break_even_command: self.state.break_even(),
            recent_commands: self.log.since(None),
            controller_account: self.state.account().clone(),
            connected_bots: self
                .bots
                .list()
                .into_iter()
                .map(|(id, entry)| (id.to_string(), entry))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}
