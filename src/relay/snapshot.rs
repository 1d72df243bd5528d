//! Read-only views handed out by the relay. Field names follow the wire format
//! the bots already parse.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{
    AccountInfo, BotLivenessEntry, BreakEvenCommand, CommandRecord, CommandType,
    RemoteTradeSignal, TrendDirection, TrendState,
};

/// State returned to the controller after a submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub trend: TrendDirection,
    pub active: bool,
    pub force_close: bool,
    pub break_even_active: bool,
    /// Registry size, executed signals included
    pub pending_trades: usize,
    pub last_update: Option<DateTime<Utc>>,
}

/// Everything a bot needs on one poll
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub current_trend: TrendState,
    pub recent_commands: Vec<CommandRecord>,
    pub remote_trades: Vec<RemoteTradeSignal>,
    pub break_even_command: BreakEvenCommand,
    pub controller_account: AccountInfo,
    /// Epoch milliseconds; bots echo it back as their next `since` cursor
    pub server_time: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickStatus {
    pub trend: TrendDirection,
    pub active: bool,
    pub force_close: bool,
    pub break_even_active: bool,
    /// Unexecuted signals only
    pub pending_trades: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub server_time: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub time: DateTime<Utc>,
    pub current_trend: TrendDirection,
    pub is_active: bool,
    pub force_close: bool,
    pub connected_bots: usize,
    pub recent_commands: usize,
    pub remote_trades: usize,
    pub break_even_active: bool,
    /// Account number, or `N/A` before the controller reported one
    pub controller_account: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub current_trend: TrendDirection,
    pub is_active: bool,
    pub force_close: bool,
    pub break_even_active: bool,
    pub pending_remote_trades: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub connected_bots: usize,
    pub recent_commands: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSummary {
    /// Identity truncated for display
    pub id: String,
    pub last_access: DateTime<Utc>,
    pub ip: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStats {
    pub summary: StatsSummary,
    pub command_stats: BTreeMap<CommandType, usize>,
    pub recent_commands: Vec<CommandRecord>,
    pub remote_trades: Vec<RemoteTradeSignal>,
    pub controller_account: AccountInfo,
    pub connected_bots: Vec<BotSummary>,
    /// Seconds since the relay started
    pub server_uptime: f64,
}

/// Complete dump of every store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugDump {
    pub current_trend: TrendState,
    pub remote_trades: Vec<RemoteTradeSignal>,
    pub break_even_command: BreakEvenCommand,
    pub recent_commands: Vec<CommandRecord>,
    pub controller_account: AccountInfo,
    pub connected_bots: BTreeMap<String, BotLivenessEntry>,
}
