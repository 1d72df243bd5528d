use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{TradeType, TrendDirection};

/// Kind of entry in the command log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    TrendChange,
    StartStop,
    ForceClose,
    RemoteTrade,
    BreakevenClose,
    StatusUpdate,
    BotConfirmation,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::TrendChange => "trend_change",
            CommandType::StartStop => "start_stop",
            CommandType::ForceClose => "force_close",
            CommandType::RemoteTrade => "remote_trade",
            CommandType::BreakevenClose => "breakeven_close",
            CommandType::StatusUpdate => "status_update",
            CommandType::BotConfirmation => "bot_confirmation",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for CommandType {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "trend_change" => Ok(CommandType::TrendChange),
            "start_stop" => Ok(CommandType::StartStop),
            "force_close" => Ok(CommandType::ForceClose),
            "remote_trade" => Ok(CommandType::RemoteTrade),
            "breakeven_close" => Ok(CommandType::BreakevenClose),
            "status_update" => Ok(CommandType::StatusUpdate),
            "bot_confirmation" => Ok(CommandType::BotConfirmation),
            _ => Err(format!("Unknown command type: {}", s)),
        }
    }
}

/// Type-specific payload of a logged command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandType", rename_all = "snake_case")]
pub enum CommandKind {
    #[serde(rename_all = "camelCase")]
    TrendChange {
        old_trend: TrendDirection,
        new_trend: TrendDirection,
    },
    #[serde(rename_all = "camelCase")]
    StartStop {
        old_status: bool,
        new_status: bool,
        /// `START` or `STOP`
        command: String,
    },
    #[serde(rename_all = "camelCase")]
    ForceClose { force_close: bool },
    #[serde(rename_all = "camelCase")]
    RemoteTrade {
        trade_id: String,
        trade_type: TradeType,
    },
    BreakevenClose,
    #[serde(rename_all = "camelCase")]
    StatusUpdate {
        trend: TrendDirection,
        active: bool,
        force_close: bool,
    },
    #[serde(rename_all = "camelCase")]
    BotConfirmation {
        original_command: Option<String>,
        confirmation_status: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        trade_id: Option<String>,
    },
}

impl CommandKind {
    pub fn command_type(&self) -> CommandType {
        match self {
            CommandKind::TrendChange { .. } => CommandType::TrendChange,
            CommandKind::StartStop { .. } => CommandType::StartStop,
            CommandKind::ForceClose { .. } => CommandType::ForceClose,
            CommandKind::RemoteTrade { .. } => CommandType::RemoteTrade,
            CommandKind::BreakevenClose => CommandType::BreakevenClose,
            CommandKind::StatusUpdate { .. } => CommandType::StatusUpdate,
            CommandKind::BotConfirmation { .. } => CommandType::BotConfirmation,
        }
    }

    pub fn start_stop(old_status: bool, new_status: bool) -> Self {
        CommandKind::StartStop {
            old_status,
            new_status,
            command: if new_status { "START" } else { "STOP" }.to_string(),
        }
    }
}

/// Immutable entry of the command log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    #[serde(flatten)]
    pub kind: CommandKind,
    /// Assigned by the log on append when left unset
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl CommandRecord {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            timestamp: None,
        }
    }

    pub fn command_type(&self) -> CommandType {
        self.kind.command_type()
    }
}
