use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::TrendState;
use crate::relay::{Confirmation, ControllerAction, ControllerCommand, StateSummary, StatusUpdate};

// ============================================================================
// Field Helpers
// ============================================================================

/// Loosely typed boolean: only JSON `true` or the string `"true"` count as set
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
    Other(Value),
}

impl Flag {
    pub fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => s == "true",
            Flag::Other(_) => false,
        }
    }
}

fn flag(value: &Option<Flag>) -> bool {
    value.as_ref().is_some_and(Flag::is_set)
}

/// Free-form scalar kept as text; a number stays `"5"` and so never names a valid enum
fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Distinguishes an explicit `null` from an absent field
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ============================================================================
// Controller Types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandRequest {
    pub controllerkey: Option<String>,
    pub action: Option<Value>,
    pub trend: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub active: Option<Flag>,
    #[serde(default, deserialize_with = "present")]
    pub forceclose: Option<Flag>,
    pub account: Option<Value>,
    #[serde(rename = "tradeType")]
    pub trade_type: Option<Value>,
    /// Accepted for compatibility; not used by the relay
    #[serde(rename = "profitTarget")]
    pub profit_target: Option<Value>,
}

impl CommandRequest {
    pub fn to_command(&self) -> ControllerCommand {
        let name = match &self.action {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let action = match name.as_str() {
            "trend_change" => ControllerAction::TrendChange {
                trend: text(self.trend.clone()),
            },
            "start_stop" => ControllerAction::StartStop {
                active: flag(&self.active),
            },
            "force_close" => ControllerAction::ForceClose {
                close: flag(&self.forceclose),
            },
            "remote_trade" => ControllerAction::RemoteTrade {
                trade_type: text(self.trade_type.clone()),
            },
            "breakeven_close" => ControllerAction::BreakevenClose,
            "status_update" => ControllerAction::StatusUpdate(StatusUpdate {
                direction: text(self.trend.clone()),
                active: self.active.as_ref().map(Flag::is_set),
                force_close: self.forceclose.as_ref().map(Flag::is_set),
            }),
            other => ControllerAction::Unknown(other.to_string()),
        };

        let command = ControllerCommand::new(action);
        match &self.account {
            Some(Value::Object(account)) => command.with_account(account.clone()),
            _ => command,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub status: &'static str,
    pub current_state: StateSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetRequest {
    pub controllerkey: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: &'static str,
}

// ============================================================================
// Bot Types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotQuery {
    pub botkey: Option<String>,
    /// Sync cursor in epoch milliseconds
    pub since: Option<String>,
    /// Legacy name of `since`
    pub lastsync: Option<String>,
}

impl BotQuery {
    /// Parsed cursor; a malformed value counts as absent
    pub fn cursor(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.since
            .as_deref()
            .or(self.lastsync.as_deref())
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(chrono::DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmRequest {
    #[serde(rename = "commandType")]
    pub command_type: Option<Value>,
    pub status: Option<Value>,
    pub message: Option<Value>,
    #[serde(rename = "tradeId")]
    pub trade_id: Option<Value>,
}

impl ConfirmRequest {
    pub fn into_confirmation(self) -> Confirmation {
        Confirmation {
            command_type: text(self.command_type),
            status: text(self.status),
            message: text(self.message),
            trade_id: text(self.trade_id),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyRequest {
    pub botkey: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_trend: Option<TrendState>,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
