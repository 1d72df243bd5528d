use serde_json::{Map, Value};

use super::state_store::StatusUpdate;

/// A controller directive, already decoded from its wire form.
///
/// `Unknown` is accepted and deliberately does nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerAction {
    TrendChange { trend: Option<String> },
    StartStop { active: bool },
    ForceClose { close: bool },
    RemoteTrade { trade_type: Option<String> },
    BreakevenClose,
    StatusUpdate(StatusUpdate),
    Unknown(String),
}

impl ControllerAction {
    pub fn name(&self) -> &str {
        match self {
            ControllerAction::TrendChange { .. } => "trend_change",
            ControllerAction::StartStop { .. } => "start_stop",
            ControllerAction::ForceClose { .. } => "force_close",
            ControllerAction::RemoteTrade { .. } => "remote_trade",
            ControllerAction::BreakevenClose => "breakeven_close",
            ControllerAction::StatusUpdate(_) => "status_update",
            ControllerAction::Unknown(name) => name,
        }
    }

    /// Whether an attached account snapshot is applied alongside this action
    pub fn carries_account(&self) -> bool {
        matches!(
            self,
            ControllerAction::TrendChange { .. }
                | ControllerAction::StartStop { .. }
                | ControllerAction::ForceClose { .. }
                | ControllerAction::StatusUpdate(_)
        )
    }
}

/// Controller submission: an action plus an optional account snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerCommand {
    pub action: ControllerAction,
    pub account: Option<Map<String, Value>>,
}

impl ControllerCommand {
    pub fn new(action: ControllerAction) -> Self {
        Self {
            action,
            account: None,
        }
    }

    pub fn with_account(mut self, account: Map<String, Value>) -> Self {
        self.account = Some(account);
        self
    }
}

/// Execution report sent back by a bot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Confirmation {
    pub command_type: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub trade_id: Option<String>,
}
