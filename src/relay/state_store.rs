//! Authoritative trend state, break-even command and controller account snapshot.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::{AccountInfo, BreakEvenCommand, TrendDirection, TrendState};
use crate::error::{RelayError, Result};

/// Partial state update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Raw direction; unrecognised values are ignored
    pub direction: Option<String>,
    pub active: Option<bool>,
    pub force_close: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct StateStore {
    trend: TrendState,
    break_even: BreakEvenCommand,
    account: AccountInfo,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the trend direction. Returns the previous direction.
    pub fn apply_trend_change(&mut self, direction: &str, now: DateTime<Utc>) -> Result<TrendDirection> {
        let direction = TrendDirection::try_from(direction).map_err(RelayError::InvalidArgument)?;
        let previous = self.trend.direction;
        self.trend.direction = direction;
        self.stamp(now);
        Ok(previous)
    }

    /// Set the trading on/off flag. Returns the previous value.
    pub fn apply_start_stop(&mut self, active: bool, now: DateTime<Utc>) -> bool {
        let previous = self.trend.is_active;
        self.trend.is_active = active;
        self.stamp(now);
        previous
    }

    /// Set the force-close flag. The caller schedules the write-back to `false`.
    pub fn apply_force_close(&mut self, close: bool, now: DateTime<Utc>) -> bool {
        let previous = self.trend.force_close;
        self.trend.force_close = close;
        self.stamp(now);
        previous
    }

    /// Timer write-back of the force-close flag. Unconditional: last write wins.
    pub fn clear_force_close(&mut self) {
        self.trend.force_close = false;
    }

    /// Apply whichever fields are present and return the resulting state.
    pub fn apply_status_update(&mut self, update: &StatusUpdate, now: DateTime<Utc>) -> TrendState {
        if let Some(direction) = update
            .direction
            .as_deref()
            .and_then(|d| TrendDirection::try_from(d).ok())
        {
            self.trend.direction = direction;
        }
        if let Some(active) = update.active {
            self.trend.is_active = active;
        }
        if let Some(force_close) = update.force_close {
            self.trend.force_close = force_close;
        }
        self.stamp(now);
        self.trend.clone()
    }

    pub fn activate_break_even(&mut self, now: DateTime<Utc>) {
        self.break_even.active = true;
        self.break_even.issued_at = Some(now);
    }

    /// Returns whether the command was active before the call
    pub fn deactivate_break_even(&mut self) -> bool {
        std::mem::replace(&mut self.break_even.active, false)
    }

    /// Replace the account snapshot wholesale
    pub fn update_account(&mut self, payload: Map<String, Value>, now: DateTime<Utc>) {
        self.account = AccountInfo::from_json(payload, now);
    }

    pub fn snapshot(&self) -> TrendState {
        self.trend.clone()
    }

    pub fn break_even(&self) -> BreakEvenCommand {
        self.break_even.clone()
    }

    pub fn account(&self) -> &AccountInfo {
        &self.account
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        let stamped = match self.trend.last_update {
            Some(last) if last > now => last,
            _ => now,
        };
        self.trend.last_update = Some(stamped);
    }
}
