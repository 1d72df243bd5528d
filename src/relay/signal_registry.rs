//! One-shot remote trade signals with a fixed expiry window.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::domain::{generate_signal_id, RemoteTradeSignal, TradeType};
use crate::error::{RelayError, Result};

const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Debug, Clone)]
pub struct SignalRegistry {
    /// Insertion order is preserved for bots
    signals: Vec<RemoteTradeSignal>,
    ttl: Duration,
}

impl SignalRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            signals: Vec::new(),
            ttl,
        }
    }

    /// Validate the trade type and register a fresh signal expiring after the ttl.
    pub fn submit(&mut self, trade_type: &str, now: DateTime<Utc>) -> Result<RemoteTradeSignal> {
        let trade_type = TradeType::try_from(trade_type).map_err(RelayError::InvalidArgument)?;

        for _ in 0..MAX_ID_ATTEMPTS {
            let signal = RemoteTradeSignal::new(generate_signal_id(now), trade_type, now, self.ttl);
            if self.insert(signal.clone()) {
                return Ok(signal);
            }
            warn!("Signal id collision on {}, regenerating", signal.id);
        }

        Err(RelayError::Internal(
            "could not allocate a unique signal id".to_string(),
        ))
    }

    /// Insert a signal unless its id is already registered
    pub fn insert(&mut self, signal: RemoteTradeSignal) -> bool {
        if self.contains(&signal.id) {
            return false;
        }
        self.signals.push(signal);
        true
    }

    /// Mark a signal executed. Unknown or already executed ids are a no-op.
    pub fn confirm(&mut self, id: &str) -> bool {
        match self.signals.iter_mut().find(|s| s.id == id) {
            Some(signal) if !signal.executed => {
                signal.executed = true;
                true
            }
            _ => false,
        }
    }

    /// Deferred expiry check: drop the signal only if it is still unexecuted.
    pub fn expire(&mut self, id: &str) -> bool {
        match self.signals.iter().position(|s| s.id == id) {
            Some(index) if !self.signals[index].executed => {
                self.signals.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Every unexecuted signal, expired or not
    pub fn list_pending(&self) -> Vec<RemoteTradeSignal> {
        self.signals.iter().filter(|s| !s.executed).cloned().collect()
    }

    pub fn all(&self) -> &[RemoteTradeSignal] {
        &self.signals
    }

    pub fn pending_count(&self) -> usize {
        self.signals.iter().filter(|s| !s.executed).count()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.signals.iter().any(|s| s.id == id)
    }

    /// Remove executed signals and unexecuted ones past their expiry.
    /// Returns the number removed.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.signals.len();
        self.signals.retain(|s| !s.executed && !s.is_expired(now));
        before - self.signals.len()
    }

    pub fn clear(&mut self) {
        self.signals.clear();
    }
}
