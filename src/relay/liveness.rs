//! Last-seen registry of polling bots.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::domain::{BotIdentity, BotLivenessEntry};

#[derive(Debug, Clone, Default)]
pub struct LivenessRegistry {
    bots: HashMap<BotIdentity, BotLivenessEntry>,
}

impl LivenessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an authenticated access
    pub fn touch(&mut self, identity: &BotIdentity, now: DateTime<Utc>) {
        self.bots.insert(
            identity.clone(),
            BotLivenessEntry {
                last_access: now,
                ip: identity.address.clone(),
                user_agent: identity.agent.clone(),
            },
        );
    }

    pub fn active_count(&self) -> usize {
        self.bots.len()
    }

    /// All entries, ordered by identity
    pub fn list(&self) -> Vec<(BotIdentity, BotLivenessEntry)> {
        let mut entries: Vec<_> = self
            .bots
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Entries seen at or after `cutoff`
    pub fn seen_since(&self, cutoff: DateTime<Utc>) -> Vec<(BotIdentity, BotLivenessEntry)> {
        self.list()
            .into_iter()
            .filter(|(_, entry)| entry.last_access >= cutoff)
            .collect()
    }

    pub fn get(&self, identity: &BotIdentity) -> Option<&BotLivenessEntry> {
        self.bots.get(identity)
    }

    /// Drop bots whose last access predates `now - idle`. Returns the number removed.
    pub fn evict_idle(&mut self, now: DateTime<Utc>, idle: Duration) -> usize {
        let cutoff = now - idle;
        let before = self.bots.len();
        self.bots.retain(|_, entry| entry.last_access >= cutoff);
        before - self.bots.len()
    }

    pub fn clear(&mut self) {
        self.bots.clear();
    }
}
