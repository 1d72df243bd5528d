use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const UNKNOWN: &str = "unknown";

/// Identity of a polling bot: peer address plus declared user agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BotIdentity {
    pub address: String,
    pub agent: String,
}

impl BotIdentity {
    pub fn new(address: Option<&str>, agent: Option<&str>) -> Self {
        Self {
            address: address.unwrap_or(UNKNOWN).to_string(),
            agent: agent.unwrap_or(UNKNOWN).to_string(),
        }
    }
}

impl fmt::Display for BotIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.address, self.agent)
    }
}

/// Last-seen record of a bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotLivenessEntry {
    pub last_access: DateTime<Utc>,
    pub ip: String,
    pub user_agent: String,
}
