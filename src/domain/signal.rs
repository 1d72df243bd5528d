use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Side of a one-shot remote trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for TradeType {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "BUY" => Ok(TradeType::Buy),
            "SELL" => Ok(TradeType::Sell),
            _ => Err("Invalid trade type (BUY/SELL required)".to_string()),
        }
    }
}

/// A time-boxed instruction for bots to open one trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTradeSignal {
    pub id: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub executed: bool,
}

impl RemoteTradeSignal {
    pub fn new(id: String, trade_type: TradeType, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id,
            trade_type,
            created_at: now,
            expires_at: now + ttl,
            executed: false,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Build a signal id of the form `<epoch millis>_<9 base-36 chars>`.
///
/// Ids are unique with overwhelming probability only; the registry rejects
/// duplicates rather than relying on this.
pub fn generate_signal_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}", now.timestamp_millis(), suffix)
}
