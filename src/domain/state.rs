use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade bias sanctioned by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrendDirection {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
    /// Both directions allowed (legacy wire value `ENTRAMBI`)
    #[serde(rename = "BOTH", alias = "ENTRAMBI")]
    Both,
    #[default]
    #[serde(rename = "NONE")]
    None,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Buy => "BUY",
            TrendDirection::Sell => "SELL",
            TrendDirection::Both => "BOTH",
            TrendDirection::None => "NONE",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for TrendDirection {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "BUY" => Ok(TrendDirection::Buy),
            "SELL" => Ok(TrendDirection::Sell),
            "BOTH" | "ENTRAMBI" => Ok(TrendDirection::Both),
            "NONE" => Ok(TrendDirection::None),
            _ => Err(format!("Invalid trend direction: {}", s)),
        }
    }
}

/// The authoritative trading state pushed by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendState {
    pub direction: TrendDirection,
    pub is_active: bool,
    pub force_close: bool,
    pub last_update: Option<DateTime<Utc>>,
}

/// Pending request for bots to move open trades to break-even
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenCommand {
    pub active: bool,
    pub issued_at: Option<DateTime<Utc>>,
}
