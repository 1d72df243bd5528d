use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

const LAST_UPDATED_KEY: &str = "lastUpdated";

/// Scalar value reported by the controller for an account metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountValue {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl AccountValue {
    /// Convert a JSON value, dropping anything that is not a scalar
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(AccountValue::Bool(b)),
            Value::Number(n) => Some(AccountValue::Number(n)),
            Value::String(s) => Some(AccountValue::Text(s)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for AccountValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountValue::Bool(b) => write!(f, "{}", b),
            AccountValue::Number(n) => write!(f, "{}", n),
            AccountValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Snapshot of the controller's account metrics (balance, equity, number, ...)
///
/// Each update replaces the whole snapshot; fields are never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(flatten)]
    pub fields: BTreeMap<String, AccountValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl AccountInfo {
    pub fn from_json(payload: Map<String, Value>, now: DateTime<Utc>) -> Self {
        let fields = payload
            .into_iter()
            .filter(|(key, _)| key != LAST_UPDATED_KEY)
            .filter_map(|(key, value)| AccountValue::from_json(value).map(|v| (key, v)))
            .collect();
        Self {
            fields,
            last_updated: Some(now),
        }
    }

    pub fn get(&self, key: &str) -> Option<&AccountValue> {
        self.fields.get(key)
    }

    /// Account number as reported by the controller, if any
    pub fn number(&self) -> Option<String> {
        self.get("number").map(|v| v.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.last_updated.is_none()
    }
}
