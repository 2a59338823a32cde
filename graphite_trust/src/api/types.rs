//! Wire records for the Graphite explorer API
//!
//! Numeric values stay decimal strings end to end: balances are wei amounts
//! that overflow `u64`, and the dashboard only ever formats them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Uniform `{status, message, result}` wrapper around every explorer reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Kept raw: only the JSON string `"1"` means success.
    #[serde(default)]
    pub status: Value,
    #[serde(default, deserialize_with = "string_or_number")]
    pub message: String,
    #[serde(default)]
    pub result: Option<Value>,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        matches!(&self.status, Value::String(status) if status == "1")
    }

    /// Status as it appears in logs and errors; a missing status is empty.
    pub fn status_text(&self) -> String {
        match &self.status {
            Value::String(status) => status.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// KYC, filter and reputation state of a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustScore {
    pub activated: bool,
    pub activation_block_number: Option<String>,
    pub activation_tx_hash: Option<String>,
    pub filter_last_update_block_number: Option<String>,
    pub filter_level: String,
    pub kyc_last_update_block_number: Option<String>,
    pub kyc_level: String,
    pub reputation: String,
}

/// Trust score as the explorer actually sends it: any field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTrustScore {
    #[serde(default)]
    activated: Option<Value>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    activation_block_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    activation_tx_hash: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    filter_last_update_block_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    filter_level: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    kyc_last_update_block_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    kyc_level: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    reputation: Option<String>,
}

impl From<RawTrustScore> for TrustScore {
    fn from(raw: RawTrustScore) -> Self {
        Self {
            // Only a JSON `true` counts; "true", 1 and friends do not.
            activated: matches!(raw.activated, Some(Value::Bool(true))),
            activation_block_number: raw.activation_block_number,
            activation_tx_hash: raw.activation_tx_hash,
            filter_last_update_block_number: raw.filter_last_update_block_number,
            filter_level: non_empty_or_zero(raw.filter_level),
            kyc_last_update_block_number: raw.kyc_last_update_block_number,
            kyc_level: non_empty_or_zero(raw.kyc_level),
            reputation: non_empty_or_zero(raw.reputation),
        }
    }
}

fn non_empty_or_zero(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "0".to_string(),
    }
}

/// Incoming/outgoing split used by every counter family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalCount {
    #[serde(default, deserialize_with = "string_or_number")]
    pub total: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub incoming: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub outgoing: String,
}

/// Aggregate activity counters for one address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCounters {
    #[serde(default, deserialize_with = "string_or_number")]
    pub gas_used: String,
    #[serde(default)]
    pub transaction_count: DirectionalCount,
    #[serde(default)]
    pub internal_transaction_count: DirectionalCount,
    #[serde(default)]
    pub token_transfer_count: DirectionalCount,
    #[serde(default, deserialize_with = "string_or_number")]
    pub produced_block_count: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub balance_changes_count: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    /// Wallet or contract address when the hit resolves to one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceHistoryEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub block_number: String,
    #[serde(deserialize_with = "string_or_number")]
    pub time_stamp: String,
    #[serde(deserialize_with = "string_or_number")]
    pub balance: String,
    /// Signed wei delta, e.g. `-500000000000000000`
    #[serde(deserialize_with = "string_or_number")]
    pub balance_change: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinedBlock {
    #[serde(deserialize_with = "string_or_number")]
    pub block_number: String,
    #[serde(deserialize_with = "string_or_number")]
    pub time_stamp: String,
    #[serde(deserialize_with = "string_or_number")]
    pub block_reward: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAccount {
    pub address: String,
    #[serde(deserialize_with = "string_or_number")]
    pub balance: String,
    #[serde(deserialize_with = "string_or_number")]
    pub percentage: String,
    #[serde(deserialize_with = "string_or_number")]
    pub transaction_count: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Offset/limit pagination shared by the list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageOptions {
    pub offset: u64,
    pub limit: u64,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BalanceHistoryOptions {
    /// Unix seconds; omitted from the request when unset
    pub start_timestamp: Option<i64>,
    pub end_timestamp: Option<i64>,
    pub page: PageOptions,
    pub sort: SortOrder,
}

impl BalanceHistoryOptions {
    pub fn with_page(mut self, offset: u64, limit: u64) -> Self {
        self.page = PageOptions { offset, limit };
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn between(mut self, start: i64, end: i64) -> Self {
        self.start_timestamp = Some(start);
        self.end_timestamp = Some(end);
        self
    }
}

/// Custom deserializer for strings that handles both string and number types
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string_or_number(deserializer)?.unwrap_or_default())
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct StringVisitor;

    impl<'de> Visitor<'de> for StringVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, a number or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringVisitor)
}
