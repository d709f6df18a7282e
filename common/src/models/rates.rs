use crate::models::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rate table as published by the upstream provider.
///
/// Every entry in `rates` is "units of that currency per 1 unit of `base`".
/// The base itself is implicit (1.0) and never appears in `rates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

impl RateTable {
    /// Fill in a missing base with `anchor` and drop any self-entry for the
    /// base, so the table satisfies the implicit-base invariant.
    pub fn normalize(mut self, anchor: &str) -> Self {
        if self.base.trim().is_empty() {
            self.base = anchor.to_string();
        }
        self.rates.remove(&self.base);
        self
    }
}

/// A stored rate table. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub id: RecordId,
    #[serde(rename = "fetchedAt")]
    pub fetched_at: DateTime<Utc>,
    #[serde(flatten)]
    pub table: RateTable,
}

impl RateSnapshot {
    pub fn new(table: RateTable) -> Self {
        Self {
            id: RecordId::generate(),
            fetched_at: Utc::now(),
            table,
        }
    }
}

/// Result of converting one unit of `from` into `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub from: String,
    pub from_value: f64,
    pub to: String,
    pub to_value: f64,
    pub rate: f64,
}
