use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// A single ledger entry: the database reached `version` at `timestamp`.
///
/// Records are only ever inserted. The latest inserted record (by `_id`) defines the current
/// version of the database, regardless of whether a higher version was recorded earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl VersionRecord {
    /// Builds a record stamped with the current UTC time, truncated to what BSON can hold.
    pub fn new(version: u64, description: impl Into<String>) -> Self {
        Self { version, description: description.into(), timestamp: Utc::now().trunc_subsecs(3) }
    }
}

/// The state the ledger currently reflects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub version: u64,
    pub description: String,
}

impl LedgerState {
    pub fn new(version: u64, description: impl Into<String>) -> Self {
        Self { version, description: description.into() }
    }

    /// State of a database that has never been migrated: version 0, no description.
    pub fn baseline() -> Self {
        Self::default()
    }
}

impl From<VersionRecord> for LedgerState {
    fn from(record: VersionRecord) -> Self {
        Self { version: record.version, description: record.description }
    }
}
