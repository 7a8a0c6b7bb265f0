pub mod constant;
pub mod error;
mod mongo;

use async_trait::async_trait;
pub use error::DatabaseError;
pub use mongo::MongoVersionStore;

use crate::types::record::LedgerState;

/// Durable bookkeeping of applied migration versions.
///
/// Implementations must not cache ledger state: every call reflects what storage holds at that
/// moment, including records written by other processes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Ensure the ledger exists. Safe to call any number of times.
    async fn ensure_initialized(&self) -> Result<(), DatabaseError>;

    /// State recorded by the most recently inserted record, or the baseline when the ledger is empty.
    async fn current_version(&self) -> Result<LedgerState, DatabaseError>;

    /// Whether any record in the ledger carries `version`.
    async fn is_applied(&self, version: u64) -> Result<bool, DatabaseError>;

    /// Append a record for `version`. Existing records are never touched.
    async fn record_version(&self, version: u64, description: &str) -> Result<(), DatabaseError>;
}
