pub mod constant;
pub mod error;
mod mongo;

use async_trait::async_trait;
pub use error::LockError;
pub use mongo::MongoMigrationLock;

/// Result of lock acquisition or release attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockResult {
    Acquired,
    AlreadyHeld(String), // Contains current owner
    Released,
    NotFound,
}

/// Exclusive lock composed around a migration run so that only one migrator touches the ledger
/// at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MigrationLock: Send + Sync {
    /// Take `key` for `owner` unless someone else holds an unexpired lock on it.
    async fn acquire(&self, key: &str, owner: &str, expiry_seconds: u64) -> Result<LockResult, LockError>;

    /// Release `key` if it is held by `owner`.
    async fn release(&self, key: &str, owner: &str) -> Result<LockResult, LockError>;
}
