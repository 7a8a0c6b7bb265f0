use thiserror::Error;

use crate::core::client::database::DatabaseError;
use crate::core::client::lock::LockError;
use crate::types::migration::Direction;

/// Result type for migrator operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Error types for the migrator
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Lock error: {0}")]
    LockError(#[from] LockError),

    /// Another migrator holds the lock configured for this one.
    #[error("Migration lock `{key}` is held by {owner}")]
    LockUnavailable { key: String, owner: String },

    /// A caller supplied action returned an error. Steps recorded before it stay recorded.
    #[error("Migration {version} failed while migrating {direction}: {source}")]
    ActionFailed { version: u64, direction: Direction, source: anyhow::Error },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
