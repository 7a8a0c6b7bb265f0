//! Versioned, reversible migrations for MongoDB.
//!
//! A [`Migrator`] owns a catalog of [`Migration`]s and a ledger of applied versions kept in a
//! dedicated collection. Every applied or reverted step appends one [`VersionRecord`] to the
//! ledger; the current database version is the version of the latest record.

pub mod cli;
pub mod core;
pub mod error;
pub mod migrator;
pub mod types;

#[cfg(test)]
pub mod tests;

pub use crate::core::client::database::{MongoVersionStore, VersionStore};
pub use crate::core::client::lock::{LockResult, MigrationLock, MongoMigrationLock};
pub use error::{MigrateError, MigrateResult};
pub use migrator::{effective_count, predecessor_of, Migrator, ALL_AVAILABLE};
pub use types::logger::{MigrationLogger, TracingLogger};
pub use types::migration::{Capability, Direction, Migration, MigrationAction};
pub use types::record::{LedgerState, VersionRecord};
