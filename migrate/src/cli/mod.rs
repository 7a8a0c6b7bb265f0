use clap::Args;

use crate::core::client::database::constant::MIGRATIONS_COLLECTION;
use crate::core::client::lock::constant::{
    DEFAULT_LOCK_EXPIRY_SECONDS, DEFAULT_LOCK_KEY, MIGRATION_LOCKS_COLLECTION,
};

/// Parameters used to configure a migrator.
///
/// Meant to be flattened into the parser of the binary that runs the migrations.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct MigrateCliArgs {
    /// Collection holding the migration ledger.
    #[arg(env = "MONGO_MIGRATE_COLLECTION", long, default_value = MIGRATIONS_COLLECTION)]
    pub migrations_collection: String,

    /// Log one line per applied or reverted migration.
    #[arg(env = "MONGO_MIGRATE_LOG_STEPS", long, default_value_t = false)]
    pub migrate_log_steps: bool,

    /// Take an exclusive lock in the database while migrating.
    #[arg(env = "MONGO_MIGRATE_LOCK_ENABLED", long, default_value_t = false)]
    pub migrate_lock_enabled: bool,

    /// Collection holding migration locks.
    #[arg(env = "MONGO_MIGRATE_LOCK_COLLECTION", long, default_value = MIGRATION_LOCKS_COLLECTION)]
    pub migrate_lock_collection: String,

    /// Key of the lock taken around each run.
    #[arg(env = "MONGO_MIGRATE_LOCK_KEY", long, default_value = DEFAULT_LOCK_KEY)]
    pub migrate_lock_key: String,

    /// Seconds after which an unreleased lock can be taken over.
    #[arg(env = "MONGO_MIGRATE_LOCK_EXPIRY_SECONDS", long, default_value_t = DEFAULT_LOCK_EXPIRY_SECONDS)]
    pub migrate_lock_expiry_seconds: u64,
}
