use serde::{Deserialize, Serialize};

use crate::cli::MigrateCliArgs;
use crate::core::client::database::constant::MIGRATIONS_COLLECTION;
use crate::core::client::lock::constant::{
    DEFAULT_LOCK_EXPIRY_SECONDS, DEFAULT_LOCK_KEY, MIGRATION_LOCKS_COLLECTION,
};
use crate::error::MigrateError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateParams {
    #[serde(default = "default_migrations_collection")]
    pub migrations_collection: String,

    #[serde(default)]
    pub log_steps: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockParams>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockParams {
    #[serde(default = "default_lock_collection")]
    pub collection: String,

    #[serde(default = "default_lock_key")]
    pub key: String,

    #[serde(default = "default_lock_expiry_seconds")]
    pub expiry_seconds: u64,
}

fn default_migrations_collection() -> String {
    MIGRATIONS_COLLECTION.to_string()
}

fn default_lock_collection() -> String {
    MIGRATION_LOCKS_COLLECTION.to_string()
}

fn default_lock_key() -> String {
    DEFAULT_LOCK_KEY.to_string()
}

fn default_lock_expiry_seconds() -> u64 {
    DEFAULT_LOCK_EXPIRY_SECONDS
}

impl Default for MigrateParams {
    fn default() -> Self {
        Self { migrations_collection: default_migrations_collection(), log_steps: false, lock: None }
    }
}

impl Default for LockParams {
    fn default() -> Self {
        Self {
            collection: default_lock_collection(),
            key: default_lock_key(),
            expiry_seconds: default_lock_expiry_seconds(),
        }
    }
}

impl MigrateParams {
    /// Rejects values that would make the ledger or the lock unaddressable.
    pub fn validate(&self) -> Result<(), MigrateError> {
        if self.migrations_collection.trim().is_empty() {
            return Err(MigrateError::InvalidConfig("migrations collection name must not be empty".to_string()));
        }
        if let Some(lock) = &self.lock {
            if lock.collection.trim().is_empty() {
                return Err(MigrateError::InvalidConfig("lock collection name must not be empty".to_string()));
            }
            if lock.key.trim().is_empty() {
                return Err(MigrateError::InvalidConfig("lock key must not be empty".to_string()));
            }
            if lock.expiry_seconds == 0 {
                return Err(MigrateError::InvalidConfig("lock expiry must be at least one second".to_string()));
            }
        }
        Ok(())
    }
}

impl TryFrom<MigrateCliArgs> for MigrateParams {
    type Error = MigrateError;

    fn try_from(args: MigrateCliArgs) -> Result<Self, Self::Error> {
        let lock = args.migrate_lock_enabled.then(|| LockParams {
            collection: args.migrate_lock_collection,
            key: args.migrate_lock_key,
            expiry_seconds: args.migrate_lock_expiry_seconds,
        });
        let params = Self { migrations_collection: args.migrations_collection, log_steps: args.migrate_log_steps, lock };
        params.validate()?;
        Ok(params)
    }
}
