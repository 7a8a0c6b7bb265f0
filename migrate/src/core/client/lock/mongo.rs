use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use mongodb::bson::doc;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::UpdateOptions;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::constant::{DUPLICATE_KEY, MIGRATION_LOCKS_COLLECTION};
use super::error::LockError;
use super::{LockResult, MigrationLock};

/// Lock document, one per key
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LockInfo {
    pub _id: String,
    pub owner: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

/// [`MigrationLock`] backed by a MongoDB collection.
///
/// A key is free when no document exists for it or when its `expires_at` has passed.
#[derive(Debug, Clone)]
pub struct MongoMigrationLock {
    database: Database,
    collection: String,
}

impl MongoMigrationLock {
    pub fn new(database: Database) -> Self {
        Self { database, collection: MIGRATION_LOCKS_COLLECTION.to_string() }
    }

    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection = name.into();
        self
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    fn collection(&self) -> Collection<LockInfo> {
        self.database.collection(&self.collection)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(*err.kind, ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == DUPLICATE_KEY)
}

#[async_trait]
impl MigrationLock for MongoMigrationLock {
    async fn acquire(&self, key: &str, owner: &str, expiry_seconds: u64) -> Result<LockResult, LockError> {
        let now = Utc::now().trunc_subsecs(3);
        let ttl = i64::try_from(expiry_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or(LockError::InvalidExpiry(expiry_seconds))?;
        let expires_at = now + ttl;

        // Matches only an expired lock. When the key is missing the upsert inserts it, when it is
        // held the upsert collides with the existing _id.
        let filter = doc! { "_id": key, "expires_at": { "$lte": now } };
        let update = doc! { "$set": { "owner": owner, "expires_at": expires_at } };
        let options = UpdateOptions::builder().upsert(true).build();

        match self.collection().update_one(filter, update, options).await {
            Ok(_) => {
                debug!(key, owner, expires_at = %expires_at, "Acquired migration lock");
                Ok(LockResult::Acquired)
            }
            Err(err) if is_duplicate_key(&err) => {
                let holder = self.collection().find_one(doc! { "_id": key }, None).await?;
                match holder {
                    Some(lock) => {
                        warn!(key, owner, holder = %lock.owner, "Migration lock already held");
                        Ok(LockResult::AlreadyHeld(lock.owner))
                    }
                    // Released between the upsert and the lookup.
                    None => Ok(LockResult::AlreadyHeld(String::new())),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn release(&self, key: &str, owner: &str) -> Result<LockResult, LockError> {
        let result = self.collection().delete_one(doc! { "_id": key, "owner": owner }, None).await?;
        if result.deleted_count == 0 {
            debug!(key, owner, "No migration lock to release");
            return Ok(LockResult::NotFound);
        }
        debug!(key, owner, "Released migration lock");
        Ok(LockResult::Released)
    }
}
