use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::ErrorKind;
use mongodb::options::FindOneOptions;
use mongodb::{Collection, Database};
use tracing::{debug, trace};

use super::constant::{MIGRATIONS_COLLECTION, NAMESPACE_EXISTS};
use super::error::DatabaseError;
use super::VersionStore;
use crate::types::record::{LedgerState, VersionRecord};

/// Ledger kept in a MongoDB collection, one document per [`VersionRecord`].
#[derive(Debug, Clone)]
pub struct MongoVersionStore {
    database: Database,
    collection: String,
}

impl MongoVersionStore {
    pub fn new(database: Database) -> Self {
        Self { database, collection: MIGRATIONS_COLLECTION.to_string() }
    }

    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.set_collection_name(name);
        self
    }

    /// Replaces the name of the ledger collection. Defaults to `migrations`.
    pub fn set_collection_name(&mut self, name: impl Into<String>) {
        self.collection = name.into();
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    fn collection(&self) -> Collection<VersionRecord> {
        self.database.collection(&self.collection)
    }

    async fn collection_exists(&self) -> Result<bool, DatabaseError> {
        let names = self.database.list_collection_names(None).await?;
        Ok(names.iter().any(|name| name == &self.collection))
    }
}

/// BSON has no unsigned 64 bit integer, versions are stored as int64.
fn bson_version(version: u64) -> Result<i64, DatabaseError> {
    i64::try_from(version).map_err(|_| DatabaseError::VersionOutOfRange(version))
}

#[async_trait]
impl VersionStore for MongoVersionStore {
    async fn ensure_initialized(&self) -> Result<(), DatabaseError> {
        if self.collection_exists().await? {
            return Ok(());
        }

        match self.database.create_collection(&self.collection, None).await {
            Ok(()) => {
                debug!(collection = %self.collection, "Created migrations collection");
                Ok(())
            }
            // Another process created it between the listing and our create.
            Err(err) if matches!(*err.kind, ErrorKind::Command(ref command) if command.code == NAMESPACE_EXISTS) => {
                trace!(collection = %self.collection, "Migrations collection already created concurrently");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn current_version(&self) -> Result<LedgerState, DatabaseError> {
        self.ensure_initialized().await?;

        // ObjectIds grow with insertion, so the greatest _id is the latest record.
        let options = FindOneOptions::builder().sort(doc! { "_id": -1 }).build();
        let latest = self.collection().find_one(doc! {}, options).await?;

        let state = latest.map(LedgerState::from).unwrap_or_else(LedgerState::baseline);
        trace!(collection = %self.collection, version = state.version, "Read current version");
        Ok(state)
    }

    async fn is_applied(&self, version: u64) -> Result<bool, DatabaseError> {
        self.ensure_initialized().await?;

        let filter = doc! { "version": bson_version(version)? };
        let record = self.collection().find_one(filter, None).await?;
        Ok(record.is_some())
    }

    async fn record_version(&self, version: u64, description: &str) -> Result<(), DatabaseError> {
        bson_version(version)?;

        let record = VersionRecord::new(version, description);
        self.collection().insert_one(&record, None).await?;
        debug!(collection = %self.collection, version, description, "Recorded migration version");
        Ok(())
    }
}
