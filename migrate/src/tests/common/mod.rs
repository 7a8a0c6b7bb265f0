use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mongodb::{Client, Database};
use rstest::*;

use crate::core::client::database::{DatabaseError, VersionStore};
use crate::types::migration::{Direction, Migration, MigrationAction};
use crate::types::record::{LedgerState, VersionRecord};

/// Connection string for tests that need a live server.
pub fn mongodb_connection_url() -> String {
    std::env::var("MONGODB_CONNECTION_URL").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

/// A handle that never reaches a server unless an operation is awaited on it.
pub async fn offline_database() -> Database {
    let client = Client::with_uri_str("mongodb://localhost:27017").await.expect("valid connection string");
    client.database("mongo_migrate_offline")
}

/// A fresh database on the server at `MONGODB_CONNECTION_URL`, dropped with [`drop_database`].
pub async fn live_database() -> color_eyre::Result<Database> {
    let client = Client::with_uri_str(mongodb_connection_url()).await?;
    Ok(client.database(&format!("mongo_migrate_test_{}", uuid::Uuid::new_v4().simple())))
}

pub async fn drop_database(database: &Database) -> color_eyre::Result<()> {
    database.drop(None).await?;
    Ok(())
}

/// Ledger kept in memory, in insertion order.
#[derive(Default)]
pub struct InMemoryVersionStore {
    records: Mutex<Vec<VersionRecord>>,
}

impl InMemoryVersionStore {
    pub fn with_versions(versions: &[u64]) -> Self {
        let records = versions.iter().map(|version| VersionRecord::new(*version, format!("migration {version}"))).collect();
        Self { records: Mutex::new(records) }
    }

    pub fn records(&self) -> Vec<VersionRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn recorded_versions(&self) -> Vec<u64> {
        self.records().iter().map(|record| record.version).collect()
    }
}

#[async_trait]
impl VersionStore for InMemoryVersionStore {
    async fn ensure_initialized(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn current_version(&self) -> Result<LedgerState, DatabaseError> {
        Ok(self.records.lock().unwrap().last().cloned().map(LedgerState::from).unwrap_or_default())
    }

    async fn is_applied(&self, version: u64) -> Result<bool, DatabaseError> {
        Ok(self.records.lock().unwrap().iter().any(|record| record.version == version))
    }

    async fn record_version(&self, version: u64, description: &str) -> Result<(), DatabaseError> {
        self.records.lock().unwrap().push(VersionRecord::new(version, description));
        Ok(())
    }
}

/// Remembers every action run, in order.
#[derive(Default, Clone)]
pub struct Journal {
    entries: Arc<Mutex<Vec<(Direction, u64)>>>,
}

impl Journal {
    pub fn action(&self, direction: Direction, version: u64) -> impl MigrationAction + 'static {
        let entries = self.entries.clone();
        move |_db: Database| {
            let entries = entries.clone();
            async move {
                entries.lock().unwrap().push((direction, version));
                anyhow::Ok(())
            }
        }
    }

    pub fn entries(&self) -> Vec<(Direction, u64)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn ran(&self, direction: Direction) -> Vec<u64> {
        self.entries().into_iter().filter(|(ran, _)| *ran == direction).map(|(_, version)| version).collect()
    }
}

pub fn failing_action(message: &'static str) -> impl MigrationAction + 'static {
    move |_db: Database| async move { Err::<(), _>(anyhow::anyhow!(message)) }
}

/// A migration with both actions wired to `journal`.
pub fn reversible(journal: &Journal, version: u64) -> Migration {
    Migration::new(version, format!("migration {version}"))
        .with_up(journal.action(Direction::Up, version))
        .with_down(journal.action(Direction::Down, version))
}

pub fn catalog(journal: &Journal, versions: &[u64]) -> Vec<Migration> {
    versions.iter().map(|version| reversible(journal, *version)).collect()
}

#[fixture]
pub fn journal() -> Journal {
    Journal::default()
}
