use std::future::Future;
use std::sync::Arc;

use mongodb::Database;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::core::client::database::{MongoVersionStore, VersionStore};
use crate::core::client::lock::{LockResult, MigrationLock, MongoMigrationLock};
use crate::error::{MigrateError, MigrateResult};
use crate::types::logger::{step_line, MigrationLogger, TracingLogger};
use crate::types::migration::{Direction, Migration};
use crate::types::params::{LockParams, MigrateParams};
use crate::types::record::LedgerState;

/// Pass to [`Migrator::up`] or [`Migrator::down`] to run every available migration.
pub const ALL_AVAILABLE: i64 = -1;

/// Number of steps a run may perform: `n` when `0 < n <= available`, otherwise all of them.
pub fn effective_count(n: i64, available: usize) -> usize {
    match usize::try_from(n) {
        Ok(n) if n > 0 && n <= available => n,
        _ => available,
    }
}

/// State the ledger must reflect after reverting `sorted[index]`: the entry right before it, or
/// the baseline when it is the first one.
///
/// `sorted` must be ordered by version and `index` must be in bounds.
pub fn predecessor_of(sorted: &[Migration], index: usize) -> LedgerState {
    match index.checked_sub(1).and_then(|previous| sorted.get(previous)) {
        Some(previous) => LedgerState::new(previous.version, previous.description.clone()),
        None => LedgerState::baseline(),
    }
}

struct LockSettings {
    lock: Arc<dyn MigrationLock>,
    key: String,
    owner: String,
    expiry_seconds: u64,
}

/// Applies and reverts a catalog of migrations, recording each step in a ledger.
///
/// Runs are sequential and there is no mutual exclusion between migrators unless a lock is
/// configured with [`Migrator::set_lock`].
pub struct Migrator<S = MongoVersionStore> {
    database: Database,
    migrations: Vec<Migration>,
    store: S,
    logger: Option<Arc<dyn MigrationLogger>>,
    lock: Option<LockSettings>,
}

impl Migrator<MongoVersionStore> {
    pub fn new(database: Database, migrations: impl IntoIterator<Item = Migration>) -> Self {
        let store = MongoVersionStore::new(database.clone());
        Self::with_store(database, store, migrations)
    }

    /// Builds a migrator from validated parameters.
    pub fn from_params(
        database: Database,
        params: &MigrateParams,
        migrations: impl IntoIterator<Item = Migration>,
    ) -> MigrateResult<Self> {
        params.validate()?;

        let mut migrator = Self::new(database.clone(), migrations);
        migrator.set_migrations_collection(params.migrations_collection.clone());
        if params.log_steps {
            migrator.set_logger(Arc::new(TracingLogger));
        }
        if let Some(lock_params) = &params.lock {
            let lock = MongoMigrationLock::new(database).with_collection_name(lock_params.collection.clone());
            migrator.set_lock(Arc::new(lock), lock_params.clone());
        }
        Ok(migrator)
    }

    /// Replaces the name of the ledger collection. Defaults to `migrations`.
    pub fn set_migrations_collection(&mut self, name: impl Into<String>) {
        self.store.set_collection_name(name);
    }
}

impl<S: VersionStore> Migrator<S> {
    pub fn with_store(database: Database, store: S, migrations: impl IntoIterator<Item = Migration>) -> Self {
        let mut migrations: Vec<Migration> = migrations.into_iter().collect();
        migrations.sort_by_key(|migration| migration.version);
        Self { database, migrations, store, logger: None, lock: None }
    }

    pub fn set_logger(&mut self, logger: Arc<dyn MigrationLogger>) {
        self.logger = Some(logger);
    }

    /// Take `lock` around every [`up`](Self::up) and [`down`](Self::down) run.
    pub fn set_lock(&mut self, lock: Arc<dyn MigrationLock>, params: LockParams) {
        self.lock = Some(LockSettings {
            lock,
            key: params.key,
            owner: Uuid::new_v4().to_string(),
            expiry_seconds: params.expiry_seconds,
        });
    }

    /// The catalog, sorted by version.
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current database version and its description. An empty ledger is version 0.
    pub async fn current_version(&self) -> MigrateResult<LedgerState> {
        Ok(self.store.current_version().await?)
    }

    /// Whether `version` was ever recorded. Lookup failures count as not applied.
    pub async fn is_applied(&self, version: u64) -> bool {
        match self.store.is_applied(version).await {
            Ok(applied) => applied,
            Err(err) => {
                warn!(version, error = %err, "Failed to check migration version, treating it as not applied");
                false
            }
        }
    }

    /// Forces the ledger to `version` without running any migration.
    pub async fn set_version(&self, version: u64, description: &str) -> MigrateResult<()> {
        Ok(self.store.record_version(version, description).await?)
    }

    /// Applies up to `n` pending migrations in ascending version order. `n <= 0` applies all of them.
    ///
    /// A migration is pending when the ledger has no record of it, or when its version is above
    /// the current one because it was reverted. Stops at the first failure; steps completed
    /// before it remain recorded.
    #[instrument(skip(self), fields(migrations = self.migrations.len()))]
    pub async fn up(&self, n: i64) -> MigrateResult<()> {
        self.locked(|| self.run_up(n)).await
    }

    /// Reverts up to `n` applied migrations in descending version order. `n <= 0` reverts all of them.
    ///
    /// After reverting a migration the ledger points at the catalog entry before it.
    #[instrument(skip(self), fields(migrations = self.migrations.len()))]
    pub async fn down(&self, n: i64) -> MigrateResult<()> {
        self.locked(|| self.run_down(n)).await
    }

    async fn run_up(&self, n: i64) -> MigrateResult<()> {
        let current = self.store.current_version().await?;
        let limit = effective_count(n, self.migrations.len());
        let mut performed = 0;

        for migration in &self.migrations {
            if performed >= limit {
                break;
            }
            let Some(action) = migration.action(Direction::Up) else {
                continue;
            };
            // Versions above the current one were reverted since they were recorded.
            if self.store.is_applied(migration.version).await? && migration.version <= current.version {
                continue;
            }

            performed += 1;
            action.run(&self.database).await.map_err(|source| MigrateError::ActionFailed {
                version: migration.version,
                direction: Direction::Up,
                source,
            })?;
            self.log_step(Direction::Up, migration);
            self.store.record_version(migration.version, &migration.description).await?;
        }

        debug!(performed, from_version = current.version, "Finished migrating up");
        Ok(())
    }

    async fn run_down(&self, n: i64) -> MigrateResult<()> {
        let current = self.store.current_version().await?;
        let limit = effective_count(n, self.migrations.len());
        let mut performed = 0;

        for (index, migration) in self.migrations.iter().enumerate().rev() {
            if performed >= limit {
                break;
            }
            if migration.version > current.version {
                continue;
            }
            let Some(action) = migration.action(Direction::Down) else {
                continue;
            };

            performed += 1;
            action.run(&self.database).await.map_err(|source| MigrateError::ActionFailed {
                version: migration.version,
                direction: Direction::Down,
                source,
            })?;
            self.log_step(Direction::Down, migration);

            let previous = predecessor_of(&self.migrations, index);
            self.store.record_version(previous.version, &previous.description).await?;
        }

        debug!(performed, from_version = current.version, "Finished migrating down");
        Ok(())
    }

    fn log_step(&self, direction: Direction, migration: &Migration) {
        debug!(%direction, version = migration.version, description = %migration.description, "Migration step done");
        if let Some(logger) = &self.logger {
            logger.log(&step_line(direction, migration.version, &migration.description));
        }
    }

    /// Runs `op` while holding the configured lock, if any. The lock is released whatever `op`
    /// returns; an error from `op` wins over an error from the release.
    async fn locked<F, Fut>(&self, op: F) -> MigrateResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = MigrateResult<()>>,
    {
        let Some(settings) = &self.lock else {
            return op().await;
        };

        match settings.lock.acquire(&settings.key, &settings.owner, settings.expiry_seconds).await? {
            LockResult::Acquired => {}
            LockResult::AlreadyHeld(owner) => {
                return Err(MigrateError::LockUnavailable { key: settings.key.clone(), owner });
            }
            other => {
                warn!(key = %settings.key, result = ?other, "Unexpected lock acquisition result");
                return Err(MigrateError::LockUnavailable { key: settings.key.clone(), owner: String::new() });
            }
        }

        let outcome = op().await;
        let released = settings.lock.release(&settings.key, &settings.owner).await;

        match (outcome, released) {
            (Err(err), Err(release_err)) => {
                warn!(key = %settings.key, error = %release_err, "Failed to release migration lock");
                Err(err)
            }
            (Err(err), Ok(_)) => Err(err),
            (Ok(()), Err(release_err)) => Err(release_err.into()),
            (Ok(()), Ok(LockResult::Released)) => Ok(()),
            (Ok(()), Ok(other)) => {
                warn!(key = %settings.key, result = ?other, "Migration lock was not held at release");
                Ok(())
            }
        }
    }
}
