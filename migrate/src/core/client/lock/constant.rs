/// Default collection holding migration locks.
pub const MIGRATION_LOCKS_COLLECTION: &str = "migration_locks";

/// Default key of the lock taken around a migration run.
pub const DEFAULT_LOCK_KEY: &str = "migrations";

/// A crashed migrator's lock can be taken over after ten minutes.
pub const DEFAULT_LOCK_EXPIRY_SECONDS: u64 = 10 * 60;

/// Server error code for a unique index violation.
pub(crate) const DUPLICATE_KEY: i32 = 11000;
