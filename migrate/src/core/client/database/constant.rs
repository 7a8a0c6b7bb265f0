/// Default name of the collection holding the migration ledger.
pub const MIGRATIONS_COLLECTION: &str = "migrations";

/// Server error code returned when creating a collection that already exists.
pub(crate) const NAMESPACE_EXISTS: i32 = 48;
