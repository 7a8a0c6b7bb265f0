use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Mongo error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    /// The ledger stores versions as BSON int64.
    #[error("Version {0} does not fit in the ledger's int64 version field")]
    VersionOutOfRange(u64),
}
