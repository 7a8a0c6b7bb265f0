use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("Mongo error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("Lock expiry of {0} seconds is out of range")]
    InvalidExpiry(u64),
}
