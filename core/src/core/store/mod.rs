//! Persisted key-value store.
//!
//! Session state and assets live in one flat key space behind [`KvStore`]. Keys
//! are namespaced by prefix (`session/`, `asset/`). Implementations may enforce a
//! byte quota over the sum of stored value lengths.

mod disk;
mod memory;

pub use disk::RedbStore;
pub use memory::MemoryStore;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum StoreError {
        #[error("Database error: {0}")]
        Redb(#[from] redb::DatabaseError),

        #[error("Table error: {0}")]
        TableError(#[from] redb::TableError),

        #[error("Storage error: {0}")]
        StorageError(#[from] redb::StorageError),

        #[error("Transaction error: {0}")]
        TransactionError(#[from] redb::TransactionError),

        #[error("Commit error: {0}")]
        CommitError(#[from] redb::CommitError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Quota exceeded: {requested} bytes requested, {quota} bytes allowed")]
        QuotaExceeded { requested: u64, quota: u64 },

        #[error("Store lock poisoned")]
        Poisoned,
    }
}

use error::StoreError;

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Inserts or overwrites. Fails with `QuotaExceeded` without writing if the
    /// store would grow past its quota.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Returns `true` if the key was present.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns matching keys in ascending order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

fn check_quota(
    quota: Option<u64>,
    used_by_others: u64,
    incoming: usize,
) -> Result<(), StoreError> {
    let Some(quota) = quota else {
        return Ok(());
    };

    let requested = used_by_others + incoming as u64;
    if requested > quota {
        return Err(StoreError::QuotaExceeded { requested, quota });
    }
    Ok(())
}
