use super::error::StoreError;
use super::{KvStore, check_quota};
use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// All entries: key → versioned value bytes.
const ENTRIES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

/// [`KvStore`] backed by a single redb file.
pub struct RedbStore {
    db: redb::Database,
    quota: Option<u64>,
}

impl RedbStore {
    /// Creates or opens the database file, creating parent directories as needed.
    pub fn open(path: &Path, quota: Option<u64>) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = redb::Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTRIES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db, quota })
    }
}

impl KvStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;

        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;

        {
            let mut table = write_txn.open_table(ENTRIES_TABLE)?;

            if self.quota.is_some() {
                let mut used_by_others = 0u64;
                for entry in table.iter()? {
                    let (entry_key, entry_value) = entry?;
                    if entry_key.value() != key {
                        used_by_others += entry_value.value().len() as u64;
                    }
                }
                check_quota(self.quota, used_by_others, value.len())?;
            }

            table.insert(key, value)?;
        }

        write_txn.commit()?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;

        let existed = {
            let mut table = write_txn.open_table(ENTRIES_TABLE)?;
            table.remove(key)?.is_some()
        };

        write_txn.commit()?;
        Ok(existed)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;

        let mut keys = Vec::new();
        for entry in table.range(prefix..)? {
            let (key_guard, _) = entry?;
            let key = key_guard.value();
            // Range is sorted, so the first non-matching key ends the prefix run
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }

        Ok(keys)
    }
}
