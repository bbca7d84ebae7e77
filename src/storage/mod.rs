//! Storage layer for spendlog
//!
//! Defines the record store and key-value seams used by the services, and
//! provides JSON file implementations with atomic writes.

pub mod expenses;
pub mod file_io;
pub mod kv;
pub mod listeners;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use kv::{JsonKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use listeners::{ChangeListener, ErrorListener, Listeners, Subscription};

use crate::config::paths::SpendlogPaths;
use crate::error::SpendlogResult;
use crate::models::{ExpenseRecord, ExpenseUpdate, NewExpense, RecordId};

/// A per-user collection of expense documents
pub trait RecordStore {
    /// Persist a new record and return its assigned id
    fn create(&self, expense: NewExpense) -> SpendlogResult<RecordId>;

    /// Apply a partial update to an existing record
    fn update(&self, id: RecordId, update: ExpenseUpdate) -> SpendlogResult<()>;

    /// Remove a record; `false` if it did not exist
    fn delete(&self, id: RecordId) -> SpendlogResult<bool>;

    /// Fetch a single record
    fn get(&self, id: RecordId) -> SpendlogResult<Option<ExpenseRecord>>;

    /// The full current record set
    fn snapshot(&self) -> SpendlogResult<Vec<ExpenseRecord>>;

    /// Receive the full snapshot now and after every change
    fn subscribe(
        &self,
        on_change: ChangeListener,
        on_error: ErrorListener,
    ) -> SpendlogResult<Subscription>;

    /// Create every queued record, or none of them
    fn commit_batch(&self, batch: WriteBatch) -> SpendlogResult<Vec<RecordId>>;
}

/// Queue of create operations committed together
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    operations: Vec<NewExpense>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a create operation
    pub fn queue(&mut self, expense: NewExpense) {
        self.operations.push(expense);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn into_operations(self) -> Vec<NewExpense> {
        self.operations
    }
}

/// Storage handles for one user profile
pub struct Storage {
    paths: SpendlogPaths,
    pub expenses: ExpenseRepository,
    pub prefs: JsonKeyValueStore,
}

impl Storage {
    /// Open (and create if needed) the storage of `user`
    pub fn open(paths: SpendlogPaths, user: &str) -> SpendlogResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            expenses: ExpenseRepository::open(paths.expenses_file(user))?,
            prefs: JsonKeyValueStore::open(paths.prefs_file())?,
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &SpendlogPaths {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendlogPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, "default").unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(storage.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_users_do_not_share_records() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendlogPaths::with_base_dir(temp_dir.path().to_path_buf());

        let alex = Storage::open(paths.clone(), "alex").unwrap();
        alex.expenses
            .create(NewExpense {
                date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                amount: crate::models::Money::from_cents(500),
                place: "Cafe".into(),
                address: String::new(),
                category: crate::models::Category::Food,
                payment_type: "Cash".into(),
                transaction_id: "TXN-100001".into(),
                review_later: false,
            })
            .unwrap();

        let sam = Storage::open(paths, "sam").unwrap();
        assert_eq!(sam.expenses.count().unwrap(), 0);
    }
}
