//! Expense repository for JSON storage
//!
//! Manages one user's expense collection in `expenses.json`. Every write is
//! persisted before it is acknowledged, and a write batch lands in a single
//! atomic file replacement.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::Utc;

use crate::error::{SpendlogError, SpendlogResult};
use crate::models::{ExpenseRecord, ExpenseUpdate, NewExpense, RecordId};

use super::file_io::{read_json, write_json_atomic};
use super::listeners::{ChangeListener, ErrorListener, Listeners, Subscription};
use super::{RecordStore, WriteBatch};

/// Serializable expense data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<ExpenseRecord>,
}

/// File-backed record store for a single user
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<RecordId, ExpenseRecord>>,
    listeners: Listeners,
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            listeners: Listeners::new(),
        }
    }

    /// Create a repository and load it from disk
    pub fn open(path: PathBuf) -> SpendlogResult<Self> {
        let repo = Self::new(path);
        repo.load()?;
        Ok(repo)
    }

    /// Load expenses from disk
    pub fn load(&self) -> SpendlogResult<()> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            SpendlogError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for record in file_data.expenses {
            data.insert(record.id, record);
        }

        tracing::debug!(path = %self.path.display(), count = data.len(), "loaded expenses");
        Ok(())
    }

    /// Count expenses
    pub fn count(&self) -> SpendlogResult<usize> {
        let data = self.data.read().map_err(|e| {
            SpendlogError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }

    /// Apply a change to a copy of the collection, persist it, then swap it in
    ///
    /// Nothing changes in memory unless the file write succeeded.
    fn mutate<T, F>(&self, change: F) -> SpendlogResult<T>
    where
        F: FnOnce(&mut HashMap<RecordId, ExpenseRecord>) -> SpendlogResult<T>,
    {
        let result = {
            let mut data = self.data.write().map_err(|e| {
                SpendlogError::Storage(format!("Failed to acquire write lock: {}", e))
            })?;

            let mut next = data.clone();
            let value = change(&mut next)?;

            if let Err(e) = write_json_atomic(&self.path, &ExpenseData {
                expenses: sorted(next.values().cloned().collect()),
            }) {
                self.listeners.notify_error(&e);
                return Err(e);
            }

            *data = next;
            value
        };

        let snapshot = self.snapshot()?;
        self.listeners.notify(&snapshot);
        Ok(result)
    }
}

/// Newest first, ties broken by creation time
fn sorted(mut records: Vec<ExpenseRecord>) -> Vec<ExpenseRecord> {
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
    records
}

impl RecordStore for ExpenseRepository {
    fn create(&self, expense: NewExpense) -> SpendlogResult<RecordId> {
        self.mutate(|data| {
            let id = RecordId::new();
            data.insert(id, ExpenseRecord::from_new(id, expense, Utc::now()));
            Ok(id)
        })
    }

    fn update(&self, id: RecordId, update: ExpenseUpdate) -> SpendlogResult<()> {
        self.mutate(|data| {
            let record = data
                .get_mut(&id)
                .ok_or_else(|| SpendlogError::expense_not_found(id.to_string()))?;
            update.apply_to(record);
            Ok(())
        })
    }

    fn delete(&self, id: RecordId) -> SpendlogResult<bool> {
        if self.get(id)?.is_none() {
            return Ok(false);
        }
        self.mutate(|data| Ok(data.remove(&id).is_some()))
    }

    fn get(&self, id: RecordId) -> SpendlogResult<Option<ExpenseRecord>> {
        let data = self.data.read().map_err(|e| {
            SpendlogError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    fn snapshot(&self) -> SpendlogResult<Vec<ExpenseRecord>> {
        let data = self.data.read().map_err(|e| {
            SpendlogError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(sorted(data.values().cloned().collect()))
    }

    fn subscribe(
        &self,
        on_change: ChangeListener,
        on_error: ErrorListener,
    ) -> SpendlogResult<Subscription> {
        let initial = self.snapshot()?;
        on_change(&initial);
        Ok(self.listeners.add(on_change, on_error))
    }

    fn commit_batch(&self, batch: WriteBatch) -> SpendlogResult<Vec<RecordId>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        self.mutate(|data| {
            let created_at = Utc::now();
            let ids: Vec<RecordId> = batch
                .into_operations()
                .into_iter()
                .map(|expense| {
                    let id = RecordId::new();
                    data.insert(id, ExpenseRecord::from_new(id, expense, created_at));
                    id
                })
                .collect();
            Ok(ids)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Money};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("expenses.json");
        let repo = ExpenseRepository::open(path).unwrap();
        (temp_dir, repo)
    }

    fn expense(place: &str, day: u32, cents: i64) -> NewExpense {
        NewExpense {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            amount: Money::from_cents(cents),
            place: place.into(),
            address: String::new(),
            category: Category::Food,
            payment_type: "Cash".into(),
            transaction_id: format!("TXN-1000{:02}", day),
            review_later: false,
        }
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_create_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        let id = repo.create(expense("Cafe", 15, 1000)).unwrap();

        let record = repo.get(id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.place, "Cafe");
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let id = repo.create(expense("Cafe", 15, 1000)).unwrap();

        let repo2 = ExpenseRepository::open(temp_dir.path().join("expenses.json")).unwrap();
        assert_eq!(repo2.count().unwrap(), 1);
        assert_eq!(repo2.get(id).unwrap().unwrap().amount.cents(), 1000);
    }

    #[test]
    fn test_update_keeps_created_at() {
        let (_temp_dir, repo) = create_test_repo();
        let id = repo.create(expense("Cafe", 15, 1000)).unwrap();
        let created_at = repo.get(id).unwrap().unwrap().created_at;

        repo.update(id, ExpenseUpdate::Replace(expense("Diner", 16, 2000)))
            .unwrap();

        let record = repo.get(id).unwrap().unwrap();
        assert_eq!(record.place, "Diner");
        assert_eq!(record.created_at, created_at);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let (_temp_dir, repo) = create_test_repo();
        let err = repo
            .update(RecordId::new(), ExpenseUpdate::ReviewLater(true))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let id = repo.create(expense("Cafe", 15, 1000)).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_commit_batch_assigns_ids() {
        let (_temp_dir, repo) = create_test_repo();
        let mut batch = WriteBatch::new();
        batch.queue(expense("A", 1, 100));
        batch.queue(expense("B", 2, 200));

        let ids = repo.commit_batch(batch).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_snapshot_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        repo.create(expense("Old", 1, 100)).unwrap();
        repo.create(expense("New", 20, 100)).unwrap();

        let snapshot = repo.snapshot().unwrap();
        assert_eq!(snapshot[0].place, "New");
        assert_eq!(snapshot[1].place, "Old");
    }

    #[test]
    fn test_subscribe_receives_initial_and_changes() {
        let (_temp_dir, repo) = create_test_repo();
        repo.create(expense("Cafe", 15, 1000)).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let last_len = Arc::new(AtomicUsize::new(0));
        let (s, l) = (Arc::clone(&seen), Arc::clone(&last_len));
        let sub = repo
            .subscribe(
                Box::new(move |records: &[ExpenseRecord]| {
                    s.fetch_add(1, Ordering::SeqCst);
                    l.store(records.len(), Ordering::SeqCst);
                }),
                Box::new(|_: &SpendlogError| {}),
            )
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(last_len.load(Ordering::SeqCst), 1);

        repo.create(expense("Diner", 16, 500)).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(last_len.load(Ordering::SeqCst), 2);

        drop(sub);
        repo.create(expense("Bar", 17, 500)).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
