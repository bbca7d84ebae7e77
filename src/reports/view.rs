//! Live view over a record store
//!
//! Keeps the latest snapshot, the active filter and the derived rows and
//! statistics. Recomputed on every store notification and filter change.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::aggregate::{apply_filters, Aggregates, ExpenseFilter};
use crate::error::{SpendlogError, SpendlogResult};
use crate::models::ExpenseRecord;
use crate::storage::{RecordStore, Subscription};

#[derive(Default)]
struct ViewState {
    records: Vec<ExpenseRecord>,
    filter: ExpenseFilter,
    rows: Vec<ExpenseRecord>,
    aggregates: Aggregates,
    last_error: Option<String>,
}

impl ViewState {
    fn recompute(&mut self) {
        self.rows = apply_filters(&self.records, &self.filter);
        self.aggregates = Aggregates::compute(&self.rows, &self.records);
    }
}

/// Filtered rows and statistics kept in sync with a store
#[derive(Clone, Default)]
pub struct LiveView {
    state: Arc<RwLock<ViewState>>,
}

impl LiveView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow `store`; the view updates until the subscription is dropped
    pub fn attach(&self, store: &dyn RecordStore) -> SpendlogResult<Subscription> {
        let on_change = Arc::clone(&self.state);
        let on_error = Arc::clone(&self.state);

        store.subscribe(
            Box::new(move |snapshot: &[ExpenseRecord]| {
                let mut state = write(&on_change);
                state.records = snapshot.to_vec();
                state.last_error = None;
                state.recompute();
            }),
            Box::new(move |err: &SpendlogError| {
                write(&on_error).last_error = Some(err.to_string());
            }),
        )
    }

    /// Replace the filter and recompute
    pub fn set_filter(&self, filter: ExpenseFilter) {
        let mut state = write(&self.state);
        state.filter = filter;
        state.recompute();
    }

    pub fn filter(&self) -> ExpenseFilter {
        read(&self.state).filter.clone()
    }

    /// The filtered, sorted rows
    pub fn rows(&self) -> Vec<ExpenseRecord> {
        read(&self.state).rows.clone()
    }

    pub fn aggregates(&self) -> Aggregates {
        read(&self.state).aggregates.clone()
    }

    /// Last store error reported since the previous successful update
    pub fn last_error(&self) -> Option<String> {
        read(&self.state).last_error.clone()
    }
}

fn read(lock: &RwLock<ViewState>) -> RwLockReadGuard<'_, ViewState> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(lock: &RwLock<ViewState>) -> RwLockWriteGuard<'_, ViewState> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Money, NewExpense};
    use crate::storage::ExpenseRepository;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn expense(place: &str, date: &str, cents: i64, category: Category) -> NewExpense {
        NewExpense {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount: Money::from_cents(cents),
            place: place.into(),
            address: String::new(),
            category,
            payment_type: "Cash".into(),
            transaction_id: "TXN-123123".into(),
            review_later: false,
        }
    }

    #[test]
    fn test_view_follows_store() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::open(temp_dir.path().join("expenses.json")).unwrap();
        repo.create(expense("Bistro", "2024-01-15", 1000, Category::Food))
            .unwrap();

        let view = LiveView::new();
        let subscription = view.attach(&repo).unwrap();
        assert_eq!(view.rows().len(), 1);

        repo.create(expense("Shell", "2024-01-20", 500, Category::Gas))
            .unwrap();
        repo.create(expense("Diner", "2024-02-01", 1500, Category::Food))
            .unwrap();
        assert_eq!(view.aggregates().total_spent, Money::from_cents(3000));

        view.set_filter(ExpenseFilter {
            month: Some("2024-01".into()),
            ..Default::default()
        });
        assert_eq!(view.rows().len(), 2);
        assert_eq!(view.aggregates().average_transaction, Money::from_cents(750));
        assert_eq!(view.aggregates().available_months.len(), 2);

        drop(subscription);
        repo.create(expense("Cafe", "2024-01-25", 200, Category::Food))
            .unwrap();
        assert_eq!(view.rows().len(), 2);
    }

    #[test]
    fn test_filter_before_attach() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::open(temp_dir.path().join("expenses.json")).unwrap();
        repo.create(expense("Lowe's", "2024-01-15", 1000, Category::Repair))
            .unwrap();
        repo.create(expense("Target", "2024-01-16", 1000, Category::Other))
            .unwrap();

        let view = LiveView::new();
        view.set_filter(ExpenseFilter {
            search: Some("LOWE".into()),
            ..Default::default()
        });
        let _subscription = view.attach(&repo).unwrap();

        let rows = view.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].place, "Lowe's");
        assert!(view.last_error().is_none());
    }
}
