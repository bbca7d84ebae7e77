//! Expense record model
//!
//! Three shapes of the same data flow through the pipeline:
//!
//! - [`ExpenseCandidate`]: raw, untrusted input from a form, a CSV row or a
//!   recognition-service item. Every field is optional text.
//! - [`NewExpense`]: a candidate that passed validation, not yet persisted.
//! - [`ExpenseRecord`]: a persisted expense carrying its store-assigned id
//!   and creation timestamp.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;
use super::ids::RecordId;
use super::money::Money;

/// Payment methods offered by the manual entry form
pub const FORM_PAYMENT_TYPES: [&str; 4] = ["Credit Card", "Debit Card", "Cash", "Transfer"];

/// Default payment type for CSV rows
pub const IMPORT_PAYMENT_TYPE: &str = "Cash";

/// Default payment type for scanned receipts
pub const SCAN_PAYMENT_TYPE: &str = "Credit Card";

/// Unvalidated expense input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseCandidate {
    pub date: Option<String>,
    pub transaction_id: Option<String>,
    pub place: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub payment_type: Option<String>,
    pub amount: Option<String>,
    pub review_later: bool,
}

/// A validated expense that has not been written to the store yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: Money,
    pub place: String,
    #[serde(default)]
    pub address: String,
    pub category: Category,
    pub payment_type: String,
    pub transaction_id: String,
    #[serde(default)]
    pub review_later: bool,
}

/// A persisted expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    /// Store-assigned identifier
    pub id: RecordId,

    /// Calendar date of the purchase
    pub date: NaiveDate,

    /// Amount spent (never negative)
    pub amount: Money,

    /// Merchant or description
    pub place: String,

    /// Merchant address, may be empty
    #[serde(default)]
    pub address: String,

    pub category: Category,

    /// Free-text payment label, e.g. "Credit Card"
    pub payment_type: String,

    /// Human-facing reference, e.g. "TXN-123456"
    pub transaction_id: String,

    /// Flagged for a later look
    #[serde(default)]
    pub review_later: bool,

    /// Set once by the store on creation
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Attach store-assigned identity to a validated expense
    pub fn from_new(id: RecordId, expense: NewExpense, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            date: expense.date,
            amount: expense.amount,
            place: expense.place,
            address: expense.address,
            category: expense.category,
            payment_type: expense.payment_type,
            transaction_id: expense.transaction_id,
            review_later: expense.review_later,
            created_at,
        }
    }

    /// Overwrite every field except `id` and `created_at`
    pub fn apply(&mut self, expense: NewExpense) {
        self.date = expense.date;
        self.amount = expense.amount;
        self.place = expense.place;
        self.address = expense.address;
        self.category = expense.category;
        self.payment_type = expense.payment_type;
        self.transaction_id = expense.transaction_id;
        self.review_later = expense.review_later;
    }

    /// The editable part of the record
    pub fn to_new(&self) -> NewExpense {
        NewExpense {
            date: self.date,
            amount: self.amount,
            place: self.place.clone(),
            address: self.address.clone(),
            category: self.category,
            payment_type: self.payment_type.clone(),
            transaction_id: self.transaction_id.clone(),
            review_later: self.review_later,
        }
    }

    /// `YYYY-MM` key of the record's date
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

impl fmt::Display for ExpenseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.date.format("%Y-%m-%d"),
            self.place,
            self.amount,
            self.category
        )
    }
}

/// Partial update of a persisted record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseUpdate {
    /// Replace every editable field
    Replace(NewExpense),
    /// Set only the review flag
    ReviewLater(bool),
}

impl ExpenseUpdate {
    /// Apply this update to a record in place
    pub fn apply_to(self, record: &mut ExpenseRecord) {
        match self {
            Self::Replace(expense) => record.apply(expense),
            Self::ReviewLater(flag) => record.review_later = flag,
        }
    }
}
