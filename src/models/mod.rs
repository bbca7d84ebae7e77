//! Core data models for spendlog
//!
//! This module contains the data structures of the expense domain: records,
//! categories, money amounts and identifiers.

pub mod category;
pub mod expense;
pub mod ids;
pub mod money;

pub use category::{Category, UnknownCategory};
pub use expense::{
    ExpenseCandidate, ExpenseRecord, ExpenseUpdate, NewExpense, FORM_PAYMENT_TYPES,
    IMPORT_PAYMENT_TYPE, SCAN_PAYMENT_TYPE,
};
pub use ids::{generate_transaction_id, RecordId, TRANSACTION_ID_PREFIX};
pub use money::{Money, MoneyParseError};
