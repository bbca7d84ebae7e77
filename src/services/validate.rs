//! Record acceptance rules
//!
//! Every entry path (form, CSV import, receipt scan) turns its raw input into
//! an [`ExpenseCandidate`] and runs it through [`validate`].

use chrono::NaiveDate;
use rand::Rng;
use std::fmt;

use crate::models::{
    generate_transaction_id, Category, ExpenseCandidate, Money, NewExpense, IMPORT_PAYMENT_TYPE,
};

/// Why a candidate was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingPlace,
    InvalidAmount(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPlace => write!(f, "missing place"),
            Self::InvalidAmount(raw) => write!(f, "invalid amount '{}'", raw),
        }
    }
}

impl std::error::Error for Rejection {}

/// Return the trimmed value if it is present and non-blank
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Check a candidate and fill in defaults
///
/// Only place and amount can reject a candidate. Category, transaction id,
/// date and payment type fall back to defaults. Absent payment types default
/// to "Cash"; callers with a different default set it on the candidate
/// beforehand.
pub fn validate<R: Rng + ?Sized>(
    candidate: ExpenseCandidate,
    today: NaiveDate,
    rng: &mut R,
) -> Result<NewExpense, Rejection> {
    let place = non_blank(candidate.place.as_deref())
        .ok_or(Rejection::MissingPlace)?
        .to_string();

    let raw_amount = candidate.amount.as_deref().unwrap_or("").trim();
    let amount = Money::parse_non_negative(raw_amount)
        .map_err(|_| Rejection::InvalidAmount(raw_amount.to_string()))?;

    let category = Category::normalize(candidate.category.as_deref());

    let transaction_id = match non_blank(candidate.transaction_id.as_deref()) {
        Some(id) => id.to_string(),
        None => generate_transaction_id(rng),
    };

    let date = match non_blank(candidate.date.as_deref()) {
        Some(raw) => parse_date(raw).unwrap_or_else(|| {
            tracing::debug!(date = raw, "unrecognized date, using today");
            today
        }),
        None => today,
    };

    let payment_type = non_blank(candidate.payment_type.as_deref())
        .unwrap_or(IMPORT_PAYMENT_TYPE)
        .to_string();

    Ok(NewExpense {
        date,
        amount,
        place,
        address: candidate.address.map(|a| a.trim().to_string()).unwrap_or_default(),
        category,
        payment_type,
        transaction_id,
        review_later: candidate.review_later,
    })
}

/// Date layouts seen in bank exports and receipt responses
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse a calendar date in one of the known layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}
