//! CSV export
//!
//! Writes a view in the positional layout that the importer reads back.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{SpendlogError, SpendlogResult};
use crate::import::parser::REVIEW_LATER_LABEL;
use crate::models::ExpenseRecord;

/// Header line of every export
pub const EXPORT_HEADER: &str =
    "Date,Transaction ID,Place,Address,Category,Payment Method,Amount,Review Status";

/// Review-status label for unflagged records
pub const VERIFIED_LABEL: &str = "Verified";

/// Render `view` as CSV text; `None` when there is nothing to export
pub fn export_csv(view: &[ExpenseRecord]) -> Option<String> {
    if view.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(view.len() + 1);
    lines.push(EXPORT_HEADER.to_string());
    lines.extend(view.iter().map(export_line));
    Some(lines.join("\n"))
}

fn export_line(record: &ExpenseRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{}",
        record.date.format("%Y-%m-%d"),
        record.transaction_id,
        quote(&record.place),
        quote(&record.address),
        record.category,
        record.payment_type,
        record.amount.to_decimal_string(),
        if record.review_later {
            REVIEW_LATER_LABEL
        } else {
            VERIFIED_LABEL
        }
    )
}

/// Wrap in double quotes, doubling any inner quotes
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write `view` to `writer`; returns `false` without writing when empty
pub fn write_csv<W: Write>(view: &[ExpenseRecord], writer: &mut W) -> SpendlogResult<bool> {
    let Some(text) = export_csv(view) else {
        return Ok(false);
    };
    writer
        .write_all(text.as_bytes())
        .map_err(|e| SpendlogError::Export(e.to_string()))?;
    Ok(true)
}

/// Default export file name for `today`
pub fn default_export_filename(today: NaiveDate) -> PathBuf {
    PathBuf::from(format!("expenses_export_{}.csv", today.format("%Y-%m-%d")))
}

/// Export `view` to a file; no file is created when the view is empty
pub fn export_to_file(view: &[ExpenseRecord], path: &Path) -> SpendlogResult<bool> {
    let Some(text) = export_csv(view) else {
        return Ok(false);
    };
    std::fs::write(path, text).map_err(|e| {
        SpendlogError::Export(format!("Failed to write {}: {}", path.display(), e))
    })?;
    tracing::info!(path = %path.display(), rows = view.len(), "exported csv");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{parse_rows, ParsedRow};
    use crate::models::{Category, Money, NewExpense, RecordId};
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn record(place: &str, address: &str, cents: i64, payment: &str, review: bool) -> ExpenseRecord {
        ExpenseRecord {
            id: RecordId::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: Money::from_cents(cents),
            place: place.into(),
            address: address.into(),
            category: Category::Groceries,
            payment_type: payment.into(),
            transaction_id: "TXN-482913".into(),
            review_later: review,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        }
    }

    fn reimport(text: &str) -> Vec<NewExpense> {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        parse_rows(text, today, StdRng::seed_from_u64(1))
            .filter_map(ParsedRow::into_expense)
            .collect()
    }

    #[test]
    fn test_empty_view_exports_nothing() {
        assert!(export_csv(&[]).is_none());

        let mut buffer = Vec::new();
        assert!(!write_csv(&[], &mut buffer).unwrap());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_export_layout() {
        let text = export_csv(&[record("Market", "5 Oak Ave", 1050, "Debit Card", true)]).unwrap();
        assert_eq!(
            text,
            format!(
                "{}\n2024-01-15,TXN-482913,\"Market\",\"5 Oak Ave\",Groceries,Debit Card,10.50,Review Later",
                EXPORT_HEADER
            )
        );
    }

    #[test]
    fn test_round_trip() {
        let view = vec![
            record("Market", "5 Oak Ave", 1050, "Credit Card", false),
            record("Shell", "", 4000, "Cash", true),
            record("Cinema", "Main St", 1, "Transfer", false),
        ];
        let back = reimport(&export_csv(&view).unwrap());

        let expected: Vec<NewExpense> = view.iter().map(ExpenseRecord::to_new).collect();
        assert_eq!(back, expected);
    }

    #[test]
    fn test_quoted_place_round_trip() {
        let place = r#"O'Brien's "Best" Shop"#;
        let text = export_csv(&[record(place, "", 999, "Cash", false)]).unwrap();
        assert!(text.contains(r#""O'Brien's ""Best"" Shop""#));

        let back = reimport(&text);
        assert_eq!(back[0].place, place);
    }

    #[test]
    fn test_readable_by_csv_crate() {
        let view = vec![
            record("Cafe, Downtown", "1 \"A\" St", 1234, "Credit Card", false),
            record("Deli", "", 50, "Cash", true),
        ];
        let text = export_csv(&view).unwrap();

        let mut reader = ::csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 8);
        assert_eq!(&headers[2], "Place");

        let rows: Vec<::csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "Cafe, Downtown");
        assert_eq!(&rows[0][3], "1 \"A\" St");
        assert_eq!(&rows[0][6], "12.34");
        assert_eq!(&rows[1][7], "Review Later");
    }

    #[test]
    fn test_export_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");

        assert!(!export_to_file(&[], &path).unwrap());
        assert!(!path.exists());

        assert!(export_to_file(&[record("Deli", "", 50, "Cash", false)], &path).unwrap());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(EXPORT_HEADER));
    }

    #[test]
    fn test_default_filename() {
        let name = default_export_filename(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(name, PathBuf::from("expenses_export_2024-03-09.csv"));
    }
}
