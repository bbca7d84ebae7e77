//! CSV row parser
//!
//! Turns delimited text into expense rows. The first line is always treated
//! as a header. Malformed rows are dropped and counted, never fatal.
//!
//! Column layout (positional):
//!
//! | idx | field          | when blank          |
//! |-----|----------------|---------------------|
//! | 0   | date           | today               |
//! | 1   | transaction id | generated           |
//! | 2   | place          | row dropped         |
//! | 3   | address        | empty               |
//! | 4   | category       | `Other`             |
//! | 5   | payment type   | `Cash`              |
//! | 6   | amount         | row dropped         |
//! | 7   | review status  | not flagged         |

use std::iter::Enumerate;
use std::str::Split;
use std::sync::OnceLock;

use chrono::NaiveDate;
use rand::Rng;
use regex::Regex;

use crate::models::{ExpenseCandidate, NewExpense};
use crate::services::validate::{validate, Rejection};

/// Minimum tokens a row needs before field validation is attempted
pub const MIN_COLUMNS: usize = 6;

/// Review-status label that flags a row
pub const REVIEW_LATER_LABEL: &str = "Review Later";

/// Quoted cell, or a run of non-comma text that neither starts nor ends with
/// whitespace; each followed by a comma or the end of the line
const TOKEN_PATTERN: &str = r#"("(?:.*?)"|[^",\s](?:[^",]*[^",\s])?)\s*(?:,|$)"#;

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// Why a data line was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The tokenizer found nothing on the line
    Unmatched,
    /// Fewer than [`MIN_COLUMNS`] tokens
    TooFewColumns(usize),
    /// Enough columns, but a field failed validation
    Invalid(Rejection),
}

/// Outcome for one non-blank data line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRow {
    Accepted { line: usize, expense: NewExpense },
    Dropped { line: usize, reason: DropReason },
}

impl ParsedRow {
    /// 1-based line number in the source text
    pub fn line(&self) -> usize {
        match self {
            Self::Accepted { line, .. } | Self::Dropped { line, .. } => *line,
        }
    }

    /// The accepted expense, if any
    pub fn into_expense(self) -> Option<NewExpense> {
        match self {
            Self::Accepted { expense, .. } => Some(expense),
            Self::Dropped { .. } => None,
        }
    }
}

/// Single-pass iterator over the data lines of a CSV text
pub struct CsvRows<'t, R> {
    lines: Enumerate<Split<'t, char>>,
    today: NaiveDate,
    rng: R,
}

/// Parse `text` lazily; the header line is skipped up front
pub fn parse_rows<R: Rng>(text: &str, today: NaiveDate, rng: R) -> CsvRows<'_, R> {
    let mut lines = text.split('\n').enumerate();
    lines.next();
    CsvRows { lines, today, rng }
}

impl<'t, R: Rng> Iterator for CsvRows<'t, R> {
    type Item = ParsedRow;

    fn next(&mut self) -> Option<ParsedRow> {
        loop {
            let (idx, raw) = self.lines.next()?;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            return Some(self.parse_line(idx + 1, line));
        }
    }
}

impl<'t, R: Rng> CsvRows<'t, R> {
    fn parse_line(&mut self, line_no: usize, line: &str) -> ParsedRow {
        let tokens = tokenize(line);

        let dropped = |reason| ParsedRow::Dropped {
            line: line_no,
            reason,
        };

        if tokens.is_empty() {
            return dropped(DropReason::Unmatched);
        }
        if tokens.len() < MIN_COLUMNS {
            return dropped(DropReason::TooFewColumns(tokens.len()));
        }

        let column = |i: usize| tokens.get(i).cloned();
        let candidate = ExpenseCandidate {
            date: column(0),
            transaction_id: column(1),
            place: column(2),
            address: column(3),
            category: column(4),
            payment_type: column(5),
            amount: column(6),
            review_later: tokens.get(7).map(|s| s == REVIEW_LATER_LABEL).unwrap_or(false),
        };

        match validate(candidate, self.today, &mut self.rng) {
            Ok(expense) => ParsedRow::Accepted {
                line: line_no,
                expense,
            },
            Err(rejection) => dropped(DropReason::Invalid(rejection)),
        }
    }
}

/// Split one line into cleaned cells
///
/// Each cell is trimmed, loses one surrounding pair of double quotes, and
/// has doubled quotes collapsed.
pub fn tokenize(line: &str) -> Vec<String> {
    token_regex()
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean_cell(m.as_str()))
        .collect()
}

fn clean_cell(cell: &str) -> String {
    let cell = cell.trim();
    let cell = cell.strip_prefix('"').unwrap_or(cell);
    let cell = cell.strip_suffix('"').unwrap_or(cell);
    cell.replace("\"\"", "\"")
}
