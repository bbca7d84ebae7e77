//! Expense display formatting
//!
//! Formats expense records for terminal output in table and detail views.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{ExpenseRecord, RecordId};

/// Number of id characters shown in tables
pub const SHORT_ID_LEN: usize = 8;

/// Leading characters of a record id, enough to pick it on the command line
pub fn short_id(id: &RecordId) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Place")]
    place: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Payment")]
    payment: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Review")]
    review: &'static str,
}

impl From<&ExpenseRecord> for ExpenseRow {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            id: short_id(&record.id),
            date: record.date.format("%Y-%m-%d").to_string(),
            place: truncate(&record.place, 28),
            category: record.category.to_string(),
            payment: record.payment_type.clone(),
            amount: record.amount.to_string(),
            review: if record.review_later { "!" } else { "" },
        }
    }
}

/// Format a list of expenses as a table
pub fn format_expense_table(records: &[ExpenseRecord]) -> String {
    if records.is_empty() {
        return "No expenses found.".to_string();
    }

    let rows: Vec<ExpenseRow> = records.iter().map(ExpenseRow::from).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::sharp())
        .modify(Columns::single(5), Alignment::right());
    table.to_string()
}

/// Format expense details for display
pub fn format_expense_details(record: &ExpenseRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", record.id));
    output.push_str(&format!("Reference:   {}\n", record.transaction_id));
    output.push_str(&format!("Date:        {}\n", record.date.format("%Y-%m-%d")));
    output.push_str(&format!("Amount:      {}\n", record.amount));
    output.push_str(&format!("Place:       {}\n", record.place));
    if !record.address.is_empty() {
        output.push_str(&format!("Address:     {}\n", record.address));
    }
    output.push_str(&format!("Category:    {}\n", record.category));
    output.push_str(&format!("Payment:     {}\n", record.payment_type));
    output.push_str(&format!(
        "Status:      {}\n",
        if record.review_later {
            "Review Later"
        } else {
            "Verified"
        }
    ));

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
