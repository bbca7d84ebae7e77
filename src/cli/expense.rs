//! Expense CLI commands
//!
//! Manual entry, editing, deletion, review flags and listing.

use clap::Args;

use super::{filtered_view, resolve_record_id, FilterArgs};
use crate::display::{format_expense_details, format_expense_table};
use crate::error::{SpendlogError, SpendlogResult};
use crate::models::Category;
use crate::services::{ExpenseForm, FormService};
use crate::storage::{RecordStore, Storage};

/// Arguments for `add`
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Merchant or description
    pub place: String,
    /// Amount spent (e.g. "12.50")
    pub amount: String,
    /// Date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    pub date: Option<String>,
    /// Category; hardware stores default to Repair, anything else to Food
    #[arg(short, long)]
    pub category: Option<Category>,
    /// Payment method: Credit Card, Debit Card, Cash or Transfer
    #[arg(short, long)]
    pub payment: Option<String>,
    /// Merchant address
    #[arg(short, long)]
    pub address: Option<String>,
    /// Transaction reference, generated when omitted
    #[arg(long = "txn-id")]
    pub transaction_id: Option<String>,
    /// Flag for a later look
    #[arg(long)]
    pub review_later: bool,
}

/// Arguments for `edit`
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Expense ID, ID prefix or transaction reference
    pub id: String,
    #[arg(long)]
    pub place: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(short, long)]
    pub date: Option<String>,
    #[arg(short, long)]
    pub category: Option<Category>,
    #[arg(short, long)]
    pub payment: Option<String>,
    #[arg(short, long)]
    pub address: Option<String>,
    /// New transaction reference; blank regenerates it
    #[arg(long = "txn-id")]
    pub transaction_id: Option<String>,
    /// Set or clear the review flag
    #[arg(long)]
    pub review_later: Option<bool>,
}

/// Arguments for `list`
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Number of expenses to show
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Handle the add command
pub fn handle_add_command(storage: &Storage, args: AddArgs) -> SpendlogResult<()> {
    let mut form = ExpenseForm::new(chrono::Local::now().date_naive());
    form.set_place(args.place);
    if let Some(category) = args.category {
        form.set_category(category);
    }
    form.amount = args.amount;
    if let Some(date) = args.date {
        form.date = date;
    }
    if let Some(payment) = args.payment {
        form.payment_type = payment;
    }
    if let Some(address) = args.address {
        form.address = address;
    }
    if let Some(transaction_id) = args.transaction_id {
        form.transaction_id = transaction_id;
    }
    form.review_later = args.review_later;

    let id = FormService::new(&storage.expenses).submit(&form, None)?;
    let record = storage
        .expenses
        .get(id)?
        .ok_or_else(|| SpendlogError::expense_not_found(id.to_string()))?;

    println!("Created expense:");
    print!("{}", format_expense_details(&record));
    Ok(())
}

/// Handle the edit command
pub fn handle_edit_command(storage: &Storage, args: EditArgs) -> SpendlogResult<()> {
    let id = resolve_record_id(&storage.expenses, &args.id)?;
    let record = storage
        .expenses
        .get(id)?
        .ok_or_else(|| SpendlogError::expense_not_found(&args.id))?;

    let mut form = ExpenseForm::from_record(&record);
    if let Some(place) = args.place {
        form.set_place(place);
    }
    if let Some(category) = args.category {
        form.set_category(category);
    }
    if let Some(amount) = args.amount {
        form.amount = amount;
    }
    if let Some(date) = args.date {
        form.date = date;
    }
    if let Some(payment) = args.payment {
        form.payment_type = payment;
    }
    if let Some(address) = args.address {
        form.address = address;
    }
    if let Some(transaction_id) = args.transaction_id {
        form.transaction_id = transaction_id;
    }
    if let Some(flag) = args.review_later {
        form.review_later = flag;
    }

    FormService::new(&storage.expenses).submit(&form, Some(id))?;
    let updated = storage
        .expenses
        .get(id)?
        .ok_or_else(|| SpendlogError::expense_not_found(id.to_string()))?;

    println!("Updated expense:");
    print!("{}", format_expense_details(&updated));
    Ok(())
}

/// Handle the delete command
pub fn handle_delete_command(storage: &Storage, id: &str) -> SpendlogResult<()> {
    let id = resolve_record_id(&storage.expenses, id)?;
    FormService::new(&storage.expenses).delete(id)?;
    println!("Deleted expense {}", id);
    Ok(())
}

/// Handle the review command (toggle the review flag)
pub fn handle_review_command(storage: &Storage, id: &str) -> SpendlogResult<()> {
    let id = resolve_record_id(&storage.expenses, id)?;
    let flagged = FormService::new(&storage.expenses).toggle_review(id)?;
    if flagged {
        println!("Marked {} for review", id);
    } else {
        println!("Marked {} as verified", id);
    }
    Ok(())
}

/// Handle the show command
pub fn handle_show_command(storage: &Storage, id: &str) -> SpendlogResult<()> {
    let resolved = resolve_record_id(&storage.expenses, id)?;
    let record = storage
        .expenses
        .get(resolved)?
        .ok_or_else(|| SpendlogError::expense_not_found(id))?;
    print!("{}", format_expense_details(&record));
    Ok(())
}

/// Handle the list command
pub fn handle_list_command(storage: &Storage, args: ListArgs) -> SpendlogResult<()> {
    let view = filtered_view(storage, &args.filter)?;
    let mut rows = view.rows();
    let total = rows.len();
    if let Some(limit) = args.limit {
        rows.truncate(limit);
    }

    println!("{}", format_expense_table(&rows));
    if rows.len() < total {
        println!("Showing {} of {} expenses", rows.len(), total);
    }
    Ok(())
}
