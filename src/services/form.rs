//! Manual entry service
//!
//! Holds the state of the add/edit form and turns a submitted form into a
//! create or a full-field update.

use chrono::{Local, NaiveDate};
use rand::Rng;

use crate::error::{SpendlogError, SpendlogResult};
use crate::models::{
    Category, ExpenseCandidate, ExpenseRecord, ExpenseUpdate, RecordId, FORM_PAYMENT_TYPES,
    SCAN_PAYMENT_TYPE,
};
use crate::services::validate::validate;
use crate::storage::RecordStore;

/// Editable fields of the entry form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseForm {
    pub date: String,
    pub amount: String,
    place: String,
    pub address: String,
    category: Category,
    pub payment_type: String,
    pub transaction_id: String,
    pub review_later: bool,
}

impl ExpenseForm {
    /// A blank form dated `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            amount: String::new(),
            place: String::new(),
            address: String::new(),
            category: Category::Food,
            payment_type: SCAN_PAYMENT_TYPE.to_string(),
            transaction_id: String::new(),
            review_later: false,
        }
    }

    /// A form pre-filled from an existing record
    pub fn from_record(record: &ExpenseRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            amount: record.amount.to_decimal_string(),
            place: record.place.clone(),
            address: record.address.clone(),
            category: record.category,
            payment_type: record.payment_type.clone(),
            transaction_id: record.transaction_id.clone(),
            review_later: record.review_later,
        }
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Set the place; home-improvement stores switch the category to Repair
    pub fn set_place(&mut self, place: impl Into<String>) {
        self.place = place.into();
        if let Some(category) = Category::suggested_for_place(&self.place) {
            self.category = category;
        }
    }

    /// Manual category choice, overriding any suggestion
    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    fn to_candidate(&self) -> ExpenseCandidate {
        ExpenseCandidate {
            date: Some(self.date.clone()),
            transaction_id: Some(self.transaction_id.clone()),
            place: Some(self.place.clone()),
            address: Some(self.address.clone()),
            category: Some(self.category.as_str().to_string()),
            payment_type: Some(self.payment_type.clone()),
            amount: Some(self.amount.clone()),
            review_later: self.review_later,
        }
    }
}

/// Service for manual record changes
pub struct FormService<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> FormService<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Create a record, or overwrite `editing` with the form's fields
    pub fn submit(&self, form: &ExpenseForm, editing: Option<RecordId>) -> SpendlogResult<RecordId> {
        self.submit_on(form, editing, Local::now().date_naive(), &mut rand::thread_rng())
    }

    /// Submit with an explicit clock and id source
    pub fn submit_on<R: Rng>(
        &self,
        form: &ExpenseForm,
        editing: Option<RecordId>,
        today: NaiveDate,
        rng: &mut R,
    ) -> SpendlogResult<RecordId> {
        let payment_type = form.payment_type.trim();
        if !FORM_PAYMENT_TYPES.contains(&payment_type)
            && !self.keeps_payment_type(editing, payment_type)?
        {
            return Err(SpendlogError::Validation(format!(
                "Unknown payment type '{}'. Use one of: {}",
                payment_type,
                FORM_PAYMENT_TYPES.join(", ")
            )));
        }

        let expense = validate(form.to_candidate(), today, rng)
            .map_err(|rejection| SpendlogError::Validation(rejection.to_string()))?;

        match editing {
            Some(id) => {
                self.store.update(id, ExpenseUpdate::Replace(expense))?;
                tracing::info!(%id, "expense updated");
                Ok(id)
            }
            None => {
                let id = self.store.create(expense)?;
                tracing::info!(%id, "expense created");
                Ok(id)
            }
        }
    }

    /// Imported and scanned records may carry free-text payment types; an
    /// edit may keep the stored value unchanged
    fn keeps_payment_type(
        &self,
        editing: Option<RecordId>,
        payment_type: &str,
    ) -> SpendlogResult<bool> {
        let Some(id) = editing else {
            return Ok(false);
        };
        Ok(self
            .store
            .get(id)?
            .is_some_and(|record| record.payment_type.trim() == payment_type))
    }

    /// Delete a record
    pub fn delete(&self, id: RecordId) -> SpendlogResult<()> {
        if !self.store.delete(id)? {
            return Err(SpendlogError::expense_not_found(id.to_string()));
        }
        tracing::info!(%id, "expense deleted");
        Ok(())
    }

    /// Flip the review flag, returning the new value
    pub fn toggle_review(&self, id: RecordId) -> SpendlogResult<bool> {
        let record = self
            .store
            .get(id)?
            .ok_or_else(|| SpendlogError::expense_not_found(id.to_string()))?;
        let flagged = !record.review_later;
        self.store.update(id, ExpenseUpdate::ReviewLater(flagged))?;
        Ok(flagged)
    }
}
