//! Receipt scan orchestrator
//!
//! Runs one scan request end to end: quota, credential, image encoding, the
//! recognition call, response parsing and the batched write. Every abort
//! names the stage it happened in. Quota consumed before an abort is not
//! refunded.

use std::fmt;

use chrono::{Local, NaiveDate};
use rand::Rng;
use serde_json::Value;

use crate::error::{SpendlogError, SpendlogResult};
use crate::models::{ExpenseCandidate, NewExpense, SCAN_PAYMENT_TYPE};
use crate::recognition::{
    strip_code_fences, Credential, InlineImage, ReceiptImage, RecognitionService, RECEIPT_PROMPT,
};
use crate::services::quota::{QuotaDecision, QuotaGuard, DEFAULT_DAILY_LIMIT};
use crate::services::validate::validate;
use crate::services::writer::{BatchWriter, DEFAULT_BATCH_CAPACITY};
use crate::storage::{KeyValueStore, RecordStore};

/// Key under which the recognition API key is remembered
pub const CREDENTIAL_KEY: &str = "recognition_api_key";

/// Pipeline stage a scan can fail in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStage {
    Reserving,
    Encoding,
    Calling,
    Parsing,
    Persisting,
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reserving => "reserving quota",
            Self::Encoding => "encoding images",
            Self::Calling => "calling recognition service",
            Self::Parsing => "parsing response",
            Self::Persisting => "saving records",
        };
        f.write_str(name)
    }
}

/// Progress reported to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Reserving,
    Encoding,
    Calling,
    Parsing,
    Persisting,
    Failed(ScanStage),
}

/// Final result of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The response was interpreted and its accepted items written
    Completed {
        /// Items in the service response
        extracted: usize,
        /// Items acknowledged by the store
        persisted: usize,
        /// Items that failed the per-item checks
        dropped: usize,
    },
    /// The daily limit would be exceeded; nothing was called or consumed
    Denied { used: u32, limit: u32 },
    /// The scan aborted at `stage`; `persisted` records were written before it
    Failed {
        stage: ScanStage,
        reason: String,
        persisted: usize,
    },
}

impl ScanOutcome {
    /// The error behind a denied or failed scan
    pub fn error(&self) -> Option<SpendlogError> {
        match self {
            Self::Completed { .. } => None,
            Self::Denied { used, limit } => Some(SpendlogError::QuotaExceeded {
                used: *used,
                limit: *limit,
            }),
            Self::Failed { stage, reason, .. } => Some(match stage {
                ScanStage::Reserving | ScanStage::Encoding => {
                    SpendlogError::Validation(reason.clone())
                }
                ScanStage::Calling | ScanStage::Parsing => {
                    SpendlogError::ExternalService(reason.clone())
                }
                ScanStage::Persisting => SpendlogError::Storage(reason.clone()),
            }),
        }
    }
}

/// Service for scanning receipts into expense records
pub struct ScanService<'a> {
    records: &'a dyn RecordStore,
    prefs: &'a dyn KeyValueStore,
    recognizer: &'a dyn RecognitionService,
    daily_limit: u32,
    batch_capacity: usize,
}

impl<'a> ScanService<'a> {
    pub fn new(
        records: &'a dyn RecordStore,
        prefs: &'a dyn KeyValueStore,
        recognizer: &'a dyn RecognitionService,
    ) -> Self {
        Self {
            records,
            prefs,
            recognizer,
            daily_limit: DEFAULT_DAILY_LIMIT,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
        }
    }

    pub fn with_daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = limit;
        self
    }

    pub fn with_batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity;
        self
    }

    /// The remembered API key, if one was saved by an earlier scan
    pub fn stored_credential(&self) -> SpendlogResult<Option<Credential>> {
        Ok(self.prefs.get(CREDENTIAL_KEY)?.and_then(Credential::new))
    }

    /// Scan `images`, using `credential` or the remembered one
    pub fn scan(&self, images: &[ReceiptImage], credential: Option<Credential>) -> ScanOutcome {
        self.scan_with_progress(images, credential, &mut |_: ScanState| {})
    }

    /// Like [`scan`](Self::scan), reporting each state transition
    pub fn scan_with_progress(
        &self,
        images: &[ReceiptImage],
        credential: Option<Credential>,
        observer: &mut dyn FnMut(ScanState),
    ) -> ScanOutcome {
        self.scan_on(
            images,
            credential,
            Local::now().date_naive(),
            &mut rand::thread_rng(),
            observer,
        )
    }

    /// Scan with an explicit clock and id source
    pub fn scan_on<R: Rng>(
        &self,
        images: &[ReceiptImage],
        credential: Option<Credential>,
        today: NaiveDate,
        rng: &mut R,
        observer: &mut dyn FnMut(ScanState),
    ) -> ScanOutcome {
        let outcome = self.run(images, credential, today, rng, observer);
        match &outcome {
            ScanOutcome::Completed {
                extracted,
                persisted,
                dropped,
            } => tracing::info!(extracted, persisted, dropped, "receipt scan finished"),
            ScanOutcome::Denied { used, limit } => {
                tracing::info!(used, limit, "receipt scan denied by daily limit")
            }
            ScanOutcome::Failed {
                stage,
                reason,
                persisted,
            } => {
                tracing::warn!(%stage, %reason, persisted, "receipt scan failed");
                observer(ScanState::Failed(*stage));
            }
        }
        observer(ScanState::Idle);
        outcome
    }

    fn run<R: Rng>(
        &self,
        images: &[ReceiptImage],
        credential: Option<Credential>,
        today: NaiveDate,
        rng: &mut R,
        observer: &mut dyn FnMut(ScanState),
    ) -> ScanOutcome {
        observer(ScanState::Reserving);
        let credential = match self.reserve(images.len(), credential, today) {
            Ok(Ok(credential)) => credential,
            Ok(Err(denied)) => return denied,
            Err(e) => return failed(ScanStage::Reserving, e),
        };

        observer(ScanState::Encoding);
        let encoded = match images
            .iter()
            .map(ReceiptImage::encode)
            .collect::<SpendlogResult<Vec<InlineImage>>>()
        {
            Ok(encoded) => encoded,
            Err(e) => return failed(ScanStage::Encoding, e),
        };

        observer(ScanState::Calling);
        let text = match self.recognizer.infer(&credential, RECEIPT_PROMPT, &encoded) {
            Ok(text) => text,
            Err(e) => return failed(ScanStage::Calling, e),
        };

        observer(ScanState::Parsing);
        let items = match parse_items(&text) {
            Ok(items) => items,
            Err(reason) => return failed(ScanStage::Parsing, reason),
        };
        let extracted = items.len();
        let accepted: Vec<NewExpense> = items
            .iter()
            .filter_map(|item| accept_item(item, today, rng))
            .collect();
        let dropped = extracted - accepted.len();

        observer(ScanState::Persisting);
        let report =
            BatchWriter::with_capacity(self.records, self.batch_capacity).commit(accepted);
        if let Some(reason) = report.failure {
            return ScanOutcome::Failed {
                stage: ScanStage::Persisting,
                reason,
                persisted: report.persisted,
            };
        }

        ScanOutcome::Completed {
            extracted,
            persisted: report.persisted,
            dropped,
        }
    }

    /// Quota check, credential resolution, then the persisted reservation
    ///
    /// The inner `Err` carries a denial outcome.
    fn reserve(
        &self,
        count: usize,
        credential: Option<Credential>,
        today: NaiveDate,
    ) -> SpendlogResult<Result<Credential, ScanOutcome>> {
        if count == 0 {
            return Err(SpendlogError::Validation(
                "No images to scan".into(),
            ));
        }
        let requested = u32::try_from(count).unwrap_or(u32::MAX);
        let guard = QuotaGuard::new(self.prefs, self.daily_limit);

        if let QuotaDecision::Denied { used, limit } = guard.check(requested, today)? {
            return Ok(Err(ScanOutcome::Denied { used, limit }));
        }

        let credential = match credential {
            Some(credential) => credential,
            None => self.stored_credential()?.ok_or_else(|| {
                SpendlogError::Validation("missing API credential".into())
            })?,
        };
        self.prefs.set(CREDENTIAL_KEY, credential.expose())?;

        match guard.reserve(requested, today)? {
            QuotaDecision::Granted { .. } => Ok(Ok(credential)),
            QuotaDecision::Denied { used, limit } => Ok(Err(ScanOutcome::Denied { used, limit })),
        }
    }
}

fn failed(stage: ScanStage, reason: impl ToString) -> ScanOutcome {
    ScanOutcome::Failed {
        stage,
        reason: reason.to_string(),
        persisted: 0,
    }
}

/// Parse a service response into its item list
fn parse_items(text: &str) -> Result<Vec<Value>, String> {
    let cleaned = strip_code_fences(text);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| format!("failed to interpret service response: {}", e))?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err("service response is not a list".into()),
    }
}

/// Text form of a JSON field; null and absent are `None`
fn field_text(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Apply the per-item checks and defaults, then validate
fn accept_item<R: Rng>(item: &Value, today: NaiveDate, rng: &mut R) -> Option<NewExpense> {
    let place = field_text(item, "place").filter(|p| !p.trim().is_empty())?;
    let amount = field_text(item, "amount")?;

    let payment_type = field_text(item, "paymentType")
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| SCAN_PAYMENT_TYPE.to_string());

    let candidate = ExpenseCandidate {
        date: field_text(item, "date"),
        transaction_id: None,
        place: Some(place),
        address: field_text(item, "address"),
        category: field_text(item, "category"),
        payment_type: Some(payment_type),
        amount: Some(amount),
        review_later: false,
    };

    match validate(candidate, today, rng) {
        Ok(expense) => Some(expense),
        Err(rejection) => {
            tracing::debug!(%rejection, "dropped scanned item");
            None
        }
    }
}
