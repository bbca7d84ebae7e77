//! Service layer for spendlog
//!
//! The service layer provides the ingestion pipeline on top of the storage
//! layer: validation, batched writes, the scan quota and the three entry
//! paths (form, CSV import, receipt scan).

pub mod form;
pub mod import;
pub mod quota;
pub mod scan;
pub mod validate;
pub mod writer;

pub use form::{ExpenseForm, FormService};
pub use import::{ImportService, ImportSummary};
pub use quota::{QuotaDecision, QuotaGuard, QuotaState};
pub use scan::{ScanOutcome, ScanService, ScanStage, ScanState};
pub use validate::{validate, Rejection};
pub use writer::{BatchWriter, CommitOutcome, CommitReport};
