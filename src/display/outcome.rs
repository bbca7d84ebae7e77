//! Messages for pipeline results

use crate::services::{CommitOutcome, ImportSummary, QuotaState, ScanOutcome};

/// One-paragraph report of a CSV import
pub fn format_import_summary(summary: &ImportSummary) -> String {
    let mut output = match summary.outcome() {
        CommitOutcome::NothingAccepted => "No valid rows found in CSV.".to_string(),
        CommitOutcome::Complete => format!("Imported {} expenses.", summary.persisted),
        CommitOutcome::Partial => format!(
            "Imported {} of {} expenses before the store rejected a batch.",
            summary.persisted, summary.imported
        ),
        CommitOutcome::Rejected => format!(
            "{} rows were valid but none could be saved.",
            summary.imported
        ),
    };

    if summary.skipped > 0 {
        output.push_str(&format!(" Skipped {} malformed rows.", summary.skipped));
    }
    if let Some(reason) = &summary.report.failure {
        output.push_str(&format!("\nStore error: {}", reason));
    }
    output
}

/// Report of a receipt scan
pub fn format_scan_outcome(outcome: &ScanOutcome) -> String {
    match outcome {
        ScanOutcome::Completed {
            extracted,
            persisted,
            dropped,
        } => {
            let mut output = format!(
                "Scanned {} receipts, added {} expenses.",
                extracted, persisted
            );
            if *dropped > 0 {
                output.push_str(&format!(" Ignored {} incomplete items.", dropped));
            }
            output
        }
        ScanOutcome::Denied { used, limit } => format!(
            "Daily limit reached! You have used {}/{} scans today.",
            used, limit
        ),
        ScanOutcome::Failed {
            stage,
            reason,
            persisted,
        } => {
            let mut output = format!("Failed to scan receipts while {}: {}", stage, reason);
            if *persisted > 0 {
                output.push_str(&format!(
                    "\n{} expenses were saved before the failure.",
                    persisted
                ));
            }
            output
        }
    }
}

/// Daily scan usage line
pub fn format_quota(state: &QuotaState, limit: u32) -> String {
    format!(
        "Scans used today: {}/{} ({} left)",
        state.count,
        limit,
        limit.saturating_sub(state.count)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scan::ScanStage;
    use crate::services::CommitReport;
    use chrono::NaiveDate;

    fn summary(imported: usize, persisted: usize, skipped: usize, failure: Option<&str>) -> ImportSummary {
        ImportSummary {
            imported,
            skipped,
            persisted,
            report: CommitReport {
                accepted: imported,
                persisted,
                batches_committed: usize::from(persisted > 0),
                failure: failure.map(String::from),
            },
        }
    }

    #[test]
    fn test_import_messages() {
        assert_eq!(
            format_import_summary(&summary(9, 9, 1, None)),
            "Imported 9 expenses. Skipped 1 malformed rows."
        );
        assert_eq!(
            format_import_summary(&summary(0, 0, 3, None)),
            "No valid rows found in CSV. Skipped 3 malformed rows."
        );
        assert!(format_import_summary(&summary(5, 0, 0, Some("disk full")))
            .starts_with("5 rows were valid but none could be saved."));
        assert!(format_import_summary(&summary(900, 450, 0, Some("disk full")))
            .contains("Imported 450 of 900"));
    }

    #[test]
    fn test_scan_messages() {
        assert_eq!(
            format_scan_outcome(&ScanOutcome::Denied { used: 18, limit: 20 }),
            "Daily limit reached! You have used 18/20 scans today."
        );
        assert!(format_scan_outcome(&ScanOutcome::Failed {
            stage: ScanStage::Parsing,
            reason: "bad json".into(),
            persisted: 0,
        })
        .contains("parsing response"));
        assert!(format_scan_outcome(&ScanOutcome::Failed {
            stage: ScanStage::Persisting,
            reason: "disk full".into(),
            persisted: 450,
        })
        .ends_with("450 expenses were saved before the failure."));
        assert_eq!(
            format_scan_outcome(&ScanOutcome::Completed {
                extracted: 3,
                persisted: 2,
                dropped: 1
            }),
            "Scanned 3 receipts, added 2 expenses. Ignored 1 incomplete items."
        );
    }

    #[test]
    fn test_quota_line() {
        let state = QuotaState {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            count: 5,
        };
        assert_eq!(format_quota(&state, 20), "Scans used today: 5/20 (15 left)");
    }
}
