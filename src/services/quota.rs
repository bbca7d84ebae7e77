//! Daily receipt-scan quota
//!
//! A per-day counter kept in the local key-value store. Reservations are
//! persisted before the gated call runs, so a burst of requests cannot slip
//! past the limit through an unsaved read. Single-process only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SpendlogError, SpendlogResult};
use crate::storage::KeyValueStore;

/// Key under which the counter is stored
pub const QUOTA_KEY: &str = "scan_daily_usage";

/// Default number of scans allowed per day
pub const DEFAULT_DAILY_LIMIT: u32 = 20;

/// Persisted counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub date: NaiveDate,
    pub count: u32,
}

impl QuotaState {
    /// The state as seen on `today`: a counter from another day reads as zero
    fn as_of(self, today: NaiveDate) -> Self {
        if self.date == today {
            self
        } else {
            Self {
                date: today,
                count: 0,
            }
        }
    }
}

/// Result of a quota request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Request fits; `used` includes it when the reservation was committed
    Granted { used: u32, limit: u32 },
    /// Request would exceed the limit; `used` is the unchanged count
    Denied { used: u32, limit: u32 },
}

impl QuotaDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// Convert a denial into an error
    pub fn into_result(self) -> SpendlogResult<()> {
        match self {
            Self::Granted { .. } => Ok(()),
            Self::Denied { used, limit } => Err(SpendlogError::QuotaExceeded { used, limit }),
        }
    }
}

/// Gate for calls to the recognition service
pub struct QuotaGuard<'a> {
    store: &'a dyn KeyValueStore,
    limit: u32,
}

impl<'a> QuotaGuard<'a> {
    pub fn new(store: &'a dyn KeyValueStore, limit: u32) -> Self {
        Self { store, limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Current usage for `today`
    pub fn usage(&self, today: NaiveDate) -> SpendlogResult<QuotaState> {
        Ok(self.load(today)?.as_of(today))
    }

    /// Decide whether `requested` more scans fit, without recording them
    pub fn check(&self, requested: u32, today: NaiveDate) -> SpendlogResult<QuotaDecision> {
        let state = self.usage(today)?;
        Ok(self.decide(state, requested))
    }

    /// Reserve `requested` scans, persisting the new count when granted
    ///
    /// A denial leaves the stored state untouched.
    pub fn reserve(&self, requested: u32, today: NaiveDate) -> SpendlogResult<QuotaDecision> {
        let state = self.usage(today)?;
        let decision = self.decide(state, requested);

        match decision {
            QuotaDecision::Granted { used, .. } => {
                let next = QuotaState {
                    date: today,
                    count: used,
                };
                self.store.set(QUOTA_KEY, &serde_json::to_string(&next)?)?;
                tracing::info!(used, limit = self.limit, "scan quota reserved");
            }
            QuotaDecision::Denied { used, limit } => {
                tracing::info!(used, limit, requested, "scan quota denied");
            }
        }

        Ok(decision)
    }

    fn decide(&self, state: QuotaState, requested: u32) -> QuotaDecision {
        match state.count.checked_add(requested) {
            Some(total) if total <= self.limit => QuotaDecision::Granted {
                used: total,
                limit: self.limit,
            },
            _ => QuotaDecision::Denied {
                used: state.count,
                limit: self.limit,
            },
        }
    }

    /// Read the stored counter; an unreadable value counts as a fresh day
    fn load(&self, today: NaiveDate) -> SpendlogResult<QuotaState> {
        let fresh = QuotaState {
            date: today,
            count: 0,
        };
        let Some(raw) = self.store.get(QUOTA_KEY)? else {
            return Ok(fresh);
        };
        match serde_json::from_str(&raw) {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable scan quota state");
                Ok(fresh)
            }
        }
    }
}
