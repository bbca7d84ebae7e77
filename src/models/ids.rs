//! Strongly-typed identifiers
//!
//! `RecordId` is the store-assigned document id. `TransactionId` strings are
//! the human-facing `TXN-######` references carried inside each record.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned identifier of a persisted expense record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim())
    }
}

/// Prefix of generated transaction references
pub const TRANSACTION_ID_PREFIX: &str = "TXN-";

/// Generate a transaction reference: `TXN-` followed by a number in
/// [100000, 999999]
///
/// Not guaranteed unique; collisions with existing records are not checked.
pub fn generate_transaction_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let n: u32 = rng.gen_range(100_000..=999_999);
    format!("{}{}", TRANSACTION_ID_PREFIX, n)
}
