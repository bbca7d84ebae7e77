//! Expense categories
//!
//! Categories form a closed set. Anything arriving from outside the crate is
//! normalized through [`Category::normalize`], which falls back to `Other`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spending category of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Category {
    Food,
    Gas,
    Repair,
    Groceries,
    Utilities,
    Entertainment,
    #[default]
    Other,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Gas,
        Category::Repair,
        Category::Groceries,
        Category::Utilities,
        Category::Entertainment,
        Category::Other,
    ];

    /// Canonical name as stored and exported
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Gas => "Gas",
            Self::Repair => "Repair",
            Self::Groceries => "Groceries",
            Self::Utilities => "Utilities",
            Self::Entertainment => "Entertainment",
            Self::Other => "Other",
        }
    }

    /// Map untrusted input onto the closed set
    ///
    /// Matching is exact; absent, blank or unknown values become `Other`.
    pub fn normalize(value: Option<&str>) -> Self {
        value
            .map(str::trim)
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::Other)
    }

    /// Category implied by a merchant name, if any
    ///
    /// Hardware stores are filed under `Repair`.
    pub fn suggested_for_place(place: &str) -> Option<Self> {
        let lower = place.to_lowercase();
        if lower.contains("lowe's") || lower.contains("lowes") || lower.contains("home depot") {
            Some(Self::Repair)
        } else {
            None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Returned when a string names no category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown category '{}' (expected one of: {})",
            self.0,
            Category::ALL.map(|c| c.as_str()).join(", ")
        )
    }
}

impl std::error::Error for UnknownCategory {}
