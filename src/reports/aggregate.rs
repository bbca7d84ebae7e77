//! Filtered views and summary statistics
//!
//! Everything here is recomputed from scratch over the current record set.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Category, ExpenseRecord, Money};

/// Date sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// View controls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// `YYYY-MM` prefix of the record date
    pub month: Option<String>,
    pub category: Option<Category>,
    /// Case-insensitive substring of place, address or transaction id
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl ExpenseFilter {
    /// Check if a record passes the month, category and search filters
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        if let Some(month) = self.month.as_deref().filter(|m| !m.is_empty()) {
            if !record.date.format("%Y-%m-%d").to_string().starts_with(month) {
                return false;
            }
        }

        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }

        if let Some(term) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let term = term.to_lowercase();
            let hit = [&record.place, &record.address, &record.transaction_id]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Filter then sort by date (stable)
pub fn apply_filters(records: &[ExpenseRecord], filter: &ExpenseFilter) -> Vec<ExpenseRecord> {
    let mut view: Vec<ExpenseRecord> = records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();

    match filter.sort {
        SortOrder::Ascending => view.sort_by(|a, b| a.date.cmp(&b.date)),
        SortOrder::Descending => view.sort_by(|a, b| b.date.cmp(&a.date)),
    }
    view
}

/// Spending in one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Money,
    pub count: usize,
}

/// Spending in one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTotal {
    /// `YYYY-MM`
    pub month: String,
    pub total: Money,
}

/// Summary statistics of a view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub total_spent: Money,
    pub transaction_count: usize,
    /// In order of first appearance in the view
    pub category_breakdown: Vec<CategoryTotal>,
    /// Ascending by month
    pub monthly_trend: Vec<MonthTotal>,
    /// Largest category total; ties go to the first one seen
    pub top_category: Option<CategoryTotal>,
    pub average_transaction: Money,
    /// Months present in the full record set, newest first
    pub available_months: Vec<String>,
}

impl Aggregates {
    /// Compute statistics over `view`; month options come from `all`
    pub fn compute(view: &[ExpenseRecord], all: &[ExpenseRecord]) -> Self {
        let mut total_spent = Money::zero();
        let mut category_breakdown: Vec<CategoryTotal> = Vec::new();
        let mut months: BTreeMap<String, Money> = BTreeMap::new();

        for record in view {
            total_spent += record.amount;

            match category_breakdown
                .iter_mut()
                .find(|c| c.category == record.category)
            {
                Some(entry) => {
                    entry.total += record.amount;
                    entry.count += 1;
                }
                None => category_breakdown.push(CategoryTotal {
                    category: record.category,
                    total: record.amount,
                    count: 1,
                }),
            }

            *months.entry(record.month_key()).or_default() += record.amount;
        }

        let mut top_category: Option<&CategoryTotal> = None;
        for entry in &category_breakdown {
            if top_category.map_or(true, |top| entry.total > top.total) {
                top_category = Some(entry);
            }
        }
        let top_category = top_category.cloned();

        let available_months: BTreeSet<String> = all.iter().map(ExpenseRecord::month_key).collect();

        Self {
            total_spent,
            transaction_count: view.len(),
            top_category,
            average_transaction: total_spent.average(view.len()),
            category_breakdown,
            monthly_trend: months
                .into_iter()
                .map(|(month, total)| MonthTotal { month, total })
                .collect(),
            available_months: available_months.into_iter().rev().collect(),
        }
    }

    /// Share of the total spent in `entry`, as a percentage
    pub fn share(&self, entry: &CategoryTotal) -> f64 {
        if self.total_spent.is_zero() {
            0.0
        } else {
            entry.total.cents() as f64 / self.total_spent.cents() as f64 * 100.0
        }
    }

    /// Format the summary for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Total Spent: {}\n", self.total_spent));
        output.push_str(&format!("Transactions: {}\n", self.transaction_count));
        output.push_str(&format!("Average: {}\n", self.average_transaction));
        match &self.top_category {
            Some(top) => output.push_str(&format!("Top Category: {} ({})\n", top.category, top.total)),
            None => output.push_str("Top Category: N/A\n"),
        }

        if !self.category_breakdown.is_empty() {
            output.push('\n');
            output.push_str(&format!("{:<20} {:>12} {:>8} {:>7}\n", "Category", "Amount", "Count", "%"));
            output.push_str(&"-".repeat(50));
            output.push('\n');
            for entry in &self.category_breakdown {
                output.push_str(&format!(
                    "{:<20} {:>12} {:>8} {:>6.1}%\n",
                    entry.category.as_str(),
                    entry.total.to_string(),
                    entry.count,
                    self.share(entry)
                ));
            }
        }

        if !self.monthly_trend.is_empty() {
            output.push('\n');
            output.push_str("Monthly Trend\n");
            output.push_str(&"-".repeat(50));
            output.push('\n');
            for month in &self.monthly_trend {
                output.push_str(&format!("{:<20} {:>12}\n", month.month, month.total.to_string()));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record(date: &str, cents: i64, category: Category, place: &str) -> ExpenseRecord {
        ExpenseRecord {
            id: RecordId::new(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount: Money::from_cents(cents),
            place: place.into(),
            address: String::new(),
            category,
            payment_type: "Cash".into(),
            transaction_id: "TXN-100000".into(),
            review_later: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<ExpenseRecord> {
        vec![
            record("2024-01-15", 1000, Category::Food, "Bistro"),
            record("2024-01-20", 500, Category::Gas, "Shell"),
            record("2024-02-01", 1500, Category::Food, "Diner"),
        ]
    }

    #[test]
    fn test_month_filter_statistics() {
        let all = sample();
        let filter = ExpenseFilter {
            month: Some("2024-01".into()),
            ..Default::default()
        };
        let view = apply_filters(&all, &filter);
        let stats = Aggregates::compute(&view, &all);

        assert_eq!(stats.total_spent, Money::from_cents(1500));
        assert_eq!(stats.transaction_count, 2);
        let top = stats.top_category.unwrap();
        assert_eq!(top.category, Category::Food);
        assert_eq!(top.total, Money::from_cents(1000));
        assert_eq!(stats.average_transaction, Money::from_cents(750));
        assert_eq!(stats.available_months, vec!["2024-02", "2024-01"]);
    }

    #[test]
    fn test_unfiltered_monthly_trend() {
        let all = sample();
        let view = apply_filters(&all, &ExpenseFilter::default());
        let stats = Aggregates::compute(&view, &all);

        let trend: Vec<(String, i64)> = stats
            .monthly_trend
            .iter()
            .map(|m| (m.month.clone(), m.total.cents()))
            .collect();
        assert_eq!(
            trend,
            vec![("2024-01".to_string(), 1500), ("2024-02".to_string(), 1500)]
        );
    }

    #[test]
    fn test_breakdown_first_seen_order_and_tie_break() {
        let all = vec![
            record("2024-03-01", 700, Category::Gas, "A"),
            record("2024-03-02", 300, Category::Food, "B"),
            record("2024-03-03", 400, Category::Food, "C"),
        ];
        let stats = Aggregates::compute(&all, &all);

        let order: Vec<Category> = stats.category_breakdown.iter().map(|c| c.category).collect();
        assert_eq!(order, vec![Category::Gas, Category::Food]);
        assert_eq!(stats.top_category.unwrap().category, Category::Gas);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let mut all = vec![
            record("2024-01-01", 100, Category::Repair, "Lowe's Hardware"),
            record("2024-01-02", 100, Category::Other, "Target"),
        ];
        all[1].address = "12 Elm".into();

        let search = |term: &str| {
            apply_filters(
                &all,
                &ExpenseFilter {
                    search: Some(term.into()),
                    ..Default::default()
                },
            )
        };

        let hits = search("lowe");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].place, "Lowe's Hardware");
        assert_eq!(search("ELM")[0].place, "Target");
        assert_eq!(search("txn-1000").len(), 2);
    }

    #[test]
    fn test_category_filter_and_sort() {
        let all = sample();
        let filter = ExpenseFilter {
            category: Some(Category::Food),
            sort: SortOrder::Ascending,
            ..Default::default()
        };
        let view = apply_filters(&all, &filter);
        let places: Vec<&str> = view.iter().map(|r| r.place.as_str()).collect();
        assert_eq!(places, vec!["Bistro", "Diner"]);

        let filter = ExpenseFilter {
            category: Some(Category::Food),
            ..Default::default()
        };
        assert_eq!(apply_filters(&all, &filter)[0].place, "Diner");
    }

    #[test]
    fn test_empty_view() {
        let all = sample();
        let stats = Aggregates::compute(&[], &all);

        assert!(stats.total_spent.is_zero());
        assert!(stats.average_transaction.is_zero());
        assert!(stats.top_category.is_none());
        assert!(stats.category_breakdown.is_empty());
        assert_eq!(stats.available_months.len(), 2);
        assert!(stats.format_terminal().contains("Top Category: N/A"));
    }
}
