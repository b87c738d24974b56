use contracts::dashboards::d100_finance::{CategoryAmount, UserPerformance};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::source::{ExpenseRecord, SaleRecord};

/// Non-blank label, trimmed
fn label(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Expense totals per category, ordered by category name.
///
/// Records without a category are left out of the chart only; the
/// expense KPI is computed from the monthly series and still includes them.
pub fn category_breakdown(records: &[ExpenseRecord]) -> Vec<CategoryAmount> {
    records
        .iter()
        .filter_map(|r| label(r.category.as_deref()).map(|name| (name, r.amount)))
        .fold(BTreeMap::<&str, Decimal>::new(), |mut acc, (name, amount)| {
            *acc.entry(name).or_default() += amount;
            acc
        })
        .into_iter()
        .map(|(name, value)| CategoryAmount {
            name: name.to_string(),
            value,
        })
        .collect()
}

/// Income and units per user, ordered by label. Sales without an owner are skipped.
pub fn user_performance(records: &[SaleRecord]) -> Vec<UserPerformance> {
    records
        .iter()
        .filter_map(|r| label(r.user_label.as_deref()).map(|name| (name, r)))
        .fold(
            BTreeMap::<&str, (Decimal, i64)>::new(),
            |mut acc, (name, record)| {
                let entry = acc.entry(name).or_default();
                entry.0 += record.income;
                entry.1 += record.units;
                acc
            },
        )
        .into_iter()
        .map(|(name, (income, units_sold))| UserPerformance {
            label: name.to_string(),
            income,
            units_sold,
        })
        .collect()
}
