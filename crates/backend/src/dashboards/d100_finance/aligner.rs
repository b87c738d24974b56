use contracts::dashboards::d100_finance::{MonthKey, MonthlyAmount};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::range::DateRange;

/// Monthly values with possible gaps
pub type SparseSeries = BTreeMap<MonthKey, Decimal>;

/// One value per axis month, ascending, no gaps, no duplicates
pub type AlignedSeries = Vec<MonthlyAmount>;

/// Index monthly rows by month; duplicate months are summed
pub fn to_sparse(rows: &[MonthlyAmount]) -> SparseSeries {
    rows.iter().fold(SparseSeries::new(), |mut acc, row| {
        *acc.entry(row.month).or_default() += row.total;
        acc
    })
}

/// Every calendar month from `range.from` to `range.to`, inclusive
pub fn calendar_months(range: &DateRange) -> Vec<MonthKey> {
    months_between(range.first_month(), range.last_month())
}

/// Contiguous months covering the range and every month a series reports,
/// including ones outside the range
pub fn month_axis(range: &DateRange, series: &[SparseSeries]) -> Vec<MonthKey> {
    let reported = series.iter().flat_map(|s| s.keys().copied());
    let first = reported.clone().min().map_or(range.first_month(), |m| m.min(range.first_month()));
    let last = reported.max().map_or(range.last_month(), |m| m.max(range.last_month()));
    months_between(first, last)
}

fn months_between(first: MonthKey, last: MonthKey) -> Vec<MonthKey> {
    std::iter::successors(Some(first), |month| month.succ())
        .take_while(|month| *month <= last)
        .collect()
}

/// Put every series on one common month axis, zero-filling missing months.
///
/// All outputs have the same length and the same months in the same order.
pub fn align<const N: usize>(range: &DateRange, series: [SparseSeries; N]) -> [AlignedSeries; N] {
    let axis = month_axis(range, &series);
    series.map(|s| fill(&axis, &s))
}

fn fill(axis: &[MonthKey], series: &SparseSeries) -> AlignedSeries {
    axis.iter()
        .map(|month| MonthlyAmount::new(*month, series.get(month).copied().unwrap_or_default()))
        .collect()
}
