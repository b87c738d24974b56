use contracts::dashboards::d100_finance::{FinanceKpis, MonthlyAmount};
use rust_decimal::Decimal;

use super::aligner::AlignedSeries;

/// Sum of a series, accumulated in axis order
pub fn total(series: &[MonthlyAmount]) -> Decimal {
    series.iter().fold(Decimal::ZERO, |acc, point| acc + point.total)
}

pub fn compose(income: &[MonthlyAmount], cashflow: &[MonthlyAmount], expenses: &[MonthlyAmount]) -> FinanceKpis {
    let income = total(income);
    let expenses = total(expenses);
    FinanceKpis {
        income,
        cashflow: total(cashflow),
        expenses,
        profit: income - expenses,
    }
}

/// Per-month `income - expenses`. Both series must share one axis.
pub fn profit_series(income: &[MonthlyAmount], expenses: &[MonthlyAmount]) -> AlignedSeries {
    debug_assert_eq!(income.len(), expenses.len());
    income
        .iter()
        .zip(expenses)
        .map(|(inc, exp)| {
            debug_assert_eq!(inc.month, exp.month);
            MonthlyAmount::new(inc.month, inc.total - exp.total)
        })
        .collect()
}
