use contracts::dashboards::d100_finance::{CategoryAmount, DashboardResult, FinanceKpis, UserPerformance};

use super::aligner::AlignedSeries;
use super::range::DateRange;

/// Everything the dashboard shows, already computed
#[derive(Debug, Clone)]
pub struct DashboardParts {
    pub range: DateRange,
    pub kpis: FinanceKpis,
    pub income: AlignedSeries,
    pub cashflow: AlignedSeries,
    pub expenses: AlignedSeries,
    pub profit: AlignedSeries,
    pub category_breakdown: Vec<CategoryAmount>,
    pub user_stats: Vec<UserPerformance>,
}

/// Place the parts into the response shape, no computation
pub fn compose(parts: DashboardParts) -> DashboardResult {
    DashboardResult {
        from: parts.range.from,
        to: parts.range.to,
        kpis: parts.kpis,
        income_series: parts.income,
        cashflow_series: parts.cashflow,
        expense_series: parts.expenses,
        profit_series: parts.profit,
        category_breakdown: parts.category_breakdown,
        user_stats: parts.user_stats,
    }
}
