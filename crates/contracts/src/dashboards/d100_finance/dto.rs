use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MonthKey;

/// Query for the finance dashboard.
///
/// `from`/`to` are kept as raw strings: an unparseable bound is not an error,
/// the range falls back to `month` and then to the current month.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinanceRequest {
    /// Month token in format "YYYY-MM"
    pub month: Option<String>,
    /// Start date in format "YYYY-MM-DD"
    pub from: Option<String>,
    /// End date in format "YYYY-MM-DD"
    pub to: Option<String>,
}

/// Query for the yearly finance dashboard.
///
/// `year` is a raw string so a missing or non-numeric value is reported
/// as a finance error rather than a query rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearlyFinanceRequest {
    /// Year in format "YYYY"
    pub year: Option<String>,
}

/// One point of a monthly series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAmount {
    pub month: MonthKey,
    pub total: Decimal,
}

impl MonthlyAmount {
    pub fn new(month: MonthKey, total: Decimal) -> Self {
        Self { month, total }
    }
}

/// Scalar totals over the whole resolved range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceKpis {
    /// Revenue recognized by delivery date
    pub income: Decimal,
    /// Money received by payment date
    pub cashflow: Decimal,
    /// Costs by expense date
    pub expenses: Decimal,
    /// income - expenses
    pub profit: Decimal,
}

/// Slice of the expense pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub name: String,
    pub value: Decimal,
}

/// Per-user sales bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPerformance {
    pub label: String,
    pub income: Decimal,
    pub units_sold: i64,
}

/// Response of the finance dashboard.
///
/// All four series share one month axis and can be zipped index-wise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResult {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub kpis: FinanceKpis,
    pub income_series: Vec<MonthlyAmount>,
    pub cashflow_series: Vec<MonthlyAmount>,
    pub expense_series: Vec<MonthlyAmount>,
    pub profit_series: Vec<MonthlyAmount>,
    pub category_breakdown: Vec<CategoryAmount>,
    pub user_stats: Vec<UserPerformance>,
}
