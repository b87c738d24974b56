//! Boundary between the data collaborators and the aggregation code.
//!
//! Raw rows come back from SQL with nullable columns and decimal strings.
//! Everything past this module works with non-optional `Decimal` values:
//! a NULL amount becomes zero here and nowhere else.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::dashboards::d100_finance::{MonthKey, MonthlyAmount};
use rust_decimal::Decimal;
use sea_orm::FromQueryResult;
use std::collections::BTreeMap;
use std::fmt;

use super::range::DateRange;
use crate::shared::money::{add_amount, parse_amount};

/// Which collaborator query a value (or a failure) came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Income,
    Cashflow,
    Expenses,
    ExpenseRecords,
    UserSales,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Income => "income",
            SourceKind::Cashflow => "cashflow",
            SourceKind::Expenses => "expenses",
            SourceKind::ExpenseRecords => "expense_records",
            SourceKind::UserSales => "user_sales",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cost row feeding the category chart
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub category: Option<String>,
    pub amount: Decimal,
}

/// One delivered product attributed to the user who owns it
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub user_label: Option<String>,
    pub units: i64,
    pub income: Decimal,
}

/// Read-only queries the finance dashboard depends on, all scoped to one range
#[async_trait]
pub trait FinanceSource: Send + Sync {
    /// Product prices grouped by delivery month
    async fn income_by_month(&self, range: &DateRange) -> Result<Vec<MonthlyAmount>>;

    /// Payments grouped by payment month
    async fn cashflow_by_month(&self, range: &DateRange) -> Result<Vec<MonthlyAmount>>;

    /// Costs grouped by expense month
    async fn expenses_by_month(&self, range: &DateRange) -> Result<Vec<MonthlyAmount>>;

    async fn expense_records(&self, range: &DateRange) -> Result<Vec<ExpenseRecord>>;

    async fn user_sales(&self, range: &DateRange) -> Result<Vec<SaleRecord>>;
}

/// Dated amount as it comes out of SQL
#[derive(Debug, Clone, FromQueryResult)]
pub struct DatedAmountRow {
    pub day: Option<String>,
    pub amount: Option<String>,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct CategoryAmountRow {
    pub category: Option<String>,
    pub amount: Option<String>,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct SaleRow {
    pub user_label: Option<String>,
    pub units: Option<i64>,
    pub amount: Option<String>,
}

/// Month of a `YYYY-MM-DD` (optionally followed by a time part) column
fn parse_month(raw: &str) -> Result<MonthKey> {
    let day = raw.get(..10).unwrap_or(raw);
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}'", raw))?;
    Ok(MonthKey::from_date(date))
}

/// Sum dated rows into one amount per month, ascending.
/// Rows without a date cannot be placed on the axis and are skipped.
pub fn monthly_totals(rows: Vec<DatedAmountRow>) -> Result<Vec<MonthlyAmount>> {
    let totals = rows.into_iter().try_fold(
        BTreeMap::<MonthKey, Decimal>::new(),
        |mut acc, row| -> Result<_> {
            let Some(day) = row.day.as_deref() else {
                tracing::warn!("Skipping row without date (amount {:?})", row.amount);
                return Ok(acc);
            };
            let month = parse_month(day)?;
            let amount = parse_amount(row.amount.as_deref())?;
            add_amount(acc.entry(month).or_default(), amount)
                .with_context(|| format!("month {}", month))?;
            Ok(acc)
        },
    )?;

    Ok(totals
        .into_iter()
        .map(|(month, total)| MonthlyAmount::new(month, total))
        .collect())
}

pub fn expense_records(rows: Vec<CategoryAmountRow>) -> Result<Vec<ExpenseRecord>> {
    rows.into_iter()
        .map(|row| {
            Ok(ExpenseRecord {
                category: row.category,
                amount: parse_amount(row.amount.as_deref())?,
            })
        })
        .collect()
}

pub fn sale_records(rows: Vec<SaleRow>) -> Result<Vec<SaleRecord>> {
    rows.into_iter()
        .map(|row| {
            Ok(SaleRecord {
                user_label: row.user_label,
                units: row.units.unwrap_or(0),
                income: parse_amount(row.amount.as_deref())?,
            })
        })
        .collect()
}
