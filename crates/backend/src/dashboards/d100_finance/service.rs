use chrono::{DateTime, FixedOffset, Utc};
use contracts::dashboards::d100_finance::{DashboardResult, FinanceRequest, YearlyFinanceRequest};
use std::future::Future;

use super::aligner::{self, to_sparse};
use super::breakdown;
use super::composer::{self, DashboardParts};
use super::error::FinanceError;
use super::kpi;
use super::range::{self, DateRange};
use super::source::{FinanceSource, SourceKind};
use crate::shared::config;

/// Dashboard for a `month` / `from`+`to` request, current month by default
pub async fn get_finance(
    source: &dyn FinanceSource,
    request: &FinanceRequest,
) -> Result<DashboardResult, FinanceError> {
    let offset = config::get().finance.reference_offset();
    get_finance_at(source, request, offset, Utc::now()).await
}

/// Same as `get_finance` with an explicit clock
pub async fn get_finance_at(
    source: &dyn FinanceSource,
    request: &FinanceRequest,
    reference_offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<DashboardResult, FinanceError> {
    // Parameter errors are reported before anything is fetched
    let range = range::resolve(request, reference_offset, now)?;
    build_dashboard(source, range).await
}

/// Dashboard for Jan 1 .. Dec 31 of the requested year
pub async fn get_yearly_finance(
    source: &dyn FinanceSource,
    request: &YearlyFinanceRequest,
) -> Result<DashboardResult, FinanceError> {
    let year = range::parse_year(request.year.as_deref())?;
    let range = range::resolve_year(year)?;
    build_dashboard(source, range).await
}

/// Fetch all five inputs concurrently, then align and aggregate.
///
/// The first failing source aborts the whole dashboard.
pub async fn build_dashboard(
    source: &dyn FinanceSource,
    range: DateRange,
) -> Result<DashboardResult, FinanceError> {
    tracing::debug!("Building finance dashboard for {}..{}", range.from, range.to);

    let (income, cashflow, expenses, expense_records, sales) = tokio::try_join!(
        fetch(SourceKind::Income, source.income_by_month(&range)),
        fetch(SourceKind::Cashflow, source.cashflow_by_month(&range)),
        fetch(SourceKind::Expenses, source.expenses_by_month(&range)),
        fetch(SourceKind::ExpenseRecords, source.expense_records(&range)),
        fetch(SourceKind::UserSales, source.user_sales(&range)),
    )?;

    let [income, cashflow, expenses] = aligner::align(
        &range,
        [to_sparse(&income), to_sparse(&cashflow), to_sparse(&expenses)],
    );
    let kpis = kpi::compose(&income, &cashflow, &expenses);
    let profit = kpi::profit_series(&income, &expenses);

    tracing::debug!(
        "Finance dashboard: {} months, {} cost rows, {} sales",
        income.len(),
        expense_records.len(),
        sales.len()
    );

    Ok(composer::compose(DashboardParts {
        range,
        kpis,
        income,
        cashflow,
        expenses,
        profit,
        category_breakdown: breakdown::category_breakdown(&expense_records),
        user_stats: breakdown::user_performance(&sales),
    }))
}

async fn fetch<T, F>(kind: SourceKind, query: F) -> Result<T, FinanceError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    query.await.map_err(|e| {
        tracing::error!("Finance source '{}' failed: {:#}", kind, e);
        FinanceError::SourceUnavailable {
            kind,
            reason: format!("{:#}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d100_finance::source::{ExpenseRecord, SaleRecord};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use contracts::dashboards::d100_finance::{MonthKey, MonthlyAmount};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn year(raw: &str) -> YearlyFinanceRequest {
        YearlyFinanceRequest {
            year: Some(raw.to_string()),
        }
    }

    fn point(y: i32, m: u32, v: &str) -> MonthlyAmount {
        MonthlyAmount::new(MonthKey::new(y, m).unwrap(), dec(v))
    }

    /// In-memory source; every query returns its canned rows unfiltered
    #[derive(Default)]
    struct FakeSource {
        income: Vec<MonthlyAmount>,
        cashflow: Vec<MonthlyAmount>,
        expenses: Vec<MonthlyAmount>,
        records: Vec<ExpenseRecord>,
        sales: Vec<SaleRecord>,
        failing: Option<SourceKind>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn answer<T: Clone>(&self, kind: SourceKind, rows: &[T]) -> anyhow::Result<Vec<T>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failing {
                Some(failing) if failing == kind => Err(anyhow!("no such table")),
                _ => Ok(rows.to_vec()),
            }
        }
    }

    #[async_trait]
    impl FinanceSource for FakeSource {
        async fn income_by_month(&self, _: &DateRange) -> anyhow::Result<Vec<MonthlyAmount>> {
            self.answer(SourceKind::Income, &self.income)
        }

        async fn cashflow_by_month(&self, _: &DateRange) -> anyhow::Result<Vec<MonthlyAmount>> {
            self.answer(SourceKind::Cashflow, &self.cashflow)
        }

        async fn expenses_by_month(&self, _: &DateRange) -> anyhow::Result<Vec<MonthlyAmount>> {
            self.answer(SourceKind::Expenses, &self.expenses)
        }

        async fn expense_records(&self, _: &DateRange) -> anyhow::Result<Vec<ExpenseRecord>> {
            self.answer(SourceKind::ExpenseRecords, &self.records)
        }

        async fn user_sales(&self, _: &DateRange) -> anyhow::Result<Vec<SaleRecord>> {
            self.answer(SourceKind::UserSales, &self.sales)
        }
    }

    fn sample_source() -> FakeSource {
        FakeSource {
            income: vec![point(2024, 1, "1500"), point(2024, 3, "1000.50")],
            cashflow: vec![point(2024, 1, "1400.25")],
            expenses: vec![point(2024, 1, "300.10"), point(2024, 2, "750"), point(2024, 3, "0.90")],
            records: vec![
                ExpenseRecord { category: Some("RENT".to_string()), amount: dec("700") },
                ExpenseRecord { category: Some("MATERIALS".to_string()), amount: dec("300.10") },
                ExpenseRecord { category: None, amount: dec("50") },
                ExpenseRecord { category: Some("MATERIALS".to_string()), amount: dec("0.90") },
            ],
            sales: vec![
                SaleRecord { user_label: Some("marta".to_string()), units: 1, income: dec("1500") },
                SaleRecord { user_label: Some("juan".to_string()), units: 4, income: dec("800.50") },
            ],
            ..Default::default()
        }
    }

    fn utc_minus_3() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn quarter() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_series_share_one_axis() {
        let result = build_dashboard(&sample_source(), quarter()).await.unwrap();

        let axis: Vec<String> = result.income_series.iter().map(|p| p.month.to_string()).collect();
        assert_eq!(axis, vec!["2024-01", "2024-02", "2024-03"]);
        for series in [&result.cashflow_series, &result.expense_series, &result.profit_series] {
            let other: Vec<String> = series.iter().map(|p| p.month.to_string()).collect();
            assert_eq!(other, axis);
        }
    }

    #[tokio::test]
    async fn test_profit_and_kpis_are_consistent() {
        let result = build_dashboard(&sample_source(), quarter()).await.unwrap();

        for ((inc, exp), profit) in result
            .income_series
            .iter()
            .zip(&result.expense_series)
            .zip(&result.profit_series)
        {
            assert_eq!(profit.total, inc.total - exp.total);
        }
        assert_eq!(result.kpis.profit, result.kpis.income - result.kpis.expenses);
        assert_eq!(result.kpis.income, dec("2500.50"));
        assert_eq!(result.kpis.cashflow, dec("1400.25"));
        assert_eq!(result.kpis.expenses, dec("1051.00"));
    }

    #[tokio::test]
    async fn test_missing_months_are_zero() {
        let result = build_dashboard(&sample_source(), quarter()).await.unwrap();

        assert_eq!(result.income_series[1].total, Decimal::ZERO);
        assert_eq!(result.cashflow_series[2].total, Decimal::ZERO);
        assert_eq!(result.profit_series[1].total, dec("-750"));
    }

    #[tokio::test]
    async fn test_uncategorized_costs_count_in_kpi_only() {
        let result = build_dashboard(&sample_source(), quarter()).await.unwrap();

        let names: Vec<&str> = result.category_breakdown.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["MATERIALS", "RENT"]);
        let charted: Decimal = result.category_breakdown.iter().map(|c| c.value).sum();
        assert_eq!(charted, dec("1001.00"));
        assert_eq!(result.kpis.expenses - charted, dec("50"));
    }

    #[tokio::test]
    async fn test_empty_sources_yield_zero_dashboard() {
        let source = FakeSource::default();
        let result = get_yearly_finance(&source, &year("2023")).await.unwrap();

        assert_eq!(result.from, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(result.to, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(result.income_series.len(), 12);
        assert_eq!(result.profit_series.len(), 12);
        assert!(result.expense_series.iter().all(|p| p.total.is_zero()));
        assert!(result.kpis.profit.is_zero());
        assert!(result.category_breakdown.is_empty());
        assert!(result.user_stats.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_range_wins_over_month() {
        let request = FinanceRequest {
            month: Some("2024-06".to_string()),
            from: Some("2024-01-01".to_string()),
            to: Some("2024-01-31".to_string()),
        };
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();

        let result = get_finance_at(&FakeSource::default(), &request, utc_minus_3(), now)
            .await
            .unwrap();

        assert_eq!(result.from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(result.to, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[tokio::test]
    async fn test_default_is_current_reference_month() {
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();

        let result = get_finance_at(&FakeSource::default(), &FinanceRequest::default(), utc_minus_3(), now)
            .await
            .unwrap();

        assert_eq!(result.from, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(result.to, NaiveDate::from_ymd_opt(2024, 7, 31).unwrap());
        assert_eq!(result.income_series.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_month_fails_before_fetch() {
        let source = sample_source();
        let request = FinanceRequest {
            month: Some("2024-13".to_string()),
            ..Default::default()
        };

        let err = get_finance_at(&source, &request, utc_minus_3(), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, FinanceError::InvalidMonthFormat(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reversed_range_is_rejected() {
        let source = sample_source();
        let request = FinanceRequest {
            from: Some("2024-03-01".to_string()),
            to: Some("2024-01-01".to_string()),
            ..Default::default()
        };

        let err = get_finance_at(&source, &request, utc_minus_3(), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, FinanceError::InvalidRange { .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_source_aborts_dashboard() {
        let source = FakeSource {
            failing: Some(SourceKind::ExpenseRecords),
            ..sample_source()
        };

        let err = build_dashboard(&source, quarter()).await.unwrap_err();

        match err {
            FinanceError::SourceUnavailable { kind, reason } => {
                assert_eq!(kind, SourceKind::ExpenseRecords);
                assert!(reason.contains("no such table"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_year() {
        let source = FakeSource::default();
        let err = get_yearly_finance(&source, &year(&i32::MAX.to_string())).await.unwrap_err();
        assert!(matches!(err, FinanceError::InvalidYear(_)));

        let err = get_yearly_finance(&source, &year("abc")).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let err = get_yearly_finance(&source, &YearlyFinanceRequest::default()).await.unwrap_err();
        assert!(matches!(err, FinanceError::InvalidYear(_)));
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_json() {
        let source = sample_source();

        let first = build_dashboard(&source, quarter()).await.unwrap();
        let second = build_dashboard(&source, quarter()).await.unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
