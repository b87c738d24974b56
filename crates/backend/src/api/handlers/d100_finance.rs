use axum::{extract::Query, Json};
use contracts::dashboards::d100_finance::{DashboardResult, FinanceRequest, YearlyFinanceRequest};

use crate::dashboards::d100_finance::{service, FinanceError, SqliteFinanceSource};

/// GET /api/finance?month=2024-03 or ?from=2024-01-01&to=2024-03-31
pub async fn get_finance(
    Query(request): Query<FinanceRequest>,
) -> Result<Json<DashboardResult>, FinanceError> {
    tracing::info!(
        "D100 Dashboard: Getting finance (month={:?}, from={:?}, to={:?})",
        request.month,
        request.from,
        request.to
    );

    let source = SqliteFinanceSource::from_global();
    match service::get_finance(&source, &request).await {
        Ok(result) => {
            tracing::info!(
                "D100 Dashboard: Returning {}..{} ({} months)",
                result.from,
                result.to,
                result.income_series.len()
            );
            Ok(Json(result))
        }
        Err(e) => {
            tracing::error!("D100 Dashboard: Failed to get finance: {}", e);
            Err(e)
        }
    }
}

/// GET /api/finance/yearly?year=2024
pub async fn get_yearly_finance(
    Query(request): Query<YearlyFinanceRequest>,
) -> Result<Json<DashboardResult>, FinanceError> {
    tracing::info!("D100 Dashboard: Getting yearly finance for {:?}", request.year);

    let source = SqliteFinanceSource::from_global();
    service::get_yearly_finance(&source, &request)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("D100 Dashboard: Failed to get yearly finance: {}", e);
            e
        })
}
