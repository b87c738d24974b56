use anyhow::Result;
use async_trait::async_trait;
use contracts::dashboards::d100_finance::MonthlyAmount;
use sea_orm::{DatabaseBackend, DatabaseConnection, FromQueryResult, Statement};

use super::range::DateRange;
use super::source::{
    self, CategoryAmountRow, DatedAmountRow, ExpenseRecord, FinanceSource, SaleRecord, SaleRow,
};

/// Product price on its delivery date (revenue recognition)
const INCOME_SQL: &str = r#"
    SELECT substr(p.delivery_date, 1, 10) AS day,
           CAST(p.price AS TEXT) AS amount
    FROM a001_product p
    WHERE p.delivery_date IS NOT NULL
      AND substr(p.delivery_date, 1, 10) >= ? AND substr(p.delivery_date, 1, 10) <= ?
"#;

/// Money received on its payment date
const CASHFLOW_SQL: &str = r#"
    SELECT substr(pay.payment_date, 1, 10) AS day,
           CAST(pay.amount AS TEXT) AS amount
    FROM a002_payment pay
    WHERE substr(pay.payment_date, 1, 10) >= ? AND substr(pay.payment_date, 1, 10) <= ?
"#;

const EXPENSES_SQL: &str = r#"
    SELECT substr(c.date, 1, 10) AS day,
           CAST(c.amount AS TEXT) AS amount
    FROM a003_cost c
    WHERE substr(c.date, 1, 10) >= ? AND substr(c.date, 1, 10) <= ?
"#;

const EXPENSE_RECORDS_SQL: &str = r#"
    SELECT c.cost_type AS category,
           CAST(c.amount AS TEXT) AS amount
    FROM a003_cost c
    WHERE substr(c.date, 1, 10) >= ? AND substr(c.date, 1, 10) <= ?
"#;

/// Delivered products with the username of their owner
const USER_SALES_SQL: &str = r#"
    SELECT u.username AS user_label,
           p.quantity AS units,
           CAST(p.price AS TEXT) AS amount
    FROM a001_product p
    LEFT JOIN sys_users u ON u.id = p.owner_id
    WHERE p.delivery_date IS NOT NULL
      AND substr(p.delivery_date, 1, 10) >= ? AND substr(p.delivery_date, 1, 10) <= ?
"#;

/// `FinanceSource` backed by the application SQLite database
#[derive(Clone)]
pub struct SqliteFinanceSource {
    db: DatabaseConnection,
}

impl SqliteFinanceSource {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Source over the process-wide connection
    pub fn from_global() -> Self {
        Self::new(crate::shared::data::db::get_connection().clone())
    }

    async fn fetch<T: FromQueryResult>(&self, sql: &str, range: &DateRange) -> Result<Vec<T>> {
        let (from, to) = range.as_sql_bounds();
        let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, [from.into(), to.into()]);
        Ok(T::find_by_statement(stmt).all(&self.db).await?)
    }
}

#[async_trait]
impl FinanceSource for SqliteFinanceSource {
    async fn income_by_month(&self, range: &DateRange) -> Result<Vec<MonthlyAmount>> {
        let rows = self.fetch::<DatedAmountRow>(INCOME_SQL, range).await?;
        source::monthly_totals(rows)
    }

    async fn cashflow_by_month(&self, range: &DateRange) -> Result<Vec<MonthlyAmount>> {
        let rows = self.fetch::<DatedAmountRow>(CASHFLOW_SQL, range).await?;
        source::monthly_totals(rows)
    }

    async fn expenses_by_month(&self, range: &DateRange) -> Result<Vec<MonthlyAmount>> {
        let rows = self.fetch::<DatedAmountRow>(EXPENSES_SQL, range).await?;
        source::monthly_totals(rows)
    }

    async fn expense_records(&self, range: &DateRange) -> Result<Vec<ExpenseRecord>> {
        let rows = self.fetch::<CategoryAmountRow>(EXPENSE_RECORDS_SQL, range).await?;
        source::expense_records(rows)
    }

    async fn user_sales(&self, range: &DateRange) -> Result<Vec<SaleRecord>> {
        let rows = self.fetch::<SaleRow>(USER_SALES_SQL, range).await?;
        source::sale_records(rows)
    }
}
