use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use cron::Schedule;
use sea_orm::DatabaseConnection;
use std::str::FromStr;
use tracing::{error, info, warn};

use crate::domain::a003_cost::service;

/// Background worker that generates copies of recurring costs.
///
/// The cron expression is evaluated in the workshop's reference offset,
/// and "today" for the generated costs is taken in that offset as well.
pub struct RecurringCostWorker {
    db: DatabaseConnection,
    schedule: Schedule,
    reference_offset: FixedOffset,
}

impl RecurringCostWorker {
    pub fn new(db: DatabaseConnection, cron_expr: &str, reference_offset: FixedOffset) -> Result<Self> {
        let schedule = Schedule::from_str(cron_expr)
            .with_context(|| format!("Invalid cron expression '{}'", cron_expr))?;
        Ok(Self {
            db,
            schedule,
            reference_offset,
        })
    }

    /// First fire time strictly after `after`
    pub fn next_run(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&self.reference_offset))
            .next()
            .map(|at| at.with_timezone(&Utc))
    }

    /// Runs one pass for the current reference-local day
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<usize> {
        let today = now.with_timezone(&self.reference_offset).date_naive();
        service::generate_recurring_costs(&self.db, today).await
    }

    pub async fn run_loop(&self) {
        info!("Recurring cost worker started");

        // Catch up on startup in case the process was down at fire time
        self.tick(Utc::now()).await;

        loop {
            let now = Utc::now();
            let Some(next) = self.next_run(now) else {
                warn!("Recurring cost schedule has no upcoming runs, worker stopped");
                return;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            info!("Next recurring cost run at {}", next.with_timezone(&self.reference_offset));
            tokio::time::sleep(wait).await;

            self.tick(Utc::now()).await;
        }
    }

    async fn tick(&self, now: DateTime<Utc>) {
        match self.run_once(now).await {
            Ok(0) => info!("No recurring costs due"),
            Ok(created) => info!("Generated {} recurring costs", created),
            Err(e) => error!("Recurring cost generation failed: {:#}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;
    use chrono::TimeZone;

    fn utc_minus_3() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[tokio::test]
    async fn test_next_run_in_reference_offset() {
        let worker = RecurringCostWorker::new(memory_connection().await, "0 0 1 * * *", utc_minus_3()).unwrap();

        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        let next = worker.next_run(now).unwrap();

        // 01:00 at UTC-3 is 04:00 UTC
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 7, 16, 4, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_invalid_cron_expression() {
        let result = RecurringCostWorker::new(memory_connection().await, "every day", utc_minus_3());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_once_on_empty_database() {
        let worker = RecurringCostWorker::new(memory_connection().await, "0 0 1 * * *", utc_minus_3()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 8, 1, 2, 0, 0).unwrap();
        assert_eq!(worker.run_once(now).await.unwrap(), 0);
    }
}
