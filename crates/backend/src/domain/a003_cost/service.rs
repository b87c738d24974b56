use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use contracts::domain::a003_cost::{Cost, CostId};
use contracts::enums::CostFrequency;
use sea_orm::DatabaseConnection;

use super::repository;

const AUTO_REASON_SUFFIX: &str = " (Auto)";

/// Whether a recurring template produces a copy on `today`.
///
/// Only hand-entered recurring costs qualify, never on or before their own
/// date; a MONTHLY template on the 31st only fires in months that have one.
pub fn is_due(template: &Cost, today: NaiveDate) -> bool {
    if !template.is_template() || today <= template.date {
        return false;
    }
    match template.frequency {
        CostFrequency::OneTime => false,
        CostFrequency::Weekly => today.weekday() == template.date.weekday(),
        CostFrequency::Monthly => today.day() == template.date.day(),
        CostFrequency::Yearly => today.month() == template.date.month() && today.day() == template.date.day(),
    }
}

/// One-time copy of `template` dated `today`
pub fn make_copy(template: &Cost, today: NaiveDate) -> Cost {
    Cost {
        id: CostId::new_v4(),
        category: template.category.clone(),
        date: today,
        amount: template.amount,
        frequency: CostFrequency::OneTime,
        reason: format!("{}{}", template.reason, AUTO_REASON_SUFFIX),
        generated_from: Some(template.id),
    }
}

/// Insert today's copies of every due template, returns how many were created
pub async fn generate_recurring_costs(db: &DatabaseConnection, today: NaiveDate) -> Result<usize> {
    let templates = repository::list_templates(db).await?;
    let mut created = 0;

    for template in templates.iter().filter(|t| is_due(t, today)) {
        if repository::exists_generated(db, template.id, today).await? {
            tracing::debug!("Recurring cost {} already generated for {}", template.id.as_string(), today);
            continue;
        }
        repository::insert(db, &make_copy(template, today)).await?;
        tracing::info!(
            "Generated {} cost '{}' for {}",
            template.frequency,
            template.reason,
            today
        );
        created += 1;
    }

    Ok(created)
}
