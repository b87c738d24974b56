use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use contracts::domain::a003_cost::{Cost, CostId};
use contracts::enums::CostFrequency;
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryFilter, Set};

use crate::shared::money::parse_amount;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a003_cost")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub cost_type: Option<String>,
    pub date: String,
    pub amount: String,
    pub frequency: String,
    pub reason: String,
    pub generated_from: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Cost {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self> {
        let id = CostId::from_string(&m.id).map_err(|e| anyhow!("cost {}: {}", m.id, e))?;
        let day = m.date.get(..10).unwrap_or(&m.date);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .with_context(|| format!("cost {}: invalid date '{}'", m.id, m.date))?;
        let frequency = CostFrequency::from_code(&m.frequency)
            .ok_or_else(|| anyhow!("cost {}: unknown frequency '{}'", m.id, m.frequency))?;
        let generated_from = m
            .generated_from
            .as_deref()
            .map(CostId::from_string)
            .transpose()
            .map_err(|e| anyhow!("cost {}: {}", m.id, e))?;

        Ok(Cost {
            id,
            category: m.cost_type,
            date,
            amount: parse_amount(Some(&m.amount))?,
            frequency,
            reason: m.reason,
            generated_from,
        })
    }
}

/// Recurring costs that were entered by hand, i.e. templates
pub async fn list_templates(db: &DatabaseConnection) -> Result<Vec<Cost>> {
    let models = Entity::find()
        .filter(Column::Frequency.ne(CostFrequency::OneTime.code()))
        .filter(Column::GeneratedFrom.is_null())
        .all(db)
        .await?;

    models.into_iter().map(Cost::try_from).collect()
}

/// Whether a copy of `template` dated `date` already exists
pub async fn exists_generated(db: &DatabaseConnection, template: CostId, date: NaiveDate) -> Result<bool> {
    let found = Entity::find()
        .filter(Column::GeneratedFrom.eq(template.as_string()))
        .filter(Column::Date.starts_with(&date.format("%Y-%m-%d").to_string()))
        .one(db)
        .await?;
    Ok(found.is_some())
}

pub async fn insert(db: &DatabaseConnection, cost: &Cost) -> Result<()> {
    let active_model = ActiveModel {
        id: Set(cost.id.as_string()),
        cost_type: Set(cost.category.clone()),
        date: Set(cost.date.format("%Y-%m-%d").to_string()),
        amount: Set(cost.amount.to_string()),
        frequency: Set(cost.frequency.code().to_string()),
        reason: Set(cost.reason.clone()),
        generated_from: Set(cost.generated_from.map(|id| id.as_string())),
        created_at: Set(Some(chrono::Utc::now().to_rfc3339())),
    };
    Entity::insert(active_model).exec_without_returning(db).await?;
    Ok(())
}
