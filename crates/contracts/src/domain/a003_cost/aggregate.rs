use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::CostFrequency;

/// ID type of an operating cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostId(pub Uuid);

impl CostId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_string(&self) -> String {
        self.0.to_string()
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(CostId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Operating cost of the workshop (aggregate a003)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cost {
    pub id: CostId,

    /// Expense category (RENT, MATERIALS, ...), shown in the breakdown chart
    pub category: Option<String>,

    /// Expense date
    pub date: NaiveDate,

    pub amount: Decimal,

    pub frequency: CostFrequency,

    pub reason: String,

    /// Template this cost was generated from
    pub generated_from: Option<CostId>,
}

impl Cost {
    /// Recurring costs act as templates for automatic copies
    pub fn is_template(&self) -> bool {
        self.frequency.is_recurring() && self.generated_from.is_none()
    }
}
