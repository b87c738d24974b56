use serde::{Deserialize, Serialize};

/// How often a cost repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostFrequency {
    OneTime,
    Weekly,
    Monthly,
    Yearly,
}

impl CostFrequency {
    /// Code stored in the database
    pub fn code(&self) -> &'static str {
        match self {
            CostFrequency::OneTime => "ONE_TIME",
            CostFrequency::Weekly => "WEEKLY",
            CostFrequency::Monthly => "MONTHLY",
            CostFrequency::Yearly => "YEARLY",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ONE_TIME" => Some(CostFrequency::OneTime),
            "WEEKLY" => Some(CostFrequency::Weekly),
            "MONTHLY" => Some(CostFrequency::Monthly),
            "YEARLY" => Some(CostFrequency::Yearly),
            _ => None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, CostFrequency::OneTime)
    }
}

impl std::fmt::Display for CostFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
