pub mod dto;
pub mod month_key;

pub use dto::*;
pub use month_key::{MonthKey, MonthKeyParseError};
