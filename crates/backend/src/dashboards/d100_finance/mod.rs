//! Finance dashboard: income, cashflow, expenses and profit over a date range.
//!
//! `range` resolves request parameters, `repository` fetches the five inputs,
//! `aligner` puts the monthly series on one axis, `kpi` and `breakdown` derive
//! totals and charts, and `composer` builds the response.

pub mod aligner;
pub mod breakdown;
pub mod composer;
pub mod error;
pub mod kpi;
pub mod range;
pub mod repository;
pub mod service;
pub mod source;

pub use error::FinanceError;
pub use repository::SqliteFinanceSource;
pub use source::FinanceSource;
