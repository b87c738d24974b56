use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use contracts::dashboards::d100_finance::{FinanceRequest, MonthKey};

use super::error::FinanceError;

/// Inclusive date range of one dashboard request, `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, FinanceError> {
        if from > to {
            return Err(FinanceError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn for_month(month: MonthKey) -> Self {
        Self {
            from: month.first_day(),
            to: month.last_day(),
        }
    }

    pub fn first_month(&self) -> MonthKey {
        MonthKey::from_date(self.from)
    }

    pub fn last_month(&self) -> MonthKey {
        MonthKey::from_date(self.to)
    }

    /// Bounds as `YYYY-MM-DD` strings, the format dates are stored in
    pub fn as_sql_bounds(&self) -> (String, String) {
        (
            self.from.format("%Y-%m-%d").to_string(),
            self.to.format("%Y-%m-%d").to_string(),
        )
    }
}

/// Resolve request parameters into one range.
///
/// Precedence, first match wins:
/// 1. `from` and `to` both present and parseable
/// 2. non-blank `month` token
/// 3. current month in the reference offset
pub fn resolve(
    request: &FinanceRequest,
    reference_offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<DateRange, FinanceError> {
    let from = parse_date("from", request.from.as_deref());
    let to = parse_date("to", request.to.as_deref());
    if let (Some(from), Some(to)) = (from, to) {
        return DateRange::new(from, to);
    }

    if let Some(token) = request.month.as_deref().map(str::trim) {
        if !token.is_empty() {
            let month: MonthKey = token
                .parse()
                .map_err(|_| FinanceError::InvalidMonthFormat(token.to_string()))?;
            return Ok(DateRange::for_month(month));
        }
    }

    Ok(current_month(reference_offset, now))
}

/// Month containing `now` as seen from the reference offset, not the server zone
pub fn current_month(reference_offset: FixedOffset, now: DateTime<Utc>) -> DateRange {
    let local_today = now.with_timezone(&reference_offset).date_naive();
    DateRange::for_month(MonthKey::from_date(local_today))
}

/// Year query value; missing or non-numeric is an `InvalidYear`
pub fn parse_year(raw: Option<&str>) -> Result<i32, FinanceError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    raw.parse().map_err(|_| FinanceError::InvalidYear(raw.to_string()))
}

/// Jan 1 .. Dec 31 of `year`, independent of the precedence rules
pub fn resolve_year(year: i32) -> Result<DateRange, FinanceError> {
    let invalid = || FinanceError::InvalidYear(year.to_string());
    let from = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let to = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
    DateRange::new(from, to)
}

fn parse_date(name: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!("Ignoring unparseable '{}' date '{}': {}", name, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc_minus_3() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn request(month: Option<&str>, from: Option<&str>, to: Option<&str>) -> FinanceRequest {
        FinanceRequest {
            month: month.map(str::to_string),
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_explicit_range_wins_over_month() {
        let req = request(Some("2024-06"), Some("2024-01-01"), Some("2024-01-31"));
        let range = resolve(&req, utc_minus_3(), noon(2024, 7, 15)).unwrap();
        assert_eq!(range, DateRange { from: date(2024, 1, 1), to: date(2024, 1, 31) });
    }

    #[test]
    fn test_month_token() {
        let req = request(Some("2024-03"), None, None);
        let range = resolve(&req, utc_minus_3(), noon(2024, 7, 15)).unwrap();
        assert_eq!(range, DateRange { from: date(2024, 3, 1), to: date(2024, 3, 31) });
    }

    #[test]
    fn test_month_token_is_trimmed() {
        let req = request(Some(" 2024-02 "), None, None);
        let range = resolve(&req, utc_minus_3(), noon(2024, 7, 15)).unwrap();
        assert_eq!(range.to, date(2024, 2, 29));
    }

    #[test]
    fn test_invalid_month_token() {
        let req = request(Some("March"), None, None);
        let err = resolve(&req, utc_minus_3(), noon(2024, 7, 15)).unwrap_err();
        assert!(matches!(err, FinanceError::InvalidMonthFormat(ref t) if t == "March"));
    }

    #[test]
    fn test_default_is_current_month_in_reference_offset() {
        let range = resolve(&FinanceRequest::default(), utc_minus_3(), noon(2024, 7, 15)).unwrap();
        assert_eq!(range, DateRange { from: date(2024, 7, 1), to: date(2024, 7, 31) });
    }

    #[test]
    fn test_default_uses_reference_offset_not_utc() {
        // 02:00 UTC on Aug 1 is still Jul 31 at UTC-3
        let now = Utc.with_ymd_and_hms(2024, 8, 1, 2, 0, 0).unwrap();
        let range = current_month(utc_minus_3(), now);
        assert_eq!(range.from, date(2024, 7, 1));
    }

    #[test]
    fn test_blank_month_falls_through_to_default() {
        let req = request(Some("   "), None, None);
        let range = resolve(&req, utc_minus_3(), noon(2024, 7, 15)).unwrap();
        assert_eq!(range.from, date(2024, 7, 1));
    }

    #[test]
    fn test_single_bound_is_ignored() {
        let req = request(Some("2024-05"), Some("2024-01-01"), None);
        let range = resolve(&req, utc_minus_3(), noon(2024, 7, 15)).unwrap();
        assert_eq!(range.from, date(2024, 5, 1));
    }

    #[test]
    fn test_unparseable_bound_falls_through() {
        let req = request(Some("2024-05"), Some("01/01/2024"), Some("2024-01-31"));
        let range = resolve(&req, utc_minus_3(), noon(2024, 7, 15)).unwrap();
        assert_eq!(range.from, date(2024, 5, 1));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let req = request(None, Some("2024-02-01"), Some("2024-01-01"));
        let err = resolve(&req, utc_minus_3(), noon(2024, 7, 15)).unwrap_err();
        assert!(matches!(err, FinanceError::InvalidRange { .. }));
    }

    #[test]
    fn test_year_variant() {
        let range = resolve_year(2023).unwrap();
        assert_eq!(range, DateRange { from: date(2023, 1, 1), to: date(2023, 12, 31) });
        assert!(matches!(resolve_year(i32::MAX), Err(FinanceError::InvalidYear(_))));
    }

    #[test]
    fn test_parse_year_rejects_missing_and_garbage() {
        assert_eq!(parse_year(Some("2024")).unwrap(), 2024);
        assert_eq!(parse_year(Some(" 2023 ")).unwrap(), 2023);
        match parse_year(Some("abc")) {
            Err(FinanceError::InvalidYear(raw)) => assert_eq!(raw, "abc"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(parse_year(None), Err(FinanceError::InvalidYear(_))));
        assert!(matches!(parse_year(Some("")), Err(FinanceError::InvalidYear(_))));
    }
}
