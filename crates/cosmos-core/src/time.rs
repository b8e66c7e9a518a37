//! Timestamp and date parsing for stored rows.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{CosmosError, CosmosResult};

/// Parse an RFC 3339 timestamp column.
pub fn parse_timestamp(field: &'static str, value: &str) -> CosmosResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| CosmosError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

/// Parse an optional timestamp column; blank counts as absent.
pub fn parse_optional_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> CosmosResult<Option<DateTime<Utc>>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_timestamp(field, v).map(Some),
    }
}

/// Parse a date column. Accepts `YYYY-MM-DD` or a full timestamp, whose
/// UTC date is kept.
pub fn parse_date(field: &'static str, value: Option<&str>) -> CosmosResult<Option<NaiveDate>> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(v, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    parse_timestamp(field, v).map(|t| Some(t.date_naive()))
}

/// The instant a deadline date expires: midnight UTC at the start of that
/// day.
pub fn deadline_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
