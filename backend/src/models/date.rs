//! Calendar date handling.
//!
//! Dates travel over the wire as `YYYY-MM-DD` with no time-of-day or
//! timezone component. An empty string means "no date".

use chrono::NaiveDate;

/// Wire format for calendar dates.
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// A non-empty date string that is not a valid `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date '{input}' (use YYYY-MM-DD)")]
pub struct DateParseError {
    pub input: String,
}

/// Parse a wire date.
///
/// Returns `Ok(None)` for an empty string. The input must round-trip the
/// exact format, so `1990-5-17` or `1990-05-17T00:00:00Z` are rejected.
pub fn parse_calendar_date(input: &str) -> Result<Option<NaiveDate>, DateParseError> {
    if input.is_empty() {
        return Ok(None);
    }

    let err = || DateParseError {
        input: input.to_string(),
    };

    let date = NaiveDate::parse_from_str(input, CALENDAR_DATE_FORMAT).map_err(|_| err())?;
    if date.format(CALENDAR_DATE_FORMAT).to_string() != input {
        return Err(err());
    }
    Ok(Some(date))
}

/// Parse an optional wire date, treating an absent value like an empty one.
pub fn parse_optional_calendar_date(
    input: Option<&str>,
) -> Result<Option<NaiveDate>, DateParseError> {
    match input {
        Some(s) => parse_calendar_date(s),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_date() {
        let date = parse_calendar_date("1990-05-17").unwrap().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(parse_calendar_date("").unwrap(), None);
        assert_eq!(parse_optional_calendar_date(None).unwrap(), None);
        assert_eq!(parse_optional_calendar_date(Some("")).unwrap(), None);
    }

    #[test]
    fn test_rejects_non_canonical_forms() {
        for bad in [
            "1990-5-17",
            "17-05-1990",
            "1990/05/17",
            "1990-05-17T00:00:00Z",
            " 1990-05-17",
            "1990-02-30",
            "yesterday",
        ] {
            let err = parse_calendar_date(bad).unwrap_err();
            assert_eq!(err.input, bad);
        }
    }

    #[test]
    fn test_serializes_back_to_wire_format() {
        let date = parse_calendar_date("2024-01-09").unwrap().unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-01-09\"");
    }
}
