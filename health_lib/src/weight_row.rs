use serde::{Deserialize, Serialize};
use stack_string::{format_sstr, StackString};
use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};

use crate::errors::HealthError as Error;

pub const DATE_HEADER: &str = "Date";
pub const WEIGHT_HEADER: &str = "Weight";

/// `YYYY-MM-DD HH:MM:SS +ZZZZ`, the layout Apple Health uses for `startDate`.
pub const HEALTH_DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
);

/// One line of the intermediate csv file, both columns kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightRow {
    #[serde(rename = "Date")]
    pub timestamp: StackString,
    #[serde(rename = "Weight")]
    pub weight: StackString,
}

impl WeightRow {
    pub fn new(timestamp: impl Into<StackString>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            weight: format_weight(value),
        }
    }

    /// # Errors
    /// Return error if the timestamp doesn't match `HEALTH_DATE_FORMAT`
    pub fn parse_timestamp(&self) -> Result<OffsetDateTime, Error> {
        parse_health_timestamp(self.timestamp.as_str())
    }

    /// `None` when the weight column isn't a finite number.
    #[must_use]
    pub fn parse_weight(&self) -> Option<f64> {
        self.weight
            .as_str()
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
    }
}

/// Six fractional digits, matching printf `%f`.
#[must_use]
pub fn format_weight(value: f64) -> StackString {
    format_sstr!("{value:.6}")
}

/// # Errors
/// Return error if the timestamp doesn't match `HEALTH_DATE_FORMAT`
pub fn parse_health_timestamp(timestamp: &str) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::parse(timestamp, HEALTH_DATE_FORMAT).map_err(Into::into)
}

/// # Errors
/// Return error if the timestamp is outside the range of an `i64` in
/// nanoseconds
pub fn timestamp_nanos(datetime: OffsetDateTime) -> Result<i64, Error> {
    datetime
        .unix_timestamp_nanos()
        .try_into()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use time::macros::datetime;

    use crate::{
        errors::HealthError,
        weight_row::{format_weight, parse_health_timestamp, timestamp_nanos, WeightRow},
    };

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(70.5).as_str(), "70.500000");
        assert_eq!(format_weight(80.0).as_str(), "80.000000");
        assert_eq!(format_weight(65.123_456_7).as_str(), "65.123457");
    }

    #[test]
    fn test_parse_health_timestamp() {
        let dt = parse_health_timestamp("2023-01-01 08:00:00 +0000").unwrap();
        assert_eq!(dt, datetime!(2023-01-01 08:00:00 UTC));
        let dt = parse_health_timestamp("2023-01-01 10:00:00 +0200").unwrap();
        assert_eq!(dt, datetime!(2023-01-01 08:00:00 UTC));
        let dt = parse_health_timestamp("2022-12-31 19:30:00 -0500").unwrap();
        assert_eq!(dt, datetime!(2023-01-01 00:30:00 UTC));
    }

    #[test]
    fn test_parse_health_timestamp_rejects_other_layouts() {
        for bad in [
            "2023-01-01T08:00:00Z",
            "2023-01-01 08:00:00",
            "01/01/2023 08:00:00 +0000",
            "not a date",
            "",
        ] {
            let err = parse_health_timestamp(bad).unwrap_err();
            assert!(matches!(err, HealthError::TimeParseError(_)), "{bad}");
        }
    }

    #[test]
    fn test_timestamp_nanos() {
        let dt = parse_health_timestamp("2023-01-01 08:00:00 +0000").unwrap();
        assert_eq!(timestamp_nanos(dt).unwrap(), 1_672_560_000_000_000_000);
    }

    #[test]
    fn test_weight_row() {
        let row = WeightRow::new("2023-01-01 08:00:00 +0000", 70.5);
        assert_eq!(row.weight.as_str(), "70.500000");
        assert_abs_diff_eq!(row.parse_weight().unwrap(), 70.5);

        let row = WeightRow {
            timestamp: "2023-01-01 08:00:00 +0000".into(),
            weight: "abc".into(),
        };
        assert!(row.parse_weight().is_none());
        assert!(row.parse_timestamp().is_ok());
    }

    #[test]
    fn test_parse_weight_rejects_non_finite() {
        for weight in ["NaN", "nan", "inf", "-inf", "infinity"] {
            let row = WeightRow {
                timestamp: "2023-01-01 08:00:00 +0000".into(),
                weight: weight.into(),
            };
            assert!(row.parse_weight().is_none(), "{weight}");
        }
    }
}
