//! CF-convention time axis decoding.
//!
//! Time coordinates are stored as offsets from a reference date, described by
//! a `units` attribute such as `"days since 2024-01-01"` or
//! `"seconds since 1970-01-01 00:00:00"`. Only calendars that agree with the
//! proleptic Gregorian calendar used by `chrono` are accepted.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{NetCdfError, NetCdfResult};

/// Calendars that map one-to-one onto `chrono`'s calendar for modern dates.
pub const SUPPORTED_CALENDARS: [&str; 3] = ["standard", "gregorian", "proleptic_gregorian"];

/// Unit of a CF time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => Some(Self::Seconds),
            "minutes" | "minute" | "mins" | "min" => Some(Self::Minutes),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(Self::Hours),
            "days" | "day" | "d" => Some(Self::Days),
            _ => None,
        }
    }

    fn millis(self) -> f64 {
        match self {
            Self::Seconds => 1_000.0,
            Self::Minutes => 60_000.0,
            Self::Hours => 3_600_000.0,
            Self::Days => 86_400_000.0,
        }
    }
}

/// A decoded `units` / `calendar` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfTimeAxis {
    pub unit: TimeUnit,
    pub reference: DateTime<Utc>,
}

impl CfTimeAxis {
    /// Parse a `units` attribute and an optional `calendar` attribute.
    pub fn parse(units: &str, calendar: Option<&str>) -> NetCdfResult<Self> {
        if let Some(calendar) = calendar {
            let normalized = calendar.trim().to_ascii_lowercase();
            if !SUPPORTED_CALENDARS.contains(&normalized.as_str()) {
                return Err(NetCdfError::UnsupportedCalendar(calendar.to_string()));
            }
        }

        let unsupported = || NetCdfError::UnsupportedTimeUnits(units.to_string());

        let mut parts = units.trim().splitn(3, char::is_whitespace);
        let unit = parts.next().and_then(TimeUnit::parse).ok_or_else(unsupported)?;
        if !parts.next().is_some_and(|word| word.eq_ignore_ascii_case("since")) {
            return Err(unsupported());
        }
        let reference = parts
            .next()
            .and_then(|s| parse_reference(s.trim()))
            .ok_or_else(unsupported)?;

        Ok(Self { unit, reference })
    }

    /// Convert one offset into a timestamp.
    pub fn decode(&self, offset: f64) -> NetCdfResult<DateTime<Utc>> {
        if !offset.is_finite() {
            return Err(NetCdfError::invalid(format!("time value {} is not finite", offset)));
        }
        let millis = (offset * self.unit.millis()).round();
        if millis.abs() > i64::MAX as f64 {
            return Err(NetCdfError::invalid(format!("time value {} overflows", offset)));
        }
        self.reference
            .checked_add_signed(Duration::milliseconds(millis as i64))
            .ok_or_else(|| NetCdfError::invalid(format!("time value {} overflows", offset)))
    }

    pub fn decode_all(&self, offsets: &[f64]) -> NetCdfResult<Vec<DateTime<Utc>>> {
        offsets.iter().map(|&offset| self.decode(offset)).collect()
    }
}

/// Parse the reference date of a `units` string.
///
/// Accepts `YYYY-MM-DD`, optionally followed by a clock time separated by a
/// space or `T`, and an optional `Z`/`UTC` suffix.
fn parse_reference(s: &str) -> Option<DateTime<Utc>> {
    let s = s
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim()
        .replacen('T', " ", 1);

    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&s, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    let date = NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}
