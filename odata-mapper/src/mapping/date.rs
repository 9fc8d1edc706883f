//! OData v2 `datetime'...'` literal formatting with explicit time-zone control

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const LITERAL_PREFIX: &str = "datetime'";
const PATTERN_MILLIS: &str = "datetime'%Y-%m-%dT%H:%M:%S%.3f'";
const PATTERN_SECONDS: &str = "datetime'%Y-%m-%dT%H:%M:%S'";
const NAIVE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("unrecognized date/time value {0:?}")]
    Format(String),

    #[error("local time {0} does not exist in time zone {1}")]
    NonexistentLocalTime(NaiveDateTime, Tz),
}

/// Formatter for `datetime'yyyy-MM-ddTHH:mm:ss.SSS'` literals.
///
/// The wall-clock time written into the literal is the instant converted into
/// [`ODataDateFormat::time_zone`]. SAP gateways usually expect UTC, which is the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ODataDateFormat {
    time_zone: Tz,
    millis: bool,
}

impl Default for ODataDateFormat {
    fn default() -> Self {
        Self {
            time_zone: Tz::UTC,
            millis: true,
        }
    }
}

impl ODataDateFormat {
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            ..Self::default()
        }
    }

    /// Write or omit the `.SSS` fraction
    pub fn with_millis(mut self, millis: bool) -> Self {
        self.millis = millis;
        self
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn set_time_zone(&mut self, time_zone: Tz) {
        self.time_zone = time_zone;
    }

    pub fn millis(&self) -> bool {
        self.millis
    }

    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        self.format_in(instant, self.time_zone)
    }

    /// Format in a one-off time zone without changing the configured one
    pub fn format_in(&self, instant: &DateTime<Utc>, time_zone: Tz) -> String {
        let pattern = if self.millis {
            PATTERN_MILLIS
        } else {
            PATTERN_SECONDS
        };
        instant.with_timezone(&time_zone).format(pattern).to_string()
    }

    /// Parse a literal produced by [`format`](Self::format), reading the wall-clock
    /// time in the configured zone. The `datetime'...'` wrapper is optional.
    pub fn parse(&self, value: &str) -> Result<DateTime<Utc>, DateParseError> {
        let naive = parse_naive(strip_literal(value.trim()))
            .ok_or_else(|| DateParseError::Format(value.to_string()))?;
        self.time_zone
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or(DateParseError::NonexistentLocalTime(naive, self.time_zone))
    }
}

/// Lenient parser for field setters.
///
/// Accepts a `datetime'...'` literal or a bare `yyyy-MM-ddTHH:mm:ss[.fff]` value
/// (both read as UTC, which is what SAP gateways return in `d:` properties), or an
/// RFC 3339 timestamp with an explicit offset.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DateParseError> {
    let trimmed = value.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    parse_naive(strip_literal(trimmed))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DateParseError::Format(value.to_string()))
}

fn strip_literal(value: &str) -> &str {
    value
        .strip_prefix(LITERAL_PREFIX)
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(value)
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, NAIVE_PATTERN).ok()
}
