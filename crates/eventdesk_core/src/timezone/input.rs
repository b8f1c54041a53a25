//! Caller-supplied event time input.

use super::TimezoneError;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use std::str::FromStr;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Event time as received from a caller.
///
/// `Local` values carry no zone and are interpreted in the event's timezone
/// code; `Fixed` values already pin an offset and convert directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    Local(NaiveDateTime),
    Fixed(DateTime<FixedOffset>),
}

impl TimeInput {
    /// Parses RFC 3339 (`2025-03-01T09:30:00+05:30`, `...Z`) or a naive
    /// `YYYY-MM-DDTHH:MM[:SS[.f]]` wall-clock value (space separator allowed).
    pub fn parse(value: &str) -> Result<Self, TimezoneError> {
        let trimmed = value.trim();
        if let Ok(fixed) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::Fixed(fixed));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .map(Self::Local)
            .ok_or_else(|| TimezoneError::InvalidDateTime(trimmed.to_string()))
    }
}

impl FromStr for TimeInput {
    type Err = TimezoneError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Local(value)
    }
}

impl From<DateTime<FixedOffset>> for TimeInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Fixed(value)
    }
}
