//! Timezone directory for event time storage and display.
//!
//! # Responsibility
//! - Map the closed set of short timezone codes to IANA zones.
//! - Convert wall-clock or offset-carrying input to UTC for storage.
//! - Convert stored UTC instants back for display.
//!
//! # Invariants
//! - Only codes in [`SupportedZone::ALL`] are accepted; matching is exact.
//! - Listing order is the fixed enumeration order of `SupportedZone::ALL`.

mod directory;
mod input;

pub use directory::{
    describe, describe_at, format_local, from_utc, is_supported, list_all, now_in, resolve,
    to_utc, SupportedZone, TimezoneInfo, DEFAULT_TIMEZONE_CODE,
};
pub use input::TimeInput;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from timezone resolution and conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimezoneError {
    /// Code is not part of the supported set.
    UnsupportedTimezone(String),
    /// Input text is not a recognized date-time format.
    InvalidDateTime(String),
}

impl Display for TimezoneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedTimezone(code) => write!(f, "unsupported timezone: {code}"),
            Self::InvalidDateTime(value) => write!(f, "invalid date-time value: `{value}`"),
        }
    }
}

impl Error for TimezoneError {}
