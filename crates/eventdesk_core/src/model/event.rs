//! Event domain model.
//!
//! # Invariants
//! - `start_time` strictly precedes `end_time`.
//! - `max_capacity` is positive.

use crate::model::attendee::Attendee;
use crate::timezone::{TimeInput, DEFAULT_TIMEZONE_CODE};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned event identifier.
pub type EventId = i64;

/// Persisted event with its live attendee count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: u32,
    /// Code the event was authored in.
    pub timezone: String,
    pub attendee_count: u64,
}

impl Event {
    /// Seats still open at read time.
    pub fn remaining_capacity(&self) -> u64 {
        u64::from(self.max_capacity).saturating_sub(self.attendee_count)
    }

    pub fn is_full(&self) -> bool {
        self.remaining_capacity() == 0
    }
}

/// Caller input for event creation, times not yet converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub start_time: TimeInput,
    pub end_time: TimeInput,
    /// Signed so that non-positive input can be reported instead of wrapped.
    pub max_capacity: i64,
    pub timezone: String,
}

impl NewEvent {
    /// Builds creation input in the default timezone.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        start_time: impl Into<TimeInput>,
        end_time: impl Into<TimeInput>,
        max_capacity: i64,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            max_capacity,
            timezone: DEFAULT_TIMEZONE_CODE.to_string(),
        }
    }

    pub fn in_timezone(mut self, code: impl Into<String>) -> Self {
        self.timezone = code.into();
        self
    }
}

/// Event row ready for insertion: validated, times in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub name: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: u32,
    pub timezone: String,
}

impl EventRecord {
    /// Checks the creation invariants on already-converted values.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.start_time >= self.end_time {
            return Err(EventValidationError::InvalidTimeRange);
        }
        if self.max_capacity == 0 {
            return Err(EventValidationError::NonPositiveCapacity(0));
        }
        Ok(())
    }
}

/// Converts signed caller capacity into the stored unsigned form.
pub fn checked_capacity(value: i64) -> Result<u32, EventValidationError> {
    if value <= 0 {
        return Err(EventValidationError::NonPositiveCapacity(value));
    }
    u32::try_from(value).map_err(|_| EventValidationError::CapacityTooLarge(value))
}

/// Event with its full attendee list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventWithAttendees {
    #[serde(flatten)]
    pub event: Event,
    pub attendees: Vec<Attendee>,
}

/// Event with times rendered in a requested timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub start_time_local: String,
    pub end_time_local: String,
    pub timezone_display: String,
}

/// Creation-time validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// Start is not strictly before end.
    InvalidTimeRange,
    NonPositiveCapacity(i64),
    CapacityTooLarge(i64),
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeRange => write!(f, "end time must be after start time"),
            Self::NonPositiveCapacity(value) => {
                write!(f, "max capacity must be greater than 0, got {value}")
            }
            Self::CapacityTooLarge(value) => {
                write!(f, "max capacity {value} exceeds supported maximum {}", u32::MAX)
            }
        }
    }
}

impl Error for EventValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(start_hour: u32, end_hour: u32, capacity: u32) -> EventRecord {
        EventRecord {
            name: "Rust meetup".to_string(),
            location: "Pune".to_string(),
            start_time: Utc.with_ymd_and_hms(2025, 5, 1, start_hour, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 5, 1, end_hour, 0, 0).unwrap(),
            max_capacity: capacity,
            timezone: "IST".to_string(),
        }
    }

    #[test]
    fn equal_start_and_end_is_invalid() {
        let err = record(10, 10, 5).validate().unwrap_err();
        assert!(matches!(err, EventValidationError::InvalidTimeRange));
    }

    #[test]
    fn reversed_range_is_invalid() {
        assert!(record(12, 10, 5).validate().is_err());
        assert!(record(10, 12, 5).validate().is_ok());
    }

    #[test]
    fn blank_text_fields_are_accepted() {
        let mut blank = record(10, 12, 5);
        blank.name = String::new();
        blank.location = String::new();
        assert_eq!(blank.validate(), Ok(()));
    }

    #[test]
    fn capacity_must_be_positive_and_fit() {
        assert_eq!(
            checked_capacity(0),
            Err(EventValidationError::NonPositiveCapacity(0))
        );
        assert_eq!(
            checked_capacity(-3),
            Err(EventValidationError::NonPositiveCapacity(-3))
        );
        assert_eq!(checked_capacity(25), Ok(25));
        assert!(matches!(
            checked_capacity(i64::from(u32::MAX) + 1),
            Err(EventValidationError::CapacityTooLarge(_))
        ));
    }
}
