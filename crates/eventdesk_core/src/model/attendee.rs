//! Attendee domain model.
//!
//! # Invariants
//! - `(email, event_id)` is unique; enforced by the registration flow and
//!   backed by a unique index.
//! - Attendees are created only through registration and never updated.

use crate::model::event::EventId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Store-assigned attendee identifier.
pub type AttendeeId = i64;

/// Persisted attendee registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub name: String,
    pub email: String,
    pub event_id: EventId,
}

/// Registration input. Construct with [`NewAttendee::new`] to normalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendee {
    pub name: String,
    pub email: String,
}

impl NewAttendee {
    /// Trims both fields; emails otherwise keep their case.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), AttendeeValidationError> {
        if self.name.trim().is_empty() {
            return Err(AttendeeValidationError::BlankName);
        }
        if !EMAIL_RE.is_match(self.email.as_str()) {
            return Err(AttendeeValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendeeValidationError {
    BlankName,
    InvalidEmail(String),
}

impl Display for AttendeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "attendee name must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid attendee email: `{value}`"),
        }
    }
}

impl Error for AttendeeValidationError {}
