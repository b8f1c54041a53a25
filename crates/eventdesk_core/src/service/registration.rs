//! Attendee registration flow.
//!
//! # Responsibility
//! - Run the lookup, duplicate, capacity and insert steps in fixed order.
//!
//! # Invariants
//! - Duplicate email is checked before capacity, so a duplicate at full
//!   capacity reports `DuplicateRegistration`.
//! - No step runs after the first failure; the caller's transaction rolls
//!   back on any `Err`.

use crate::model::attendee::{Attendee, NewAttendee};
use crate::model::event::EventId;
use crate::repo::attendee_repo::RegistrationUnit;
use crate::service::attendee_service::RegistrationError;

/// Executes one registration attempt against a transactional unit.
pub fn register_in_unit(
    unit: &dyn RegistrationUnit,
    event_id: EventId,
    attendee: &NewAttendee,
) -> Result<Attendee, RegistrationError> {
    let max_capacity = unit
        .event_capacity(event_id)?
        .ok_or(RegistrationError::EventNotFound(event_id))?;

    if unit.email_registered(event_id, attendee.email.as_str())? {
        return Err(RegistrationError::DuplicateRegistration {
            event_id,
            email: attendee.email.clone(),
        });
    }

    if unit.count_attendees(event_id)? >= u64::from(max_capacity) {
        return Err(RegistrationError::CapacityExceeded {
            event_id,
            max_capacity,
        });
    }

    unit.insert_attendee(event_id, attendee).map_err(Into::into)
}
