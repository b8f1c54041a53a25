//! Attendee use-case service.
//!
//! # Responsibility
//! - Register attendees through the registration flow.
//! - Page and count attendees of an existing event.
//!
//! # Invariants
//! - Attendee input is validated before a transaction is opened.
//! - Listing and counting report `EventNotFound` for unknown events rather
//!   than an empty result.

use crate::db::DbError;
use crate::error::ErrorKind;
use crate::model::attendee::{Attendee, AttendeeValidationError, NewAttendee};
use crate::model::event::EventId;
use crate::repo::attendee_repo::AttendeeRepository;
use crate::repo::{Page, RepoError};
use crate::service::registration::register_in_unit;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for attendee use-cases.
#[derive(Debug)]
pub enum RegistrationError {
    /// Attendee input failed validation.
    InvalidAttendee(AttendeeValidationError),
    /// Target event does not exist.
    EventNotFound(EventId),
    /// Email already registered for this event.
    DuplicateRegistration { event_id: EventId, email: String },
    /// Event already holds `max_capacity` attendees.
    CapacityExceeded { event_id: EventId, max_capacity: u32 },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl RegistrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAttendee(_) => ErrorKind::Validation,
            Self::EventNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateRegistration { .. } | Self::CapacityExceeded { .. } => {
                ErrorKind::Conflict
            }
            Self::Repo(_) => ErrorKind::Infrastructure,
        }
    }
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAttendee(err) => write!(f, "{err}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::DuplicateRegistration { event_id, .. } => {
                write!(f, "email already registered for event {event_id}")
            }
            Self::CapacityExceeded {
                event_id,
                max_capacity,
            } => write!(
                f,
                "event {event_id} is at maximum capacity ({max_capacity})"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAttendee(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RegistrationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "event", id } => Self::EventNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for RegistrationError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<AttendeeValidationError> for RegistrationError {
    fn from(value: AttendeeValidationError) -> Self {
        Self::InvalidAttendee(value)
    }
}

/// Attendee service facade over repository implementations.
pub struct AttendeeService<R: AttendeeRepository> {
    repo: R,
}

impl<R: AttendeeRepository> AttendeeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers one attendee as a single atomic store unit.
    ///
    /// # Errors
    /// Checked in this order, first failure wins:
    /// `InvalidAttendee`, `EventNotFound`, `DuplicateRegistration`,
    /// `CapacityExceeded`.
    pub fn register_attendee(
        &mut self,
        event_id: EventId,
        attendee: &NewAttendee,
    ) -> Result<Attendee, RegistrationError> {
        attendee.validate()?;

        let registered = self
            .repo
            .with_registration_unit(|unit| register_in_unit(unit, event_id, attendee));

        match &registered {
            Ok(created) => info!(
                "event=attendee_register module=service status=ok event_id={} attendee_id={}",
                event_id, created.id
            ),
            Err(err) => info!(
                "event=attendee_register module=service status=rejected event_id={} error_kind={}",
                event_id,
                err.kind().as_str()
            ),
        }
        registered
    }

    /// Lists attendees of one event by id, ascending.
    pub fn list_attendees(
        &self,
        event_id: EventId,
        page: Page,
    ) -> Result<Vec<Attendee>, RegistrationError> {
        self.ensure_event_exists(event_id)?;
        self.repo
            .list_by_event(event_id, page)
            .map_err(Into::into)
    }

    /// Counts attendees of one event.
    pub fn count_attendees(&self, event_id: EventId) -> Result<u64, RegistrationError> {
        self.ensure_event_exists(event_id)?;
        self.repo.count_by_event(event_id).map_err(Into::into)
    }

    fn ensure_event_exists(&self, event_id: EventId) -> Result<(), RegistrationError> {
        if !self.repo.event_exists(event_id)? {
            return Err(RegistrationError::EventNotFound(event_id));
        }
        Ok(())
    }
}
