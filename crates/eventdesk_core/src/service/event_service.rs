//! Event use-case service.
//!
//! # Responsibility
//! - Validate creation input and convert authored times to UTC.
//! - Provide event reads, listing, localized display and deletion.
//!
//! # Invariants
//! - Validation and timezone errors are raised before any store mutation.
//! - Creation reports the time range first, then capacity, then timezone.
//! - Localized reads validate the timezone code before reading the store.
//! - Stored instants are truncated to millisecond precision up front, so the
//!   range check sees exactly what the store keeps.

use crate::db::DbError;
use crate::error::ErrorKind;
use crate::model::event::{
    checked_capacity, Event, EventId, EventRecord, EventValidationError, LocalizedEvent, NewEvent,
};
use crate::repo::event_repo::{EventListQuery, EventRepository};
use crate::repo::{Page, RepoError};
use crate::timezone::{self, SupportedZone, TimeInput, TimezoneError};
use chrono::{DateTime, SubsecRound, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for event use-cases.
#[derive(Debug)]
pub enum EventServiceError {
    /// Creation input violates an event invariant.
    Validation(EventValidationError),
    /// Timezone code unsupported.
    Timezone(TimezoneError),
    /// Target event does not exist.
    EventNotFound(EventId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl EventServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Timezone(_) => ErrorKind::Validation,
            Self::EventNotFound(_) => ErrorKind::NotFound,
            Self::Repo(_) => ErrorKind::Infrastructure,
        }
    }
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Timezone(err) => write!(f, "{err}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Timezone(err) => Some(err),
            Self::EventNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "event", id } => Self::EventNotFound(id),
            RepoError::InvalidEvent(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for EventServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<EventValidationError> for EventServiceError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TimezoneError> for EventServiceError {
    fn from(value: TimezoneError) -> Self {
        Self::Timezone(value)
    }
}

/// Event service facade over repository implementations.
pub struct EventService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> EventService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates, converts to UTC and persists one event.
    ///
    /// # Errors
    /// Checked in this order, first failure wins:
    /// - `Validation(InvalidTimeRange)` when start is not before end.
    /// - `Validation(NonPositiveCapacity)` for capacity <= 0.
    /// - `Timezone(UnsupportedTimezone)` for unknown codes.
    pub fn create_event(&self, input: &NewEvent) -> Result<Event, EventServiceError> {
        ensure_ordered(&input.start_time, &input.end_time, input.timezone.as_str())?;
        let max_capacity = checked_capacity(input.max_capacity)?;
        let zone = SupportedZone::from_code(input.timezone.as_str())
            .ok_or_else(|| TimezoneError::UnsupportedTimezone(input.timezone.clone()))?;

        let record = EventRecord {
            name: input.name.trim().to_string(),
            location: input.location.trim().to_string(),
            start_time: stored_instant(&input.start_time, zone)?,
            end_time: stored_instant(&input.end_time, zone)?,
            max_capacity,
            timezone: zone.code().to_string(),
        };
        record.validate()?;

        let event = self.repo.create_event(&record)?;
        info!(
            "event=event_create module=service status=ok event_id={} timezone={} max_capacity={}",
            event.id, event.timezone, event.max_capacity
        );
        Ok(event)
    }

    /// Gets one event with its live attendee count.
    pub fn get_event(&self, id: EventId) -> Result<Event, EventServiceError> {
        self.repo
            .get_event(id)?
            .ok_or(EventServiceError::EventNotFound(id))
    }

    /// Lists events by start time, most future first.
    pub fn list_events(&self, page: Page) -> Result<Vec<Event>, EventServiceError> {
        self.repo
            .list_events(&EventListQuery { page })
            .map_err(Into::into)
    }

    /// Gets one event with times rendered in the zone named by `code`.
    ///
    /// The code is checked first; an unsupported code performs no read.
    pub fn get_event_localized(
        &self,
        id: EventId,
        code: &str,
    ) -> Result<LocalizedEvent, EventServiceError> {
        let info = timezone::describe(code)?;
        let event = self.get_event(id)?;

        Ok(LocalizedEvent {
            start_time_local: timezone::format_local(event.start_time, code)?,
            end_time_local: timezone::format_local(event.end_time, code)?,
            timezone_display: info.display_name,
            event,
        })
    }

    /// Deletes one event; its attendees are removed by cascade.
    pub fn delete_event(&self, id: EventId) -> Result<(), EventServiceError> {
        self.repo.delete_event(id)?;
        info!("event=event_delete module=service status=ok event_id={id}");
        Ok(())
    }
}

/// Rejects `start >= end` ahead of the capacity and timezone checks.
///
/// Two wall-clock or two offset-carrying values compare directly. A mixed
/// pair needs the zone; with an unknown code the pair is left to the
/// timezone check.
fn ensure_ordered(
    start: &TimeInput,
    end: &TimeInput,
    code: &str,
) -> Result<(), EventValidationError> {
    let ordered = match (start, end) {
        (TimeInput::Local(start), TimeInput::Local(end)) => Some(start < end),
        (TimeInput::Fixed(start), TimeInput::Fixed(end)) => Some(start < end),
        _ => match (timezone::to_utc(start, code), timezone::to_utc(end, code)) {
            (Ok(start), Ok(end)) => Some(start < end),
            _ => None,
        },
    };

    if ordered == Some(false) {
        return Err(EventValidationError::InvalidTimeRange);
    }
    Ok(())
}

fn stored_instant(
    input: &TimeInput,
    zone: SupportedZone,
) -> Result<DateTime<Utc>, EventServiceError> {
    let instant = timezone::to_utc(input, zone.code())?;
    Ok(instant.trunc_subsecs(3))
}
