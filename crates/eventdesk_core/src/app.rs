//! Application facade used by front ends.
//!
//! # Responsibility
//! - Expose every event and registration use-case behind one handle.
//! - Open one store connection per call and release it on every exit path.
//!
//! # Invariants
//! - The facade holds no connection between calls.
//! - Pagination arguments are passed through unchanged; `limit = None`
//!   means unbounded.

use crate::config::EventDeskConfig;
use crate::db::{bootstrap_store, Store, StoreHealth, StoreStatus};
use crate::model::attendee::{Attendee, NewAttendee};
use crate::model::event::{Event, EventId, EventWithAttendees, LocalizedEvent, NewEvent};
use crate::repo::attendee_repo::{AttendeeRepository, SqliteAttendeeRepository};
use crate::repo::event_repo::SqliteEventRepository;
use crate::repo::Page;
use crate::service::attendee_service::{AttendeeService, RegistrationError};
use crate::service::event_service::{EventService, EventServiceError};
use crate::timezone::{self, TimezoneInfo};

/// Entry point for event scheduling and attendee registration.
#[derive(Debug, Clone)]
pub struct EventDesk {
    store: Store,
}

impl EventDesk {
    /// Wraps an existing store handle. The schema is assumed to be ensured.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Ensures the configured store at startup.
    ///
    /// A degraded store still yields a facade; calls fail with
    /// infrastructure errors until the store recovers.
    pub fn bootstrap(config: &EventDeskConfig) -> (Self, StoreStatus) {
        let (store, status) = bootstrap_store(config.database_path.clone());
        (Self::new(store), status)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn create_event(&self, input: &NewEvent) -> Result<Event, EventServiceError> {
        let conn = self.store.connect()?;
        EventService::new(SqliteEventRepository::try_new(&conn)?).create_event(input)
    }

    pub fn list_events(
        &self,
        offset: u32,
        limit: Option<u32>,
    ) -> Result<Vec<Event>, EventServiceError> {
        let conn = self.store.connect()?;
        EventService::new(SqliteEventRepository::try_new(&conn)?)
            .list_events(Page::new(offset, limit))
    }

    pub fn get_event(&self, id: EventId) -> Result<Event, EventServiceError> {
        let conn = self.store.connect()?;
        EventService::new(SqliteEventRepository::try_new(&conn)?).get_event(id)
    }

    /// Gets one event rendered in the zone named by `code`.
    pub fn get_event_localized(
        &self,
        id: EventId,
        code: &str,
    ) -> Result<LocalizedEvent, EventServiceError> {
        // Reject unknown codes before touching the store.
        timezone::resolve(code)?;
        let conn = self.store.connect()?;
        EventService::new(SqliteEventRepository::try_new(&conn)?).get_event_localized(id, code)
    }

    /// Gets one event together with all of its attendees, by id ascending.
    pub fn get_event_with_attendees(
        &self,
        id: EventId,
    ) -> Result<EventWithAttendees, EventServiceError> {
        let mut conn = self.store.connect()?;
        let event = EventService::new(SqliteEventRepository::try_new(&conn)?).get_event(id)?;
        let attendees =
            SqliteAttendeeRepository::try_new(&mut conn)?.list_by_event(id, Page::default())?;
        Ok(EventWithAttendees { event, attendees })
    }

    /// Deletes one event and, by cascade, its registrations.
    pub fn delete_event(&self, id: EventId) -> Result<(), EventServiceError> {
        let conn = self.store.connect()?;
        EventService::new(SqliteEventRepository::try_new(&conn)?).delete_event(id)
    }

    /// Registers one attendee. Name and email are trimmed before checks.
    pub fn register_attendee(
        &self,
        event_id: EventId,
        name: &str,
        email: &str,
    ) -> Result<Attendee, RegistrationError> {
        let mut conn = self.store.connect()?;
        AttendeeService::new(SqliteAttendeeRepository::try_new(&mut conn)?)
            .register_attendee(event_id, &NewAttendee::new(name, email))
    }

    pub fn list_attendees(
        &self,
        event_id: EventId,
        offset: u32,
        limit: Option<u32>,
    ) -> Result<Vec<Attendee>, RegistrationError> {
        let mut conn = self.store.connect()?;
        AttendeeService::new(SqliteAttendeeRepository::try_new(&mut conn)?)
            .list_attendees(event_id, Page::new(offset, limit))
    }

    pub fn count_attendees(&self, event_id: EventId) -> Result<u64, RegistrationError> {
        let mut conn = self.store.connect()?;
        AttendeeService::new(SqliteAttendeeRepository::try_new(&mut conn)?)
            .count_attendees(event_id)
    }

    /// Lists every supported timezone. Touches no store.
    pub fn list_supported_timezones(&self) -> Vec<TimezoneInfo> {
        timezone::list_all()
    }

    pub fn health(&self) -> StoreHealth {
        self.store.health()
    }
}
