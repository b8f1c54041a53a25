//! Core domain logic for EventDesk.
//! This crate is the single source of truth for scheduling and registration
//! invariants.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod timezone;

pub use app::EventDesk;
pub use config::{ConfigError, EventDeskConfig};
pub use db::{bootstrap_store, HealthState, Store, StoreHealth, StoreStatus};
pub use error::ErrorKind;
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::attendee::{Attendee, AttendeeId, AttendeeValidationError, NewAttendee};
pub use model::event::{
    Event, EventId, EventValidationError, EventWithAttendees, LocalizedEvent, NewEvent,
};
pub use repo::{Page, RepoError, RepoResult};
pub use service::attendee_service::{AttendeeService, RegistrationError};
pub use service::event_service::{EventService, EventServiceError};
pub use timezone::{SupportedZone, TimeInput, TimezoneError, TimezoneInfo, DEFAULT_TIMEZONE_CODE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
