//! Attendee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - List and count attendee rows per event.
//! - Provide the transactional unit the registration flow runs inside.
//!
//! # Invariants
//! - Attendee listing is deterministic: `id ASC`.
//! - Registration steps run inside one `BEGIN IMMEDIATE` transaction, which
//!   takes the database write lock up front; concurrent registrations
//!   serialize on it.
//! - The transaction commits only when the unit's closure returns `Ok`.

use crate::model::attendee::{Attendee, AttendeeId, NewAttendee};
use crate::model::event::EventId;
use crate::repo::{count_from_db, ensure_connection_ready, Page, RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const ATTENDEE_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    event_id
FROM attendees";

/// Store operations available to the registration flow inside its
/// transaction. Each call observes the transaction's own writes.
pub trait RegistrationUnit {
    /// Returns the event's capacity, or `None` when the event is absent.
    fn event_capacity(&self, event_id: EventId) -> RepoResult<Option<u32>>;
    fn email_registered(&self, event_id: EventId, email: &str) -> RepoResult<bool>;
    fn count_attendees(&self, event_id: EventId) -> RepoResult<u64>;
    fn insert_attendee(&self, event_id: EventId, attendee: &NewAttendee) -> RepoResult<Attendee>;
}

/// Repository interface for attendee persistence.
pub trait AttendeeRepository {
    fn event_exists(&self, event_id: EventId) -> RepoResult<bool>;
    fn list_by_event(&self, event_id: EventId, page: Page) -> RepoResult<Vec<Attendee>>;
    fn count_by_event(&self, event_id: EventId) -> RepoResult<u64>;
    /// Runs `work` inside one atomic store transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back otherwise.
    fn with_registration_unit<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn RegistrationUnit) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed attendee repository.
pub struct SqliteAttendeeRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteAttendeeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["events", "attendees"])?;
        Ok(Self { conn })
    }
}

impl AttendeeRepository for SqliteAttendeeRepository<'_> {
    fn event_exists(&self, event_id: EventId) -> RepoResult<bool> {
        event_exists(self.conn, event_id)
    }

    fn list_by_event(&self, event_id: EventId, page: Page) -> RepoResult<Vec<Attendee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTENDEE_SELECT_SQL}
             WHERE event_id = ?1
             ORDER BY id ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;

        let mut rows = stmt.query(params![event_id, page.sql_limit(), page.sql_offset()])?;
        let mut attendees = Vec::new();
        while let Some(row) = rows.next()? {
            attendees.push(parse_attendee_row(row)?);
        }
        Ok(attendees)
    }

    fn count_by_event(&self, event_id: EventId) -> RepoResult<u64> {
        count_for_event(self.conn, event_id)
    }

    fn with_registration_unit<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn RegistrationUnit) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;

        let outcome = work(&SqliteRegistrationUnit { conn: &tx });
        match outcome {
            Ok(value) => {
                tx.commit().map_err(RepoError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=registration_rollback module=repo status=error error_code=rollback_failed error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }
}

struct SqliteRegistrationUnit<'tx> {
    conn: &'tx Connection,
}

impl RegistrationUnit for SqliteRegistrationUnit<'_> {
    fn event_capacity(&self, event_id: EventId) -> RepoResult<Option<u32>> {
        let capacity: Option<i64> = self
            .conn
            .query_row(
                "SELECT max_capacity FROM events WHERE id = ?1;",
                [event_id],
                |row| row.get(0),
            )
            .optional()?;

        capacity
            .map(|value| {
                u32::try_from(value).map_err(|_| {
                    RepoError::InvalidData(format!(
                        "invalid max_capacity `{value}` in events.max_capacity (id={event_id})"
                    ))
                })
            })
            .transpose()
    }

    fn email_registered(&self, event_id: EventId, email: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM attendees
                WHERE event_id = ?1 AND email = ?2
            );",
            params![event_id, email],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count_attendees(&self, event_id: EventId) -> RepoResult<u64> {
        count_for_event(self.conn, event_id)
    }

    fn insert_attendee(&self, event_id: EventId, attendee: &NewAttendee) -> RepoResult<Attendee> {
        self.conn.execute(
            "INSERT INTO attendees (name, email, event_id) VALUES (?1, ?2, ?3);",
            params![attendee.name.as_str(), attendee.email.as_str(), event_id],
        )?;
        let id: AttendeeId = self.conn.last_insert_rowid();

        Ok(Attendee {
            id,
            name: attendee.name.clone(),
            email: attendee.email.clone(),
            event_id,
        })
    }
}

fn event_exists(conn: &Connection, event_id: EventId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1);",
        [event_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn count_for_event(conn: &Connection, event_id: EventId) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM attendees WHERE event_id = ?1;",
        [event_id],
        |row| row.get(0),
    )?;
    count_from_db(count, "attendees count")
}

fn parse_attendee_row(row: &Row<'_>) -> RepoResult<Attendee> {
    Ok(Attendee {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        event_id: row.get("event_id")?,
    })
}
