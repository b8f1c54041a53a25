//! Event repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist validated events with UTC times and their source code.
//! - Read events together with a live attendee count.
//!
//! # Invariants
//! - Write paths call `EventRecord::validate()` before SQL mutations.
//! - Every read recomputes `attendee_count`; there is no cache.
//! - Listing is ordered by `start_time DESC, id ASC`.

use crate::model::event::{Event, EventId, EventRecord};
use crate::repo::{
    count_from_db, ensure_connection_ready, instant_from_db, instant_to_db, Page, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    e.id AS id,
    e.name AS name,
    e.location AS location,
    e.start_time AS start_time,
    e.end_time AS end_time,
    e.max_capacity AS max_capacity,
    e.timezone AS timezone,
    COUNT(a.id) AS attendee_count
FROM events e
LEFT JOIN attendees a ON a.event_id = e.id";

/// Query options for listing events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventListQuery {
    pub page: Page,
}

/// Repository interface for event persistence.
pub trait EventRepository {
    /// Inserts one event and returns it with `attendee_count = 0`.
    fn create_event(&self, record: &EventRecord) -> RepoResult<Event>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<Event>>;
    /// Deletes one event; attendees cascade.
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["events", "attendees"])?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, record: &EventRecord) -> RepoResult<Event> {
        record.validate()?;

        self.conn.execute(
            "INSERT INTO events (
                name,
                location,
                start_time,
                end_time,
                max_capacity,
                timezone
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                record.name.as_str(),
                record.location.as_str(),
                instant_to_db(record.start_time),
                instant_to_db(record.end_time),
                record.max_capacity,
                record.timezone.as_str(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        // Read back so the returned times carry the store's precision.
        self.get_event(id)?
            .ok_or(RepoError::NotFound { entity: "event", id })
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE e.id = ?1
             GROUP BY e.id;"
        ))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }
        Ok(None)
    }

    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             GROUP BY e.id
             ORDER BY e.start_time DESC, e.id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;

        let mut rows = stmt.query(params![query.page.sql_limit(), query.page.sql_offset()])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "event", id });
        }
        Ok(())
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let id: EventId = row.get("id")?;

    let max_capacity_raw: i64 = row.get("max_capacity")?;
    let max_capacity = u32::try_from(max_capacity_raw)
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid max_capacity `{max_capacity_raw}` in events.max_capacity (id={id})"
            ))
        })?;

    let start_time = instant_from_db(row.get("start_time")?, "events.start_time")?;
    let end_time = instant_from_db(row.get("end_time")?, "events.end_time")?;
    if start_time >= end_time {
        return Err(RepoError::InvalidData(format!(
            "events.start_time is not before events.end_time (id={id})"
        )));
    }

    Ok(Event {
        id,
        name: row.get("name")?,
        location: row.get("location")?,
        start_time,
        end_time,
        max_capacity,
        timezone: row.get("timezone")?,
        attendee_count: count_from_db(row.get("attendee_count")?, "attendee_count")?,
    })
}
