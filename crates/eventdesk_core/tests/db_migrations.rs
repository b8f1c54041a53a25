use eventdesk_core::db::migrations::latest_version;
use eventdesk_core::db::{bootstrap_store, open_db, open_db_in_memory, DbError, StoreStatus};
use eventdesk_core::{HealthState, RepoError, Store};
use eventdesk_core::repo::event_repo::SqliteEventRepository;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "events");
    assert_table_exists(&conn, "attendees");
    assert_index_exists(&conn, "idx_events_start_time");
    assert_index_exists(&conn, "idx_attendees_event_id");
    assert_index_exists(&conn, "idx_attendees_email");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eventdesk.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "events");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_rows_that_break_event_invariants() {
    let conn = open_db_in_memory().unwrap();

    let zero_capacity = conn.execute(
        "INSERT INTO events (name, location, start_time, end_time, max_capacity)
         VALUES ('a', 'b', 1000, 2000, 0);",
        [],
    );
    assert!(zero_capacity.is_err());

    let empty_range = conn.execute(
        "INSERT INTO events (name, location, start_time, end_time, max_capacity)
         VALUES ('a', 'b', 2000, 2000, 5);",
        [],
    );
    assert!(empty_range.is_err());

    let orphan = conn.execute(
        "INSERT INTO attendees (name, email, event_id) VALUES ('n', 'n@x.com', 42);",
        [],
    );
    assert!(orphan.is_err());
}

#[test]
fn default_timezone_column_is_ist() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO events (name, location, start_time, end_time, max_capacity)
         VALUES ('a', 'b', 1000, 2000, 5);",
        [],
    )
    .unwrap();
    let timezone: String = conn
        .query_row("SELECT timezone FROM events;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(timezone, "IST");
}

#[test]
fn bootstrap_store_creates_parent_directory_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data").join("events.db");

    let (store, status) = bootstrap_store(&path);
    assert_eq!(status, StoreStatus::Ready);
    assert!(path.exists());

    let conn = store.connect().unwrap();
    assert_eq!(schema_version(&conn), latest_version());
}

#[test]
fn bootstrap_store_reports_degraded_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let (_store, status) = bootstrap_store(&path);
    match status {
        StoreStatus::Degraded { reason } => assert!(reason.contains("999")),
        StoreStatus::Ready => panic!("expected degraded store"),
    }
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path().join("raw.db"));

    let conn = store.connect().unwrap();
    let err = SqliteEventRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn health_reports_schema_state() {
    let dir = tempfile::tempdir().unwrap();

    let (ready, _) = bootstrap_store(dir.path().join("ready.db"));
    let healthy = ready.health();
    assert_eq!(healthy.overall_status, HealthState::Healthy);
    assert!(healthy.database.connected);
    assert_eq!(healthy.database.schema_version, Some(latest_version()));
    assert!(healthy.database.sqlite_version.is_some());
    assert!(healthy.database.error.is_none());

    let raw = Store::new(dir.path().join("raw.db"));
    let degraded = raw.health();
    assert_eq!(degraded.overall_status, HealthState::Degraded);
    assert_eq!(degraded.database.status, HealthState::Degraded);
    assert_eq!(degraded.database.schema_version, Some(0));
}

#[test]
fn health_never_fails_for_unreachable_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path().join("missing").join("dir").join("events.db"));

    let report = store.health();
    assert_eq!(report.overall_status, HealthState::Degraded);
    assert_eq!(report.database.status, HealthState::Unhealthy);
    assert!(!report.database.connected);
    assert!(report.database.error.is_some());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_master_entry(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_master_entry(conn, "index", index_name);
}

fn assert_master_entry(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
