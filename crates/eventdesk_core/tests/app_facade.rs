use chrono::NaiveDate;
use eventdesk_core::{
    ErrorKind, EventDesk, EventDeskConfig, EventServiceError, HealthState, NewEvent,
    RegistrationError, Store, TimezoneError,
};
use serde_json::Value;

fn bootstrapped() -> (tempfile::TempDir, EventDesk) {
    let dir = tempfile::tempdir().unwrap();
    let config = EventDeskConfig {
        database_path: dir.path().join("data").join("eventdesk.db"),
        ..EventDeskConfig::default()
    };
    let (desk, status) = EventDesk::bootstrap(&config);
    assert!(status.is_ready());
    (dir, desk)
}

fn conference() -> NewEvent {
    let day = NaiveDate::from_ymd_opt(2025, 9, 20).unwrap();
    NewEvent::new(
        "RustConf India",
        "Hyderabad",
        day.and_hms_opt(9, 0, 0).unwrap(),
        day.and_hms_opt(18, 0, 0).unwrap(),
        200,
    )
}

#[test]
fn event_with_attendees_lists_registrations_in_order() {
    let (_dir, desk) = bootstrapped();
    let event = desk.create_event(&conference()).unwrap();
    let first = desk
        .register_attendee(event.id, "Meera", "meera@example.com")
        .unwrap();
    let second = desk
        .register_attendee(event.id, "Kiran", "kiran@example.com")
        .unwrap();

    let detailed = desk.get_event_with_attendees(event.id).unwrap();
    assert_eq!(detailed.event.attendee_count, 2);
    assert_eq!(detailed.attendees, vec![first, second]);

    assert!(matches!(
        desk.get_event_with_attendees(event.id + 1).unwrap_err(),
        EventServiceError::EventNotFound(_)
    ));
}

#[test]
fn localized_event_serializes_flat() {
    let (_dir, desk) = bootstrapped();
    let event = desk.create_event(&conference()).unwrap();

    let localized = desk.get_event_localized(event.id, "UTC").unwrap();
    let json = serde_json::to_value(&localized).unwrap();

    assert_eq!(json["id"], Value::from(event.id));
    assert_eq!(json["name"], "RustConf India");
    assert_eq!(json["timezone"], "IST");
    assert_eq!(json["attendee_count"], 0);
    assert_eq!(json["start_time_local"], "2025-09-20 03:30:00 UTC");
    assert_eq!(json["end_time_local"], "2025-09-20 12:30:00 UTC");
    assert_eq!(json["timezone_display"], "UTC (UTC)");
}

#[test]
fn localized_lookup_validates_code_before_event() {
    let (_dir, desk) = bootstrapped();

    let err = desk.get_event_localized(999, "XYZ").unwrap_err();
    assert!(matches!(
        err,
        EventServiceError::Timezone(TimezoneError::UnsupportedTimezone(_))
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn supported_timezones_are_listed_in_directory_order() {
    let (_dir, desk) = bootstrapped();
    let zones = desk.list_supported_timezones();

    let codes: Vec<_> = zones.iter().map(|zone| zone.code).collect();
    assert_eq!(
        codes,
        vec!["UTC", "IST", "EST", "PST", "GMT", "CET", "JST", "AEST"]
    );
    let ist = &zones[1];
    assert_eq!(ist.timezone, "Asia/Kolkata");
    assert_eq!(ist.utc_offset, "+05:30");
    assert_eq!(ist.display_name, "IST (Asia/Kolkata)");
}

#[test]
fn delete_event_reports_missing_event() {
    let (_dir, desk) = bootstrapped();
    let event = desk.create_event(&conference()).unwrap();

    desk.delete_event(event.id).unwrap();
    let err = desk.delete_event(event.id).unwrap_err();
    assert!(matches!(err, EventServiceError::EventNotFound(id) if id == event.id));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(desk.list_events(0, None).unwrap().is_empty());
}

#[test]
fn health_serializes_with_snake_case_states() {
    let (_dir, desk) = bootstrapped();

    let report = desk.health();
    assert_eq!(report.overall_status, HealthState::Healthy);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["overall_status"], "healthy");
    assert_eq!(json["database"]["connected"], true);
    assert!(json["database"]["sqlite_version"].is_string());
}

#[test]
fn unmigrated_store_fails_as_infrastructure() {
    let dir = tempfile::tempdir().unwrap();
    let desk = EventDesk::new(Store::new(dir.path().join("raw.db")));

    let event_err = desk.list_events(0, None).unwrap_err();
    assert!(matches!(event_err, EventServiceError::Repo(_)));
    assert_eq!(event_err.kind(), ErrorKind::Infrastructure);

    let registration_err = desk.count_attendees(1).unwrap_err();
    assert!(matches!(registration_err, RegistrationError::Repo(_)));
    assert_eq!(registration_err.kind(), ErrorKind::Infrastructure);
}

#[test]
fn event_serializes_utc_times_as_rfc3339() {
    let (_dir, desk) = bootstrapped();
    let event = desk.create_event(&conference()).unwrap();

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["start_time"], "2025-09-20T03:30:00Z");
    assert_eq!(json["max_capacity"], 200);
}
