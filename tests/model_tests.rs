use chrono::{Duration, TimeZone, Utc};
use rattend::models::company::{Company, MAX_COMPANY_LOGS};
use rattend::models::position::GeoPoint;
use rattend::models::state::AppState;
use rattend::models::user::{
    AttendanceStatus, EmployeeRecord, HistoryPoint, MAX_HISTORY_POINTS, UserRecord,
};

#[test]
fn test_history_keeps_fifty_most_recent_points() {
    let mut emp = EmployeeRecord::new("bob", "ACME1234", "", true);
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

    for i in 0..60 {
        emp.push_history(HistoryPoint {
            position: GeoPoint::new(45.0, 9.0 + i as f64 * 0.001),
            timestamp: start + Duration::minutes(i),
            site_id: Some("ACME1234-S1".into()),
        });
    }

    assert_eq!(emp.history.len(), MAX_HISTORY_POINTS);
    assert_eq!(emp.history[0].timestamp, start + Duration::minutes(10));
    assert_eq!(emp.history[49].timestamp, start + Duration::minutes(59));
    assert!(
        emp.history
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp)
    );
}

#[test]
fn test_company_logs_cap_newest_first() {
    let mut company = Company::new("Acme");
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

    for i in 0..25 {
        company.add_log("bob", format!("action {i}"), start + Duration::minutes(i));
    }

    assert_eq!(company.logs.len(), MAX_COMPANY_LOGS);
    assert_eq!(company.logs[0].action, "action 24");
    assert_eq!(company.logs[19].action, "action 5");
    assert!(company.logs.iter().all(|l| l.action != "action 4"));
}

#[test]
fn test_state_round_trip() {
    let blob = r#"{
        "companies": {
            "ACME1234": {
                "name": "Acme",
                "sites": [{"id": "ACME1234-S1", "name": "HQ", "lat": 45.0, "lng": 9.0}],
                "employees": [{"username": "bob", "contact": "b@x", "assignedSiteId": "ACME1234-S1"}],
                "logs": [{"username": "bob", "action": "Check-In @ HQ", "time": "2026-03-02T09:00:00Z"}]
            }
        },
        "users": {
            "boss": {"role": "manager", "username": "boss", "companyId": "ACME1234", "verified": true, "contact": ""},
            "bob": {"role": "employee", "username": "bob", "companyId": "ACME1234", "verified": true,
                    "contact": "b@x", "assignedSiteId": "ACME1234-S1", "status": "checked-in",
                    "checkInTime": "2026-03-02T09:00:00Z", "history": []}
        }
    }"#;

    let (state, report) = AppState::from_json(blob).unwrap();
    assert!(!report.changed());

    let (reloaded, report) = AppState::from_json(&state.to_json().unwrap()).unwrap();
    assert!(!report.changed());
    assert_eq!(reloaded, state);

    let bob = reloaded.employee("bob").unwrap();
    assert_eq!(bob.status(), AttendanceStatus::CheckedIn);
    assert_eq!(reloaded.company("ACME1234").unwrap().sites[0].name, "HQ");
}

#[test]
fn test_legacy_state_is_normalized_on_load() {
    let blob = r#"{
        "companies": {
            "ACME1234": {
                "name": "Acme",
                "employees": [{"username": "Alice"}],
                "logs": [{"username": "ALICE", "action": "Check-Out", "time": "2026-03-02T09:00:00Z"}]
            }
        },
        "users": {
            "Alice": {"role": "employee", "username": "Alice", "companyId": "ACME1234",
                      "status": "checked-in"},
            "Boss": {"role": "manager", "companyId": "ACME1234"}
        }
    }"#;

    let (state, report) = AppState::from_json(blob).unwrap();
    assert!(report.changed());
    assert_eq!(report.repaired_status, 1);

    let alice = state.employee("alice").unwrap();
    assert_eq!(alice.username, "alice");
    // missing verified flag means a legacy, already trusted account
    assert!(alice.verified);
    assert_eq!(alice.status(), AttendanceStatus::CheckedOut);
    assert!(alice.check_in_time().is_none());

    match state.user("boss").unwrap() {
        UserRecord::Manager(m) => assert_eq!(m.username, "boss"),
        other => panic!("expected manager, got {other:?}"),
    }

    let company = state.company("ACME1234").unwrap();
    assert_eq!(company.employees[0].username, "alice");
    assert_eq!(company.logs[0].username, "alice");
}

#[test]
fn test_lookup_is_case_insensitive() {
    let mut state = AppState::default();
    state.users.insert(
        "alice".into(),
        UserRecord::Employee(EmployeeRecord::new("Alice", "ACME1234", "", true)),
    );

    assert!(state.user("Alice").is_some());
    assert!(state.user("  ALICE ").is_some());
    assert_eq!(state.user("Alice"), state.user("alice"));
}
