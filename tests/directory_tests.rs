use rattend::core::dashboard::SessionView;
use rattend::core::directory::NewEmployee;
use rattend::errors::AppError;
use rattend::models::user::AttendanceStatus;

mod common;
use common::{Harness, SITE_LAT, SITE_LNG, north_of, setup_acme};

fn employee<'a>(username: &'a str, site_id: Option<&'a str>) -> NewEmployee<'a> {
    NewEmployee {
        username,
        contact: "",
        site_id,
        passcode: None,
    }
}

fn sign_in_boss(h: &mut Harness) {
    h.app.login("boss", None).unwrap();
}

#[test]
fn test_site_ids_follow_company_sequence() {
    let mut h = Harness::new();
    let acme = setup_acme(&mut h);
    assert_eq!(acme.site_id, format!("{}-S1", acme.company_id));

    sign_in_boss(&mut h);
    h.stand_at(1000.0);
    let depot = h.app.create_site("Depot").unwrap();
    assert_eq!(depot.id, format!("{}-S2", acme.company_id));
    assert_eq!(depot.lat, north_of(SITE_LAT, 1000.0));

    let (_, company) = h.app.managed_company().unwrap();
    assert_eq!(company.sites.len(), 2);
}

#[test]
fn test_site_needs_usable_position() {
    let mut h = Harness::new();
    setup_acme(&mut h);
    sign_in_boss(&mut h);

    assert!(matches!(h.app.create_site("Nowhere"), Err(AppError::NoPosition)));

    h.app.use_manual_position(0.0, 0.0).unwrap();
    assert!(matches!(
        h.app.create_site("Null Island"),
        Err(AppError::InvalidCoordinates(_))
    ));

    assert!(matches!(
        h.app.use_manual_position(91.0, 0.0),
        Err(AppError::InvalidCoordinates(_))
    ));

    h.stand_at(0.0);
    assert!(matches!(
        h.app.create_site("   "),
        Err(AppError::MissingField(_))
    ));
}

#[test]
fn test_employees_cannot_touch_the_directory() {
    let mut h = Harness::new();
    let acme = setup_acme(&mut h);
    h.stand_at(0.0);
    h.app.login("bob", None).unwrap();

    assert!(matches!(
        h.app.create_site("Shed"),
        Err(AppError::NotAuthorized(_))
    ));
    assert!(matches!(
        h.app.update_site_location(&acme.site_id),
        Err(AppError::NotAuthorized(_))
    ));
    assert!(matches!(
        h.app.remove_employee("bob"),
        Err(AppError::NotAuthorized(_))
    ));
    assert!(matches!(
        h.app.managed_company(),
        Err(AppError::NotAuthorized(_))
    ));
}

#[test]
fn test_relocated_site_moves_the_fence() {
    let mut h = Harness::new();
    let acme = setup_acme(&mut h);
    sign_in_boss(&mut h);

    h.stand_at(500.0);
    let moved = h.app.update_site_location(&acme.site_id).unwrap();
    assert_eq!(moved.lat, north_of(SITE_LAT, 500.0));
    assert_eq!(moved.lng, SITE_LNG);

    assert!(matches!(
        h.app.update_site_location("ACME0000-S9"),
        Err(AppError::SiteMissing(_))
    ));

    // bob now has to be near the new spot
    h.stand_at(0.0);
    assert!(matches!(
        h.app.login("bob", None),
        Err(AppError::OutsideGeofence { .. })
    ));
    h.stand_at(480.0);
    h.app.login("bob", None).unwrap();
    h.app.check_in().unwrap();
}

#[test]
fn test_reassign_and_remove_employee() {
    let mut h = Harness::new();
    let acme = setup_acme(&mut h);
    sign_in_boss(&mut h);
    h.stand_at(2000.0);
    let depot = h.app.create_site("Depot").unwrap();

    let summary = h
        .app
        .register_employee(employee("BOB", Some(&depot.id)))
        .unwrap();
    assert_eq!(summary.username, "bob");
    assert_eq!(summary.assigned_site_id.as_deref(), Some(depot.id.as_str()));
    // contact is kept when the re-assignment leaves it blank
    assert_eq!(summary.contact, "bob@acme.test");

    let (_, company) = h.app.managed_company().unwrap();
    assert_eq!(company.employees.len(), 1);

    assert!(matches!(
        h.app.register_employee(employee("carol", Some("NOPE-S1"))),
        Err(AppError::SiteMissing(_))
    ));
    assert!(matches!(
        h.app.register_employee(employee("boss", None)),
        Err(AppError::DuplicateUser(_))
    ));

    h.app.remove_employee("Bob").unwrap();
    assert!(h.app.state().user("bob").is_none());
    let (_, company) = h.app.managed_company().unwrap();
    assert!(company.roster_entry("bob").is_none());
    assert!(company.site(&acme.site_id).is_some());

    assert!(matches!(
        h.app.remove_employee("bob"),
        Err(AppError::UnknownUser(_))
    ));
    assert!(matches!(
        h.app.remove_employee("boss"),
        Err(AppError::NotAuthorized(_))
    ));
}

#[test]
fn test_other_companies_are_off_limits() {
    let mut h = Harness::new();
    setup_acme(&mut h);

    let reg = h.app.register_company("Globex", "hank", "", None).unwrap();
    h.app.verify_account(&reg.code).unwrap();
    h.app.login("hank", None).unwrap();

    assert!(matches!(
        h.app.register_employee(employee("bob", None)),
        Err(AppError::UserBelongsElsewhere(_))
    ));
    assert!(matches!(
        h.app.remove_employee("bob"),
        Err(AppError::UserBelongsElsewhere(_))
    ));
    assert!(matches!(
        h.app.history_of(Some("bob")),
        Err(AppError::UserBelongsElsewhere(_))
    ));
}

#[test]
fn test_manager_dashboard_lists_roster() {
    let mut h = Harness::new();
    setup_acme(&mut h);
    h.stand_at(0.0);
    h.app.login("bob", None).unwrap();
    h.app.check_in().unwrap();

    h.app.login("boss", None).unwrap();
    let view = h.app.dashboard_view();
    let SessionView::Manager(manager) = view.session else {
        panic!("expected manager view");
    };
    assert_eq!(manager.company_name, "Acme");
    assert_eq!(manager.roster.len(), 1);
    let row = &manager.roster[0];
    assert_eq!(row.username, "bob");
    assert_eq!(row.site_name.as_deref(), Some("HQ"));
    // switching users logged bob out, so he is checked out again
    assert_eq!(row.status, AttendanceStatus::CheckedOut);
    assert!(row.verified);
    let (status, since) = h.app.status_of(Some("bob")).unwrap();
    assert_eq!(status, AttendanceStatus::CheckedOut);
    assert!(since.is_none());
    assert_eq!(manager.logs.len(), 2);
    assert_eq!(manager.logs[0].action, "Logout");
    assert_eq!(manager.logs[1].action, "Check-In @ HQ");
}
