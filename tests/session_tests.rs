use rattend::core::directory::NewEmployee;
use rattend::core::session::LoginOutcome;
use rattend::db::kv::{KvBackend, MemoryKv};
use rattend::errors::AppError;
use rattend::models::user::UserRecord;
use rattend::ui::NoticeLevel;

mod common;
use common::{Harness, SITE_LAT, SITE_LNG, setup_acme};

#[test]
fn test_wrong_code_keeps_pending_verification() {
    let mut h = Harness::new();
    let reg = h
        .app
        .register_company("Acme", "boss", "", Some("s3cret"))
        .unwrap();

    assert!(matches!(
        h.app.login("boss", Some("s3cret")),
        Err(AppError::NotVerified(_))
    ));

    let wrong = if reg.code == "000000" { "111111" } else { "000000" };
    assert!(matches!(
        h.app.verify_account(wrong),
        Err(AppError::VerificationFailed)
    ));
    assert_eq!(h.app.session().pending_code_for("boss"), Some(reg.code.as_str()));

    h.app.verify_account(&reg.code).unwrap();
    assert!(h.app.session().pending_verifications.is_empty());
    assert!(matches!(
        h.app.verify_account(&reg.code),
        Err(AppError::NothingToVerify)
    ));

    assert!(matches!(
        h.app.login("boss", Some("nope")),
        Err(AppError::BadCredentials)
    ));
    h.app.login("boss", Some("s3cret")).unwrap();
}

#[test]
fn test_username_is_case_insensitive() {
    let mut h = Harness::new();
    let reg = h.app.register_company("Acme", "Alice", "", None).unwrap();
    assert_eq!(reg.username, "alice");
    h.app.verify_account(&reg.code).unwrap();

    let outcome = h.app.login("alice", None).unwrap();
    assert!(matches!(outcome, LoginOutcome::SignedIn { ref username, .. } if username == "alice"));
    assert_eq!(h.app.state().users.len(), 1);
    assert_eq!(h.app.current_user(), h.app.state().user("ALICE"));

    assert!(matches!(
        h.app.register_company("Other", "ALICE", "", None),
        Err(AppError::DuplicateUser(_))
    ));
}

#[test]
fn test_missing_fields_change_nothing() {
    let mut h = Harness::new();
    assert!(matches!(
        h.app.register_company("  ", "boss", "", None),
        Err(AppError::MissingField(_))
    ));
    assert!(matches!(
        h.app.register_company("Acme", "", "", None),
        Err(AppError::MissingField(_))
    ));
    assert!(h.app.state().companies.is_empty());
    assert!(h.app.session().pending_verifications.is_empty());
}

#[test]
fn test_employee_self_registration() {
    let mut h = Harness::new();
    let acme = setup_acme(&mut h);

    assert!(matches!(
        h.app.register_employee_self("NOPE0000", "eve", "", None),
        Err(AppError::WrongCompany(_))
    ));
    assert!(matches!(
        h.app.register_employee_self(&acme.company_id, "boss", "", None),
        Err(AppError::DuplicateUser(_))
    ));
    assert!(matches!(
        h.app.register_employee_self(&acme.company_id, "bob", "", None),
        Err(AppError::DuplicateUser(_))
    ));

    let reg = h
        .app
        .register_employee_self(&acme.company_id.to_lowercase(), "Eve", "eve@acme.test", None)
        .unwrap();
    assert_eq!(reg.username, "eve");
    assert_eq!(reg.company_id, acme.company_id);

    let company = h.app.state().company(&acme.company_id).unwrap();
    assert!(company.roster_entry("eve").is_some());
    assert!(!h.app.state().user("eve").unwrap().is_verified());

    h.app.verify_account(&reg.code).unwrap();
    // verified but no site yet
    h.stand_at(0.0);
    assert!(matches!(
        h.app.login("eve", None),
        Err(AppError::NoAssignedSite(_))
    ));
}

#[test]
fn test_deferred_login_completes_on_next_fix() {
    let mut h = Harness::new();
    setup_acme(&mut h);

    let outcome = h.app.login("bob", None).unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::Deferred {
            username: "bob".into()
        }
    );
    assert!(h.app.session().current.is_none());
    assert!(h.app.session().pending_login.is_some());

    h.stand_at(30.0);
    assert_eq!(h.app.session().current.as_deref(), Some("bob"));
    assert!(h.app.session().pending_login.is_none());
}

#[test]
fn test_deferred_login_refused_when_far() {
    let mut h = Harness::new();
    setup_acme(&mut h);

    h.app.login("bob", None).unwrap();
    h.stand_at(500.0);

    assert!(h.app.session().current.is_none());
    assert!(h.app.session().pending_login.is_none());
    assert!(
        h.presenter
            .notices(NoticeLevel::Error)
            .iter()
            .any(|m| m.contains("refused"))
    );
}

#[test]
fn test_stale_fix_defers_login() {
    let mut h = Harness::new();
    setup_acme(&mut h);
    h.stand_at(10.0);
    h.clock.advance(chrono::Duration::seconds(301));

    assert!(matches!(
        h.app.login("bob", None).unwrap(),
        LoginOutcome::Deferred { .. }
    ));
}

#[test]
fn test_login_switches_user() {
    let mut h = Harness::new();
    setup_acme(&mut h);
    h.stand_at(0.0);
    h.app.login("bob", None).unwrap();
    h.app.check_in().unwrap();

    h.app.login("boss", None).unwrap();
    assert_eq!(h.app.session().current.as_deref(), Some("boss"));
    // bob was signed out, and so checked out
    assert!(!h.app.state().employee("bob").unwrap().is_checked_in());
}

#[test]
fn test_refused_login_keeps_current_session() {
    let mut h = Harness::new();
    let acme = setup_acme(&mut h);
    let pending = h.app.register_company("Globex", "hank", "", None).unwrap();

    h.stand_at(0.0);
    h.app.login("bob", None).unwrap();
    h.app.check_in().unwrap();

    assert!(matches!(
        h.app.login("ghost", None),
        Err(AppError::UnknownUser(_))
    ));
    assert!(matches!(
        h.app.login(&pending.username, None),
        Err(AppError::NotVerified(_))
    ));

    assert_eq!(h.app.session().current.as_deref(), Some("bob"));
    assert!(h.app.state().employee("bob").unwrap().is_checked_in());
    assert!(h.app.timers().history_running());
    // no "Logout" check-out was written
    let company = h.app.state().company(&acme.company_id).unwrap();
    assert_eq!(company.logs.len(), 1);
    assert_eq!(company.logs[0].action, "Check-In @ HQ");
}

#[test]
fn test_deferred_login_of_other_user_signs_out_current() {
    let mut h = Harness::new();
    setup_acme(&mut h);
    h.app.login("boss", None).unwrap();

    let outcome = h.app.login("bob", None).unwrap();
    assert!(matches!(outcome, LoginOutcome::Deferred { .. }));
    assert!(h.app.session().current.is_none());
    assert_eq!(
        h.app.session().pending_login.as_ref().map(|p| p.username.as_str()),
        Some("bob")
    );
}

#[test]
fn test_deferred_login_expires() {
    let mut h = Harness::new();
    setup_acme(&mut h);

    h.app.login("bob", None).unwrap();
    h.clock.advance(chrono::Duration::seconds(301));
    h.stand_at(0.0);

    assert!(h.app.session().current.is_none());
    assert!(h.app.session().pending_login.is_none());
    assert!(
        h.presenter
            .notices(NoticeLevel::Warning)
            .iter()
            .any(|m| m.contains("expired"))
    );

    // a fresh attempt goes through
    h.app.login("bob", None).unwrap();
    assert_eq!(h.app.session().current.as_deref(), Some("bob"));
}

#[test]
fn test_signup_does_not_displace_pending_manager_code() {
    let mut h = Harness::new();
    let boss = h.app.register_company("Acme", "boss", "", None).unwrap();
    let carol = h
        .app
        .register_employee_self(&boss.company_id, "carol", "", None)
        .unwrap();
    assert_eq!(h.app.session().pending_verifications.len(), 2);

    assert_eq!(h.app.verify_account(&boss.code).unwrap(), "boss");
    h.app.login("boss", None).unwrap();
    h.app.logout().unwrap();

    assert_eq!(h.app.session().pending_code_for("carol"), Some(carol.code.as_str()));
    assert_eq!(h.app.verify_account(&carol.code).unwrap(), "carol");
    assert!(h.app.state().user("carol").unwrap().is_verified());
    assert!(h.app.session().pending_verifications.is_empty());
}

#[test]
fn test_repeated_signup_replaces_only_own_code() {
    let mut h = Harness::new();
    let boss = h.app.register_company("Acme", "boss", "", None).unwrap();
    let first = h
        .app
        .register_employee_self(&boss.company_id, "carol", "", None)
        .unwrap();
    let second = h
        .app
        .register_employee_self(&boss.company_id, "carol", "", None)
        .unwrap();

    let session = h.app.session();
    assert_eq!(session.pending_verifications.len(), 2);
    assert_eq!(session.pending_code_for("carol"), Some(second.code.as_str()));
    assert_eq!(session.pending_code_for("boss"), Some(boss.code.as_str()));

    if first.code != second.code && first.code != boss.code {
        assert!(matches!(
            h.app.verify_account(&first.code),
            Err(AppError::VerificationFailed)
        ));
    }
    h.app.verify_account(&second.code).unwrap();
    assert!(h.app.state().user("carol").unwrap().is_verified());
}

#[test]
fn test_missing_site_blocks_login() {
    let mut kv = MemoryKv::new();
    let blob = r#"{
        "companies": { "ACME1234": { "name": "Acme", "sites": [] } },
        "users": {
            "dan": {"role": "employee", "companyId": "ACME1234", "verified": true,
                    "assignedSiteId": "ACME1234-S9"}
        }
    }"#;
    kv.save("state", blob).unwrap();

    let mut h = Harness::on(kv, Default::default());
    h.app.use_manual_position(SITE_LAT, SITE_LNG).unwrap();
    assert!(matches!(
        h.app.login("dan", None),
        Err(AppError::SiteMissing(id)) if id == "ACME1234-S9"
    ));
    assert!(h.app.session().current.is_none());
}

#[test]
fn test_manager_created_accounts_are_verified() {
    let mut h = Harness::new();
    let acme = setup_acme(&mut h);

    match h.app.state().user("bob").unwrap() {
        UserRecord::Employee(e) => {
            assert!(e.verified);
            assert_eq!(e.assigned_site_id.as_deref(), Some(acme.site_id.as_str()));
        }
        other => panic!("expected employee, got {other:?}"),
    }

    // employees cannot manage the directory
    h.stand_at(0.0);
    h.app.login("bob", None).unwrap();
    assert!(matches!(
        h.app.register_employee(NewEmployee {
            username: "mallory",
            contact: "",
            site_id: None,
            passcode: None,
        }),
        Err(AppError::NotAuthorized(_))
    ));
}
