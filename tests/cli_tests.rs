mod common;

use common::{code_in, company_id_in, rti, run_ok, setup_test_db, temp_out};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

/// Init a fresh DB with company "Acme", manager "boss", site "HQ" at
/// 45.0, 9.0 and employee "bob". Returns (db path, company id).
fn init_acme(name: &str) -> (String, String) {
    let db_path = setup_test_db(name);

    rti()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    let out = run_ok(
        &db_path,
        &["company", "register", "--name", "Acme", "--manager", "boss"],
    );
    let company_id = company_id_in(&out);
    let code = code_in(&out);
    run_ok(&db_path, &["verify", &code]);
    run_ok(&db_path, &["login", "boss"]);
    run_ok(&db_path, &["position", "set", "45.0", "9.0"]);
    run_ok(&db_path, &["site", "create", "HQ"]);
    let site_id = format!("{company_id}-S1");
    run_ok(&db_path, &["employee", "add", "bob", "--site", &site_id]);
    run_ok(&db_path, &["logout"]);

    (db_path, company_id)
}

#[test]
fn test_init_creates_db() {
    let db_path = setup_test_db("cli_init");

    rti()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database initialized"));

    assert!(fs::metadata(&db_path).is_ok());
}

#[test]
fn test_company_register_prints_id_and_code() {
    let db_path = setup_test_db("cli_register");
    rti()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    rti()
        .args([
            "--db",
            &db_path,
            "company",
            "register",
            "--name",
            "Acme Corp",
            "--manager",
            "Boss",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Company id: ACMECO\d{4}").unwrap())
        .stdout(predicate::str::contains("simulated delivery"));

    // unverified accounts cannot sign in
    rti()
        .args(["--db", &db_path, "login", "boss"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not verified"));

    rti()
        .args(["--db", &db_path, "verify", "abcdef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match"));
}

#[test]
fn test_full_attendance_day() {
    let (db_path, _) = init_acme("cli_day");

    // 30 m north of the site
    run_ok(&db_path, &["position", "set", "45.00027", "9.0"]);
    rti()
        .args(["--db", &db_path, "login", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as bob"));

    rti()
        .args(["--db", &db_path, "checkin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked in at HQ"));

    rti()
        .args(["--db", &db_path, "checkin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already checked in"));

    rti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob"))
        .stdout(predicate::str::contains("HQ"));

    rti()
        .args(["--db", &db_path, "checkout", "--reason", "Lunch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Worked"));

    // employees do not see company logs
    rti()
        .args(["--db", &db_path, "logs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not allowed"));

    run_ok(&db_path, &["login", "boss"]);
    rti()
        .args(["--db", &db_path, "logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Check-In @ HQ"))
        .stdout(predicate::str::contains("Lunch"));

    rti()
        .args(["--db", &db_path, "employee", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob"))
        .stdout(predicate::str::contains("checked-out"));
}

#[test]
fn test_login_refused_outside_geofence() {
    let (db_path, _) = init_acme("cli_far");

    // about 1.1 km north
    run_ok(&db_path, &["position", "set", "45.01", "9.0"]);
    rti()
        .args(["--db", &db_path, "login", "bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Too far"));

    rti()
        .args(["--db", &db_path, "checkin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_login_without_position_is_deferred() {
    let (db_path, _) = init_acme("cli_deferred");
    run_ok(&db_path, &["position", "clear"]);

    rti()
        .args(["--db", &db_path, "login", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Waiting for a position fix"));

    rti()
        .args(["--db", &db_path, "position", "set", "45.0", "9.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as bob"));
}

#[test]
fn test_track_feed_checks_out_on_exit() {
    let (db_path, _) = init_acme("cli_track");
    run_ok(&db_path, &["position", "set", "45.0", "9.0"]);
    run_ok(&db_path, &["login", "bob"]);
    run_ok(&db_path, &["checkin"]);

    let feed = temp_out("cli_track_feed", "txt");
    fs::write(
        &feed,
        "# walking away\n45.0001 9.0\nerror timeout\n45.0002 9.0\n45.01 9.0\n",
    )
    .unwrap();

    rti()
        .args(["--db", &db_path, "track", "--feed", &feed])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked out automatically"))
        .stdout(predicate::str::contains("Processed 4 of 4 feed entries"));

    // the session survives the exit
    rti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob"));

    run_ok(&db_path, &["login", "boss"]);
    rti()
        .args(["--db", &db_path, "logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Geofence Exit"));
}

#[test]
fn test_track_rejects_bad_feed() {
    let db_path = setup_test_db("cli_bad_feed");
    rti()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    let feed = temp_out("cli_bad_feed", "txt");
    fs::write(&feed, "45.0 9.0\nnot a fix\n").unwrap();

    rti()
        .args(["--db", &db_path, "track", "--feed", &feed])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_export_logs_csv_and_json() {
    let (db_path, company_id) = init_acme("cli_export");
    run_ok(&db_path, &["position", "set", "45.0", "9.0"]);
    run_ok(&db_path, &["login", "bob"]);
    run_ok(&db_path, &["checkin"]);
    run_ok(&db_path, &["checkout"]);
    run_ok(&db_path, &["login", "boss"]);

    let csv_out = temp_out("cli_export_logs", "csv");
    rti()
        .args([
            "--db", &db_path, "export", "--what", "logs", "--format", "csv", "--file", &csv_out,
        ])
        .assert()
        .success();
    let text = fs::read_to_string(&csv_out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("company_id,time,username,action"));
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains(&format!("{company_id},")));
    assert!(text.contains("Check-In @ HQ"));

    let json_out = temp_out("cli_export_logs", "json");
    rti()
        .args([
            "--db", &db_path, "export", "--what", "logs", "--format", "json", "--file",
            &json_out,
        ])
        .assert()
        .success();
    let parsed: Value = serde_json::from_str(&fs::read_to_string(&json_out).unwrap()).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // newest first
    assert_eq!(rows[0]["action"], "Check-Out");
    assert_eq!(rows[1]["username"], "bob");

    // existing file is only replaced with --force
    rti()
        .args([
            "--db", &db_path, "export", "--what", "logs", "--format", "json", "--file",
            &json_out, "--force",
        ])
        .assert()
        .success();
}

#[test]
fn test_export_history_needs_rows() {
    let (db_path, _) = init_acme("cli_export_empty");
    run_ok(&db_path, &["login", "boss"]);

    let out = temp_out("cli_export_history", "csv");
    rti()
        .args([
            "--db", &db_path, "export", "--what", "history", "--user", "bob", "--file", &out,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to export"));
    assert!(fs::metadata(&out).is_err());
}

#[test]
fn test_backup_compressed() {
    let (db_path, _) = init_acme("cli_backup");
    let out = temp_out("cli_backup", "sqlite");
    let zip = out.replace(".sqlite", ".zip");
    fs::remove_file(&zip).ok();

    rti()
        .args(["--db", &db_path, "backup", "--file", &out, "--compress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compressed"));

    assert!(fs::metadata(&zip).is_ok());
    assert!(fs::metadata(&out).is_err());

    rti()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backup"))
        .stdout(predicate::str::contains("register_company"));
}

#[test]
fn test_db_info_and_check() {
    let (db_path, _) = init_acme("cli_db_info");

    rti()
        .args(["--db", &db_path, "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Size:"))
        .stdout(predicate::str::contains("Integrity check passed"));
}

#[test]
fn test_config_check_defaults() {
    let db_path = setup_test_db("cli_config");
    rti()
        .args(["--db", &db_path, "config", "--print", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("radius_m"))
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_position_rejects_out_of_range() {
    let db_path = setup_test_db("cli_bad_position");
    rti()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    rti()
        .args(["--db", &db_path, "position", "set", "95.0", "9.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid coordinates"));

    rti()
        .args(["--db", &db_path, "position", "set", "-33.9", "-70.6"])
        .assert()
        .success();
    rti()
        .args(["--db", &db_path, "position", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-33.9"));
}
