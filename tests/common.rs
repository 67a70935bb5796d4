#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, TimeZone, Utc};
use rattend::core::app::{App, Settings};
use rattend::core::clock::ManualClock;
use rattend::core::dashboard::DashboardView;
use rattend::core::directory::NewEmployee;
use rattend::core::distance::EARTH_RADIUS_METERS;
use rattend::db::kv::MemoryKv;
use rattend::geolocation::FeedProvider;
use rattend::geolocation::feed::{FeedEntry, FeedSample};
use rattend::ui::{Notice, NoticeLevel, Presenter};
use regex::Regex;
use std::cell::RefCell;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

pub fn rti() -> Command {
    cargo_bin_cmd!("rattend")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattend.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Run a CLI command against `db` and return its stdout, asserting success.
pub fn run_ok(db: &str, args: &[&str]) -> String {
    let mut full = vec!["--db", db];
    full.extend_from_slice(args);
    let out = rti().args(&full).assert().success();
    String::from_utf8_lossy(&out.get_output().stdout).into_owned()
}

/// Pull the simulated verification code out of a registration's output.
pub fn code_in(stdout: &str) -> String {
    let re = Regex::new(r"simulated delivery\): (\d{6})").unwrap();
    re.captures(stdout)
        .map(|c| c[1].to_string())
        .expect("registration output carries a code")
}

/// Pull the company id out of `company register` output.
pub fn company_id_in(stdout: &str) -> String {
    let re = Regex::new(r"Company id: ([A-Z0-9]+)").unwrap();
    re.captures(stdout)
        .map(|c| c[1].to_string())
        .expect("registration output carries a company id")
}

// ---------------------------
// Library fixtures
// ---------------------------

pub const SITE_LAT: f64 = 45.0;
pub const SITE_LNG: f64 = 9.0;

/// Latitude `meters` due north of `lat` on the haversine sphere.
pub fn north_of(lat: f64, meters: f64) -> f64 {
    lat + meters.to_degrees() / EARTH_RADIUS_METERS
}

pub fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, h, m, s).unwrap()
}

#[derive(Default)]
pub struct Recorded {
    pub views: Vec<DashboardView>,
    pub notices: Vec<Notice>,
}

/// Presenter that keeps everything it is asked to show.
#[derive(Clone, Default)]
pub struct RecordingPresenter(pub Rc<RefCell<Recorded>>);

impl RecordingPresenter {
    pub fn notices(&self, level: NoticeLevel) -> Vec<String> {
        self.0
            .borrow()
            .notices
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn render_count(&self) -> usize {
        self.0.borrow().views.len()
    }
}

impl Presenter for RecordingPresenter {
    fn render_dashboard(&mut self, view: &DashboardView) {
        self.0.borrow_mut().views.push(view.clone());
    }

    fn notify(&mut self, notice: &Notice) {
        self.0.borrow_mut().notices.push(notice.clone());
    }
}

/// One execution context over a shared in-memory store.
pub struct Harness {
    pub app: App,
    pub kv: MemoryKv,
    pub feed: Rc<RefCell<FeedProvider>>,
    pub clock: ManualClock,
    pub presenter: RecordingPresenter,
}

impl Harness {
    pub fn new() -> Self {
        Self::on(MemoryKv::new(), Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self::on(MemoryKv::new(), settings)
    }

    /// A second context sharing `kv` with another harness.
    pub fn on(kv: MemoryKv, settings: Settings) -> Self {
        let clock = ManualClock::new(at(9, 0, 0));
        let feed = Rc::new(RefCell::new(
            FeedProvider::empty().with_clock(clock.clone()),
        ));
        let presenter = RecordingPresenter::default();
        let app = App::new(
            Box::new(kv.clone()),
            Box::new(feed.clone()),
            Box::new(presenter.clone()),
            Box::new(clock.clone()),
            settings,
        )
        .expect("app opens");
        Self {
            app,
            kv,
            feed,
            clock,
            presenter,
        }
    }

    /// Queue a fix `meters` north of the test site, stamped `when`.
    pub fn feed_fix(&self, meters: f64, when: DateTime<Utc>) {
        self.feed.borrow_mut().push(FeedEntry {
            at: Some(when),
            sample: FeedSample::Fix {
                lat: north_of(SITE_LAT, meters),
                lng: SITE_LNG,
            },
        });
    }

    pub fn feed_error(&self, code: rattend::geolocation::GeoErrorCode, when: DateTime<Utc>) {
        self.feed.borrow_mut().push(FeedEntry {
            at: Some(when),
            sample: FeedSample::Error(code),
        });
    }

    /// Manual position `meters` north of the test site.
    pub fn stand_at(&mut self, meters: f64) {
        self.app
            .use_manual_position(north_of(SITE_LAT, meters), SITE_LNG)
            .expect("manual position accepted");
    }
}

/// Company "Acme" with manager "boss", site "HQ" at the test coordinates and
/// employee "bob" assigned to it. Ends signed out.
pub struct Acme {
    pub company_id: String,
    pub site_id: String,
}

pub fn setup_acme(h: &mut Harness) -> Acme {
    let reg = h
        .app
        .register_company("Acme", "boss", "boss@acme.test", None)
        .expect("company registered");
    h.app.verify_account(&reg.code).expect("manager verified");
    h.app.login("boss", None).expect("manager signs in");

    h.app
        .use_manual_position(SITE_LAT, SITE_LNG)
        .expect("manager position");
    let site = h.app.create_site("HQ").expect("site created");

    h.app
        .register_employee(NewEmployee {
            username: "bob",
            contact: "bob@acme.test",
            site_id: Some(&site.id),
            passcode: None,
        })
        .expect("employee registered");

    h.app.logout().expect("manager signs out");
    h.app.clear_position().expect("position cleared");

    Acme {
        company_id: reg.company_id,
        site_id: site.id,
    }
}
