//! The application facade. Owns the store, the session, the tracker and the
//! session timers, and is the only place where core events turn into
//! persistence, presenter refreshes and notices.

use super::attendance::{
    AttendanceLogic, CheckInReceipt, CheckOutReceipt, GEOFENCE_EXIT_REASON, LOGOUT_REASON,
};
use super::clock::Clock;
use super::dashboard::DashboardView;
use super::directory::{DirectoryLogic, NewEmployee};
use super::geofence::{GeofencePolicy, GeofenceVerdict};
use super::session::{LoginOutcome, Registration, SessionLogic};
use super::store::{AppStore, SESSION_KEY, TRACKER_KEY};
use super::timer::{DueTimers, SessionTimers, TimerSettings};
use super::tracker::{LocationTracker, TrackerEvent, TrackerSettings, TrackerState};
use crate::db::kv::KvBackend;
use crate::errors::{AppError, AppResult};
use crate::geolocation::GeolocationProvider;
use crate::models::company::{Company, EmployeeSummary};
use crate::models::position::{GeoPoint, Position};
use crate::models::session::SessionRecord;
use crate::models::site::Site;
use crate::models::state::AppState;
use crate::models::user::{AttendanceStatus, HistoryPoint, UserRecord, normalize_username};
use crate::ui::{Notice, Presenter};
use crate::utils::format_distance;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Settings {
    pub geofence: GeofencePolicy,
    pub tracker: TrackerSettings,
    pub timers: TimerSettings,
}

pub struct App {
    store: AppStore,
    session: SessionRecord,
    tracker: LocationTracker,
    timers: SessionTimers,
    provider: Box<dyn GeolocationProvider>,
    presenter: Box<dyn Presenter>,
    clock: Box<dyn Clock>,
    settings: Settings,
}

impl App {
    pub fn new(
        backend: Box<dyn KvBackend>,
        provider: Box<dyn GeolocationProvider>,
        presenter: Box<dyn Presenter>,
        clock: Box<dyn Clock>,
        settings: Settings,
    ) -> AppResult<Self> {
        let mut store = AppStore::open(backend)?;
        let session: SessionRecord = store.load_record(SESSION_KEY)?;
        let tracker_state: TrackerState = store.load_record(TRACKER_KEY)?;

        let mut app = Self {
            store,
            session,
            tracker: LocationTracker::new(tracker_state, settings.tracker),
            timers: SessionTimers::default(),
            provider,
            presenter,
            clock,
            settings,
        };
        app.drop_stale_session()?;
        app.align_timers();
        Ok(app)
    }

    // ---------------------------
    // Queries
    // ---------------------------

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn session(&self) -> &SessionRecord {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.session
            .current
            .as_deref()
            .and_then(|u| self.store.state().user(u))
    }

    pub fn position(&self) -> Option<Position> {
        self.tracker.last_known()
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    pub fn timers(&self) -> &SessionTimers {
        &self.timers
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn require_user(&self) -> AppResult<String> {
        self.current_user()
            .map(|u| u.username().to_string())
            .ok_or(AppError::NotSignedIn)
    }

    /// Resolve whose data the signed-in user may read: themselves, or any
    /// employee of the company they manage.
    fn readable_employee(&self, username: Option<&str>) -> AppResult<String> {
        let me = self.require_user()?;
        let Some(target) = username.map(normalize_username).filter(|u| *u != me) else {
            return Ok(me);
        };

        let company_id = DirectoryLogic::managed_company(self.state(), &me)?;
        match self.state().employee(&target) {
            None => Err(AppError::UnknownUser(target)),
            Some(emp) if emp.company_id.as_deref() != Some(company_id.as_str()) => {
                Err(AppError::UserBelongsElsewhere(target))
            }
            Some(_) => Ok(target),
        }
    }

    pub fn status_of(
        &self,
        username: Option<&str>,
    ) -> AppResult<(AttendanceStatus, Option<DateTime<Utc>>)> {
        let target = self.readable_employee(username)?;
        let emp = self
            .state()
            .employee(&target)
            .ok_or_else(|| AppError::NotAuthorized("managers have no attendance status".into()))?;
        Ok((emp.status(), emp.check_in_time()))
    }

    pub fn history_of(&self, username: Option<&str>) -> AppResult<(String, &[HistoryPoint])> {
        let target = self.readable_employee(username)?;
        let emp = self
            .state()
            .employee(&target)
            .ok_or_else(|| AppError::NotAuthorized("managers have no location history".into()))?;
        Ok((target, emp.history.as_slice()))
    }

    /// The company managed by the signed-in user: roster, sites and logs.
    pub fn managed_company(&self) -> AppResult<(String, &Company)> {
        let me = self.require_user()?;
        let company_id = DirectoryLogic::managed_company(self.state(), &me)?;
        let company = self
            .state()
            .company(&company_id)
            .ok_or_else(|| AppError::CompanyMissing(company_id.clone()))?;
        Ok((company_id, company))
    }

    pub fn dashboard_view(&self) -> DashboardView {
        DashboardView::build(
            self.store.state(),
            &self.session,
            self.tracker.state(),
            &self.settings.geofence,
            self.clock.now(),
        )
    }

    // ---------------------------
    // Plumbing
    // ---------------------------

    fn refresh(&mut self) {
        let view = self.dashboard_view();
        self.presenter.render_dashboard(&view);
    }

    fn notify(&mut self, notice: Notice) {
        self.presenter.notify(&notice);
    }

    /// Write a line to the internal log of the backing store.
    pub fn audit(&mut self, operation: &str, target: &str, message: &str) {
        self.store.audit(operation, target, message);
    }

    fn save_session(&mut self) -> AppResult<()> {
        self.store.save_record(SESSION_KEY, &self.session)
    }

    fn save_tracker(&mut self) -> AppResult<()> {
        let state = self.tracker.state().clone();
        self.store.save_record(TRACKER_KEY, &state)
    }

    /// Run a session-changing operation on a copy of the session record and
    /// keep the copy only when the operation succeeds.
    fn with_session<T>(
        &mut self,
        f: impl FnOnce(&mut AppState, &mut SessionRecord) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut draft = self.session.clone();
        let out = self.store.mutate(|state| f(state, &mut draft))?;
        if draft != self.session {
            self.session = draft;
            self.save_session()?;
        }
        Ok(out)
    }

    /// A session pointing to a user that no longer exists is ended.
    fn drop_stale_session(&mut self) -> AppResult<bool> {
        let stale = self
            .session
            .current
            .as_deref()
            .is_some_and(|u| self.store.state().user(u).is_none());
        if stale {
            let gone = self.session.current.take().unwrap_or_default();
            self.save_session()?;
            info!(user = %gone, "session ended, account no longer exists");
        }
        Ok(stale)
    }

    /// Timers run exactly while the signed-in employee is checked in.
    fn align_timers(&mut self) {
        let checked_in = self
            .current_user()
            .and_then(UserRecord::as_employee)
            .is_some_and(|e| e.is_checked_in());

        if !checked_in {
            self.timers.stop_all();
            return;
        }

        let now = self.clock.now();
        if !self.timers.history_running() {
            self.timers
                .start_history(now, self.settings.timers.history_interval);
        }
        if !self.timers.ui_clock_running() {
            self.timers
                .start_ui_clock(now, self.settings.timers.ui_clock_interval);
        }
    }

    // ---------------------------
    // Identity
    // ---------------------------

    pub fn register_company(
        &mut self,
        company_name: &str,
        manager: &str,
        contact: &str,
        passcode: Option<&str>,
    ) -> AppResult<Registration> {
        let reg = self.with_session(|state, session| {
            SessionLogic::register_company(state, session, company_name, manager, contact, passcode)
        })?;

        self.store.audit(
            "register_company",
            &reg.company_id,
            &format!("company '{}' registered by {}", company_name.trim(), reg.username),
        );
        self.notify(Notice::success(format!(
            "Company {} registered. Verification code sent to {}.",
            reg.company_id, reg.username
        )));
        self.refresh();
        Ok(reg)
    }

    pub fn register_employee_self(
        &mut self,
        company_id: &str,
        username: &str,
        contact: &str,
        passcode: Option<&str>,
    ) -> AppResult<Registration> {
        let reg = self.with_session(|state, session| {
            SessionLogic::register_employee_self(
                state, session, company_id, username, contact, passcode,
            )
        })?;

        self.store.audit(
            "signup",
            &reg.username,
            &format!("self-registered with {}", reg.company_id),
        );
        self.notify(Notice::success(format!(
            "Account {} created. Verification code sent.",
            reg.username
        )));
        self.refresh();
        Ok(reg)
    }

    pub fn verify_account(&mut self, code: &str) -> AppResult<String> {
        let username =
            self.with_session(|state, session| SessionLogic::verify_account(state, session, code))?;

        self.store.audit("verify", &username, "account verified");
        self.notify(Notice::success(format!("Account {username} verified.")));
        self.refresh();
        Ok(username)
    }

    /// Sign in. The credentials are checked on a draft session first, so a
    /// refused login leaves whoever is signed in untouched.
    pub fn login(&mut self, username: &str, passcode: Option<&str>) -> AppResult<LoginOutcome> {
        let now = self.clock.now();
        let fix = self.tracker.fresh_fix(now);
        let policy = self.settings.geofence;

        let mut draft = self.session.clone();
        let outcome = SessionLogic::login(
            self.store.state(),
            &mut draft,
            username,
            passcode,
            fix.as_ref(),
            &policy,
            now,
        )?;

        let wanted = normalize_username(username);
        if self.session.current.as_deref().is_some_and(|u| u != wanted) {
            self.logout()?;
        }
        // a deferred login keeps nobody signed in
        self.session.current = draft.current.filter(|u| *u == wanted);
        self.session.pending_login = draft.pending_login;
        self.save_session()?;

        match &outcome {
            LoginOutcome::SignedIn { username, role } => {
                self.store
                    .audit("login", username, &format!("signed in as {role}"));
                self.align_timers();
                self.notify(Notice::success(format!("Signed in as {username} ({role}).")));
            }
            LoginOutcome::Deferred { username } => {
                self.notify(Notice::info(format!(
                    "Waiting for a position fix to complete the login of {username}."
                )));
            }
        }
        self.refresh();
        Ok(outcome)
    }

    /// End the session. A checked-in employee is checked out first.
    pub fn logout(&mut self) -> AppResult<Option<CheckOutReceipt>> {
        let receipt = match self.session.current.clone() {
            Some(username) => self.end_attendance(&username, LOGOUT_REASON)?,
            None => None,
        };

        let previous = self.session.current.take();
        self.session.pending_login = None;
        self.save_session()?;
        self.timers.stop_all();

        if let Some(username) = previous {
            self.store.audit("logout", &username, "signed out");
            self.notify(Notice::info(format!("Signed out {username}.")));
        }
        self.refresh();
        Ok(receipt)
    }

    // ---------------------------
    // Attendance
    // ---------------------------

    pub fn check_in(&mut self) -> AppResult<CheckInReceipt> {
        let username = self.require_user()?;
        let now = self.clock.now();
        let position = self.tracker.last_known();
        let policy = self.settings.geofence;

        let receipt = self.store.mutate(|state| {
            AttendanceLogic::check_in(state, &username, position.as_ref(), &policy, now)
        })?;

        self.timers
            .start_history(now, self.settings.timers.history_interval);
        self.timers
            .start_ui_clock(now, self.settings.timers.ui_clock_interval);

        self.store.audit(
            "check_in",
            &username,
            &format!("{} ({:.1} m)", receipt.site_id, receipt.distance_m),
        );
        self.notify(Notice::success(format!(
            "Checked in at {} ({} from site).",
            receipt.site_name,
            format_distance(receipt.distance_m)
        )));
        self.refresh();
        Ok(receipt)
    }

    pub fn check_out(&mut self, reason: Option<&str>) -> AppResult<Option<CheckOutReceipt>> {
        let username = self.require_user()?;
        let receipt = self.end_attendance(&username, reason.unwrap_or_default())?;
        if receipt.is_none() {
            self.notify(Notice::info(format!("{username} is not checked in.")));
        }
        self.refresh();
        Ok(receipt)
    }

    /// Shared check-out path for manual, logout and geofence exits.
    fn end_attendance(
        &mut self,
        username: &str,
        reason: &str,
    ) -> AppResult<Option<CheckOutReceipt>> {
        let now = self.clock.now();
        let receipt = self
            .store
            .mutate(|state| Ok(AttendanceLogic::check_out(state, username, Some(reason), now)))?;
        self.timers.stop_all();

        if let Some(r) = &receipt {
            self.store.audit("check_out", username, &r.reason);
            self.notify(Notice::success(format!(
                "{username} checked out ({}).",
                r.reason
            )));
        }
        Ok(receipt)
    }

    // ---------------------------
    // Directory
    // ---------------------------

    pub fn create_site(&mut self, name: &str) -> AppResult<Site> {
        let manager = self.require_user()?;
        let position = self.tracker.last_known();
        let site = self.store.mutate(|state| {
            DirectoryLogic::create_site(state, &manager, name, position.as_ref())
        })?;

        self.store.audit(
            "create_site",
            &site.id,
            &format!("'{}' at {}", site.name, site.point()),
        );
        self.notify(Notice::success(format!(
            "Site {} ({}) created at {}.",
            site.name,
            site.id,
            site.point()
        )));
        self.refresh();
        Ok(site)
    }

    pub fn update_site_location(&mut self, site_id: &str) -> AppResult<Site> {
        let manager = self.require_user()?;
        let position = self.tracker.last_known();
        let site = self.store.mutate(|state| {
            DirectoryLogic::update_site_location(state, &manager, site_id, position.as_ref())
        })?;

        self.store.audit(
            "relocate_site",
            &site.id,
            &format!("moved to {}", site.point()),
        );
        self.notify(Notice::success(format!(
            "Site {} moved to {}.",
            site.id,
            site.point()
        )));
        self.refresh();
        Ok(site)
    }

    pub fn register_employee(&mut self, new: NewEmployee<'_>) -> AppResult<EmployeeSummary> {
        let manager = self.require_user()?;
        let summary = self
            .store
            .mutate(|state| DirectoryLogic::register_employee(state, &manager, new))?;

        self.store.audit(
            "add_employee",
            &summary.username,
            &format!(
                "site {}",
                summary.assigned_site_id.as_deref().unwrap_or("(none)")
            ),
        );
        self.notify(Notice::success(format!(
            "Employee {} registered.",
            summary.username
        )));
        self.refresh();
        Ok(summary)
    }

    pub fn remove_employee(&mut self, username: &str) -> AppResult<()> {
        let manager = self.require_user()?;
        self.store
            .mutate(|state| DirectoryLogic::remove_employee(state, &manager, username))?;

        let username = normalize_username(username);
        self.store.audit("remove_employee", &username, "account deleted");
        self.notify(Notice::success(format!("Employee {username} removed.")));
        self.refresh();
        Ok(())
    }

    // ---------------------------
    // Location
    // ---------------------------

    pub fn start_tracking(&mut self) -> AppResult<()> {
        self.tracker.start(self.provider.as_mut());
        self.save_tracker()
    }

    /// Process one pending sample. Returns false when none was available.
    pub fn pump(&mut self) -> AppResult<bool> {
        match self.tracker.poll(self.provider.as_mut()) {
            Some(event) => {
                self.on_tracker_event(event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn use_manual_position(&mut self, lat: f64, lng: f64) -> AppResult<Position> {
        if !GeoPoint::new(lat, lng).is_in_range() {
            return Err(AppError::InvalidCoordinates(format!("{lat}, {lng}")));
        }
        let position = Position::new(lat, lng, self.clock.now());
        let position = self.tracker.use_manual(self.provider.as_mut(), position);
        self.on_tracker_event(TrackerEvent::Fix(position))?;
        Ok(position)
    }

    pub fn clear_position(&mut self) -> AppResult<()> {
        self.tracker.clear();
        self.save_tracker()?;
        self.refresh();
        Ok(())
    }

    pub fn locate_once(&mut self) -> AppResult<TrackerEvent> {
        let event = self.tracker.locate_once(self.provider.as_mut());
        self.on_tracker_event(event)?;
        Ok(event)
    }

    fn on_tracker_event(&mut self, event: TrackerEvent) -> AppResult<()> {
        self.save_tracker()?;
        match event {
            TrackerEvent::Fix(position) => {
                debug!(%position, "position update");
                self.refresh();
                self.complete_pending_login(position)?;
                self.enforce_geofence(position)?;
            }
            TrackerEvent::Demoted(code) => {
                self.notify(Notice::warning(format!(
                    "High-accuracy positioning failed ({code}); retrying with low accuracy."
                )));
            }
            TrackerEvent::ManualOverrideRequired => {
                self.notify(Notice::error(
                    "Location permission denied. Supply a manual position to continue.",
                ));
                self.refresh();
            }
            TrackerEvent::Error(code) => {
                self.notify(Notice::warning(format!("Location error: {code}.")));
            }
        }
        Ok(())
    }

    fn complete_pending_login(&mut self, position: Position) -> AppResult<()> {
        let Some(pending) = self.session.pending_login.clone() else {
            return Ok(());
        };

        let max_age = TimeDelta::from_std(self.settings.tracker.login_fix_max_age)
            .unwrap_or(TimeDelta::MAX);
        if self.clock.now() - pending.requested_at > max_age {
            self.session.pending_login = None;
            self.save_session()?;
            info!(user = %pending.username, "deferred login expired");
            self.notify(Notice::warning(format!(
                "Login of {} expired while waiting for a position; sign in again.",
                pending.username
            )));
            self.refresh();
            return Ok(());
        }

        let policy = self.settings.geofence;
        let result = SessionLogic::complete_login(
            self.store.state(),
            &mut self.session,
            &pending.username,
            Some(&position),
            &policy,
        );
        self.save_session()?;

        match result {
            Ok(reading) => {
                self.store
                    .audit("login", &pending.username, "signed in as employee");
                self.align_timers();
                self.notify(Notice::success(format!(
                    "Signed in as {} ({} from site).",
                    pending.username,
                    format_distance(reading.distance_m)
                )));
            }
            Err(e) => {
                self.notify(Notice::error(format!(
                    "Login of {} refused: {e}",
                    pending.username
                )));
            }
        }
        self.refresh();
        Ok(())
    }

    /// Reactive pass: a checked-in employee seen outside the buffered fence
    /// is checked out. The session itself stays open.
    fn enforce_geofence(&mut self, position: Position) -> AppResult<()> {
        let Some(username) = self.session.current.clone() else {
            return Ok(());
        };

        let verdict =
            self.settings
                .geofence
                .evaluate_employee(self.store.state(), &username, position.point());
        match verdict {
            GeofenceVerdict::NotApplicable | GeofenceVerdict::Inside { .. } => {}
            GeofenceVerdict::Exited { site_name, reading } => {
                self.end_attendance(&username, GEOFENCE_EXIT_REASON)?;
                self.notify(Notice::warning(format!(
                    "You left {site_name} ({} away). Checked out automatically.",
                    format_distance(reading.distance_m)
                )));
                self.refresh();
            }
            GeofenceVerdict::SiteMissing { site_id } => {
                self.notify(Notice::warning(format!(
                    "Assigned site {} no longer exists; ask your manager to fix it.",
                    site_id.as_deref().unwrap_or("(none)")
                )));
            }
        }
        Ok(())
    }

    // ---------------------------
    // Timers and external changes
    // ---------------------------

    pub fn tick(&mut self) -> AppResult<DueTimers> {
        let now = self.clock.now();
        let due = self.timers.poll(now);

        if due.history
            && let (Some(username), Some(position)) =
                (self.session.current.clone(), self.tracker.last_known())
        {
            self.store.mutate(|state| {
                Ok(AttendanceLogic::record_history_point(
                    state, &username, &position, now,
                ))
            })?;
        }
        if due.ui_clock {
            self.refresh();
        }
        Ok(due)
    }

    /// Take over whatever another context persisted. Returns true when a
    /// reload happened.
    pub fn sync_external(&mut self) -> AppResult<bool> {
        if !self.store.sync_external()? {
            return Ok(false);
        }

        self.session = self.store.load_record(SESSION_KEY)?;
        if self.drop_stale_session()? {
            self.notify(Notice::warning(
                "Your account was removed elsewhere; session ended.",
            ));
        }
        self.align_timers();
        self.refresh();
        Ok(true)
    }

    /// Release the watch and the timers.
    pub fn shutdown(&mut self) -> AppResult<()> {
        self.tracker.stop(self.provider.as_mut());
        self.timers.stop_all();
        self.save_tracker()
    }
}
