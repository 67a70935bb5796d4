//! Read-only snapshot of everything the dashboard shows.

use super::geofence::{FenceReading, GeofencePolicy};
use super::tracker::{AcquisitionMode, TrackerState};
use crate::geolocation::GeoErrorCode;
use crate::models::company::LogEntry;
use crate::models::position::Position;
use crate::models::session::SessionRecord;
use crate::models::site::Site;
use crate::models::state::AppState;
use crate::models::user::{AttendanceStatus, UserRecord};
use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct LocationView {
    pub position: Option<Position>,
    pub mode: AcquisitionMode,
    pub last_error: Option<GeoErrorCode>,
    pub manual_required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterRow {
    pub username: String,
    pub contact: String,
    pub site_name: Option<String>,
    pub status: AttendanceStatus,
    pub since: Option<DateTime<Utc>>,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerView {
    pub username: String,
    pub company_id: String,
    pub company_name: String,
    pub sites: Vec<Site>,
    pub roster: Vec<RosterRow>,
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeView {
    pub username: String,
    pub company_name: Option<String>,
    pub site: Option<Site>,
    pub status: AttendanceStatus,
    pub since: Option<DateTime<Utc>>,
    pub elapsed: Option<TimeDelta>,
    pub fence: Option<FenceReading>,
    pub history_len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    SignedOut {
        pending_login: Option<String>,
        pending_verifications: Vec<String>,
    },
    Manager(ManagerView),
    Employee(EmployeeView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub now: DateTime<Utc>,
    pub location: LocationView,
    pub session: SessionView,
}

impl DashboardView {
    pub fn build(
        state: &AppState,
        session: &SessionRecord,
        tracker: &TrackerState,
        policy: &GeofencePolicy,
        now: DateTime<Utc>,
    ) -> Self {
        let location = LocationView {
            position: tracker.last_known,
            mode: tracker.mode,
            last_error: tracker.last_error,
            manual_required: tracker.manual_required,
        };

        let signed_out = || SessionView::SignedOut {
            pending_login: session.pending_login.as_ref().map(|p| p.username.clone()),
            pending_verifications: session
                .pending_verifications
                .iter()
                .map(|p| p.username.clone())
                .collect(),
        };

        let session_view = match session.current.as_deref().and_then(|u| state.user(u)) {
            None => signed_out(),
            Some(UserRecord::Manager(m)) => {
                match m
                    .company_id
                    .as_deref()
                    .and_then(|cid| state.company(cid).map(|c| (cid, c)))
                {
                    Some((cid, company)) => {
                        let roster = company
                            .employees
                            .iter()
                            .map(|row| {
                                let emp = state.employee(&row.username);
                                RosterRow {
                                    username: row.username.clone(),
                                    contact: row.contact.clone(),
                                    site_name: row
                                        .assigned_site_id
                                        .as_deref()
                                        .and_then(|sid| company.site(sid))
                                        .map(|s| s.name.clone()),
                                    status: emp.map(|e| e.status()).unwrap_or_default(),
                                    since: emp.and_then(|e| e.check_in_time()),
                                    verified: emp.is_some_and(|e| e.verified),
                                }
                            })
                            .collect();
                        SessionView::Manager(ManagerView {
                            username: m.username.clone(),
                            company_id: cid.to_string(),
                            company_name: company.name.clone(),
                            sites: company.sites.clone(),
                            roster,
                            logs: company.logs.clone(),
                        })
                    }
                    None => signed_out(),
                }
            }
            Some(UserRecord::Employee(e)) => {
                let company = e.company_id.as_deref().and_then(|cid| state.company(cid));
                let site = company
                    .zip(e.assigned_site_id.as_deref())
                    .and_then(|(c, sid)| c.site(sid))
                    .cloned();
                let fence = site
                    .as_ref()
                    .zip(tracker.last_known)
                    .map(|(s, p)| policy.evaluate(p.point(), s));

                SessionView::Employee(EmployeeView {
                    username: e.username.clone(),
                    company_name: company.map(|c| c.name.clone()),
                    site,
                    status: e.status(),
                    since: e.check_in_time(),
                    elapsed: e.check_in_time().map(|t| now - t),
                    fence,
                    history_len: e.history.len(),
                })
            }
        };

        Self {
            now,
            location,
            session: session_view,
        }
    }
}
