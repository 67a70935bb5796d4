//! The attendance state machine: `CheckedOut <-> CheckedIn`.

use super::geofence::{FenceReading, GeofencePolicy};
use crate::errors::{AppError, AppResult};
use crate::models::position::Position;
use crate::models::site::Site;
use crate::models::state::AppState;
use crate::models::user::{HistoryPoint, UserRecord, normalize_username};
use chrono::{DateTime, Utc};
use tracing::info;

pub const DEFAULT_CHECK_OUT_REASON: &str = "Check-Out";
pub const GEOFENCE_EXIT_REASON: &str = "Geofence Exit";
pub const LOGOUT_REASON: &str = "Logout";

#[derive(Debug, Clone, PartialEq)]
pub struct CheckInReceipt {
    pub site_id: String,
    pub site_name: String,
    pub distance_m: f64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutReceipt {
    pub reason: String,
    pub at: DateTime<Utc>,
    pub checked_in_since: Option<DateTime<Utc>>,
}

pub struct AttendanceLogic;

impl AttendanceLogic {
    /// Resolve the site an employee is assigned to, reporting which link is broken.
    pub fn assigned_site<'a>(state: &'a AppState, username: &str) -> AppResult<&'a Site> {
        let user = state
            .user(username)
            .ok_or_else(|| AppError::UnknownUser(normalize_username(username)))?;

        let emp = match user {
            UserRecord::Employee(emp) => emp,
            UserRecord::Manager(_) => {
                return Err(AppError::NotAuthorized(
                    "managers do not have an assigned site".into(),
                ));
            }
        };

        let site_id = emp
            .assigned_site_id
            .as_deref()
            .ok_or_else(|| AppError::NoAssignedSite(emp.username.clone()))?;
        let company_id = emp
            .company_id
            .as_deref()
            .ok_or_else(|| AppError::CompanyMissing(String::from("(none)")))?;
        let company = state
            .company(company_id)
            .ok_or_else(|| AppError::CompanyMissing(company_id.to_string()))?;

        company
            .site(site_id)
            .ok_or_else(|| AppError::SiteMissing(site_id.to_string()))
    }

    /// Gate check used by both check-in and employee login.
    pub fn gate(
        state: &AppState,
        username: &str,
        position: Option<&Position>,
        policy: &GeofencePolicy,
    ) -> AppResult<(Site, FenceReading)> {
        let position = position.ok_or(AppError::NoPosition)?;
        let site = Self::assigned_site(state, username)?;
        let reading = policy.evaluate(position.point(), site);

        if !reading.within_fence {
            return Err(AppError::OutsideGeofence {
                distance_m: reading.distance_m,
                limit_m: policy.radius_m,
            });
        }
        Ok((site.clone(), reading))
    }

    pub fn check_in(
        state: &mut AppState,
        username: &str,
        position: Option<&Position>,
        policy: &GeofencePolicy,
        now: DateTime<Utc>,
    ) -> AppResult<CheckInReceipt> {
        if state.employee(username).is_some_and(|e| e.is_checked_in()) {
            return Err(AppError::AlreadyCheckedIn(normalize_username(username)));
        }

        let (site, reading) = Self::gate(state, username, position, policy)?;

        let emp = state
            .employee_mut(username)
            .ok_or_else(|| AppError::UnknownUser(normalize_username(username)))?;
        emp.mark_checked_in(now);
        let name = emp.username.clone();
        let company_id = emp.company_id.clone();

        if let Some(company) = company_id.as_deref().and_then(|id| state.company_mut(id)) {
            company.add_log(&name, format!("Check-In @ {}", site.name), now);
        }

        info!(user = %name, site = %site.id, distance_m = reading.distance_m, "checked in");

        Ok(CheckInReceipt {
            site_id: site.id,
            site_name: site.name,
            distance_m: reading.distance_m,
            at: now,
        })
    }

    /// Returns `None` (and changes nothing) when there is no employee record
    /// or the employee is already checked out.
    pub fn check_out(
        state: &mut AppState,
        username: &str,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<CheckOutReceipt> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_CHECK_OUT_REASON)
            .to_string();

        let emp = state.employee_mut(username)?;
        if !emp.is_checked_in() {
            return None;
        }

        let since = emp.check_in_time();
        emp.mark_checked_out();
        let name = emp.username.clone();
        let company_id = emp.company_id.clone();

        if let Some(company) = company_id.as_deref().and_then(|id| state.company_mut(id)) {
            company.add_log(&name, reason.clone(), now);
        }

        info!(user = %name, reason = %reason, "checked out");

        Some(CheckOutReceipt {
            reason,
            at: now,
            checked_in_since: since,
        })
    }

    /// Append one history sample for `username`. Returns false when there is
    /// no employee record to write to.
    pub fn record_history_point(
        state: &mut AppState,
        username: &str,
        position: &Position,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(emp) = state.employee_mut(username) else {
            return false;
        };
        let site_id = emp.assigned_site_id.clone();
        emp.push_history(HistoryPoint {
            position: position.point(),
            timestamp: now,
            site_id,
        });
        true
    }
}
