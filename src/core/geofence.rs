//! Geofence evaluation.
//!
//! Two thresholds, one policy:
//! - gating (login, check-in) uses the strict radius;
//! - automatic check-out fires only beyond radius + an additive exit buffer.

use super::distance::distance_meters;
use crate::models::position::GeoPoint;
use crate::models::site::Site;
use crate::models::state::AppState;
use serde::{Deserialize, Serialize};

pub const MAX_DISTANCE_METERS: f64 = 100.0;
pub const DEFAULT_EXIT_BUFFER_METERS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofencePolicy {
    pub radius_m: f64,
    pub exit_buffer_m: f64,
}

impl Default for GeofencePolicy {
    fn default() -> Self {
        Self {
            radius_m: MAX_DISTANCE_METERS,
            exit_buffer_m: DEFAULT_EXIT_BUFFER_METERS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FenceReading {
    pub distance_m: f64,
    pub within_fence: bool,
}

/// Outcome of a reactive pass for one employee.
#[derive(Debug, Clone, PartialEq)]
pub enum GeofenceVerdict {
    /// Not an employee, or not checked in: nothing to enforce.
    NotApplicable,
    Inside { site_name: String, reading: FenceReading },
    Exited { site_name: String, reading: FenceReading },
    /// Checked in against a site that no longer resolves.
    SiteMissing { site_id: Option<String> },
}

impl GeofencePolicy {
    pub fn exit_limit_m(&self) -> f64 {
        self.radius_m + self.exit_buffer_m
    }

    /// Strict containment, used to gate login and check-in.
    pub fn evaluate(&self, position: GeoPoint, site: &Site) -> FenceReading {
        let distance_m = distance_meters(position, site.point());
        FenceReading {
            distance_m,
            within_fence: distance_m <= self.radius_m,
        }
    }

    /// Buffered containment, used to decide automatic check-out.
    pub fn exit_check(&self, position: GeoPoint, site: &Site) -> FenceReading {
        let distance_m = distance_meters(position, site.point());
        FenceReading {
            distance_m,
            within_fence: distance_m <= self.exit_limit_m(),
        }
    }

    /// Reactive pass run whenever a new position arrives for `username`.
    pub fn evaluate_employee(
        &self,
        state: &AppState,
        username: &str,
        position: GeoPoint,
    ) -> GeofenceVerdict {
        let Some(emp) = state.employee(username) else {
            return GeofenceVerdict::NotApplicable;
        };
        if !emp.is_checked_in() {
            return GeofenceVerdict::NotApplicable;
        }

        let site = emp
            .company_id
            .as_deref()
            .and_then(|cid| state.company(cid))
            .zip(emp.assigned_site_id.as_deref())
            .and_then(|(company, sid)| company.site(sid));

        let Some(site) = site else {
            return GeofenceVerdict::SiteMissing {
                site_id: emp.assigned_site_id.clone(),
            };
        };

        let reading = self.exit_check(position, site);
        if reading.within_fence {
            GeofenceVerdict::Inside {
                site_name: site.name.clone(),
                reading,
            }
        } else {
            GeofenceVerdict::Exited {
                site_name: site.name.clone(),
                reading,
            }
        }
    }
}
