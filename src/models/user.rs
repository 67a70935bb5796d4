use super::position::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of history samples kept per employee (oldest evicted first).
pub const MAX_HISTORY_POINTS: usize = 50;

/// Records written before verification existed are treated as verified.
fn legacy_verified() -> bool {
    true
}

/// Usernames are keys: trimmed and lowercased everywhere.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    CheckedIn,
    #[default]
    CheckedOut,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::CheckedIn => "checked-in",
            AttendanceStatus::CheckedOut => "checked-out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub position: GeoPoint,
    pub timestamp: DateTime<Utc>,
    pub site_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerRecord {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default = "legacy_verified")]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default = "legacy_verified")]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub assigned_site_id: Option<String>,
    #[serde(default)]
    status: AttendanceStatus,
    #[serde(default)]
    check_in_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub history: Vec<HistoryPoint>,
}

impl EmployeeRecord {
    pub fn new(username: &str, company_id: &str, contact: &str, verified: bool) -> Self {
        Self {
            username: normalize_username(username),
            company_id: Some(company_id.to_string()),
            verified,
            passcode: None,
            contact: contact.to_string(),
            assigned_site_id: None,
            status: AttendanceStatus::CheckedOut,
            check_in_time: None,
            history: Vec::new(),
        }
    }

    pub fn status(&self) -> AttendanceStatus {
        self.status
    }

    pub fn check_in_time(&self) -> Option<DateTime<Utc>> {
        self.check_in_time
    }

    pub fn is_checked_in(&self) -> bool {
        self.status == AttendanceStatus::CheckedIn
    }

    pub fn mark_checked_in(&mut self, at: DateTime<Utc>) {
        self.status = AttendanceStatus::CheckedIn;
        self.check_in_time = Some(at);
    }

    pub fn mark_checked_out(&mut self) {
        self.status = AttendanceStatus::CheckedOut;
        self.check_in_time = None;
    }

    /// Repair a record whose status and check-in time disagree.
    /// Returns true when something changed.
    pub(crate) fn repair_status(&mut self) -> bool {
        match (self.status, self.check_in_time) {
            (AttendanceStatus::CheckedIn, None) => {
                self.mark_checked_out();
                true
            }
            (AttendanceStatus::CheckedOut, Some(_)) => {
                self.check_in_time = None;
                true
            }
            _ => false,
        }
    }

    /// Append a sample and drop the oldest ones beyond [`MAX_HISTORY_POINTS`].
    pub fn push_history(&mut self, point: HistoryPoint) {
        self.history.push(point);
        if self.history.len() > MAX_HISTORY_POINTS {
            let excess = self.history.len() - MAX_HISTORY_POINTS;
            self.history.drain(..excess);
        }
    }
}

impl ManagerRecord {
    pub fn new(username: &str, company_id: &str, contact: &str) -> Self {
        Self {
            username: normalize_username(username),
            company_id: Some(company_id.to_string()),
            verified: false,
            passcode: None,
            contact: contact.to_string(),
        }
    }
}

/// A stored account. The `role` tag selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum UserRecord {
    Manager(ManagerRecord),
    Employee(EmployeeRecord),
}

impl UserRecord {
    pub fn username(&self) -> &str {
        match self {
            UserRecord::Manager(m) => &m.username,
            UserRecord::Employee(e) => &e.username,
        }
    }

    pub fn company_id(&self) -> Option<&str> {
        match self {
            UserRecord::Manager(m) => m.company_id.as_deref(),
            UserRecord::Employee(e) => e.company_id.as_deref(),
        }
    }

    pub fn is_verified(&self) -> bool {
        match self {
            UserRecord::Manager(m) => m.verified,
            UserRecord::Employee(e) => e.verified,
        }
    }

    pub fn passcode(&self) -> Option<&str> {
        match self {
            UserRecord::Manager(m) => m.passcode.as_deref(),
            UserRecord::Employee(e) => e.passcode.as_deref(),
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            UserRecord::Manager(_) => "manager",
            UserRecord::Employee(_) => "employee",
        }
    }

    pub fn set_verified(&mut self, verified: bool) {
        match self {
            UserRecord::Manager(m) => m.verified = verified,
            UserRecord::Employee(e) => e.verified = verified,
        }
    }

    pub(crate) fn set_username(&mut self, username: String) {
        match self {
            UserRecord::Manager(m) => m.username = username,
            UserRecord::Employee(e) => e.username = username,
        }
    }

    pub fn as_employee(&self) -> Option<&EmployeeRecord> {
        match self {
            UserRecord::Employee(e) => Some(e),
            UserRecord::Manager(_) => None,
        }
    }

    pub fn as_employee_mut(&mut self) -> Option<&mut EmployeeRecord> {
        match self {
            UserRecord::Employee(e) => Some(e),
            UserRecord::Manager(_) => None,
        }
    }
}
