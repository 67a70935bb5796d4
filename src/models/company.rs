use super::site::Site;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of attendance log entries kept per company (newest first).
pub const MAX_COMPANY_LOGS: usize = 20;

/// Denormalized roster row kept on the company record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub username: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub assigned_site_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub username: String,
    pub action: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub employees: Vec<EmployeeSummary>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sites: Vec::new(),
            employees: Vec::new(),
            logs: Vec::new(),
        }
    }

    pub fn site(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    pub fn site_mut(&mut self, id: &str) -> Option<&mut Site> {
        self.sites.iter_mut().find(|s| s.id == id)
    }

    pub fn roster_entry(&self, username: &str) -> Option<&EmployeeSummary> {
        self.employees.iter().find(|e| e.username == username)
    }

    /// Insert or replace the roster row for `summary.username`.
    pub fn upsert_roster(&mut self, summary: EmployeeSummary) {
        match self
            .employees
            .iter_mut()
            .find(|e| e.username == summary.username)
        {
            Some(existing) => *existing = summary,
            None => self.employees.push(summary),
        }
    }

    pub fn remove_roster(&mut self, username: &str) -> bool {
        let before = self.employees.len();
        self.employees.retain(|e| e.username != username);
        before != self.employees.len()
    }

    /// Prepend a log entry, evicting the oldest ones beyond [`MAX_COMPANY_LOGS`].
    pub fn add_log(&mut self, username: &str, action: impl Into<String>, time: DateTime<Utc>) {
        self.logs.insert(
            0,
            LogEntry {
                username: username.to_string(),
                action: action.into(),
                time,
            },
        );
        self.logs.truncate(MAX_COMPANY_LOGS);
    }
}
