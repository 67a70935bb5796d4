//! The persisted application state: every company and every account,
//! serialized as one JSON blob.

use super::company::Company;
use super::user::{EmployeeRecord, UserRecord, normalize_username};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub companies: BTreeMap<String, Company>,
    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,
}

/// What [`AppState::from_json`] had to fix while loading.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub renamed_users: usize,
    pub repaired_status: usize,
    pub dropped_duplicates: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.renamed_users + self.repaired_status + self.dropped_duplicates > 0
    }
}

impl AppState {
    /// Parse a stored blob and normalize it.
    ///
    /// Missing `verified` flags are back-filled as `true` during deserialization;
    /// usernames are lowercased here (map keys, record fields, roster rows and logs).
    pub fn from_json(blob: &str) -> AppResult<(Self, MigrationReport)> {
        let mut state: AppState = serde_json::from_str(blob)?;
        let report = state.normalize();
        Ok((state, report))
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn normalize(&mut self) -> MigrationReport {
        let mut report = MigrationReport::default();

        let users = std::mem::take(&mut self.users);
        for (key, mut record) in users {
            let source = if record.username().trim().is_empty() {
                key.as_str()
            } else {
                record.username()
            };
            let normalized = normalize_username(source);

            if normalized != key || normalized != record.username() {
                report.renamed_users += 1;
            }
            record.set_username(normalized.clone());

            if let Some(emp) = record.as_employee_mut()
                && emp.repair_status()
            {
                report.repaired_status += 1;
            }

            if self.users.contains_key(&normalized) {
                // first record wins, later case-variants are discarded
                report.dropped_duplicates += 1;
                continue;
            }
            self.users.insert(normalized, record);
        }

        for company in self.companies.values_mut() {
            for row in company.employees.iter_mut() {
                let normalized = normalize_username(&row.username);
                if normalized != row.username {
                    row.username = normalized;
                    report.renamed_users += 1;
                }
            }
            for entry in company.logs.iter_mut() {
                entry.username = normalize_username(&entry.username);
            }
        }

        report
    }

    pub fn user(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(&normalize_username(username))
    }

    pub fn user_mut(&mut self, username: &str) -> Option<&mut UserRecord> {
        self.users.get_mut(&normalize_username(username))
    }

    pub fn employee(&self, username: &str) -> Option<&EmployeeRecord> {
        self.user(username).and_then(UserRecord::as_employee)
    }

    pub fn employee_mut(&mut self, username: &str) -> Option<&mut EmployeeRecord> {
        self.user_mut(username)
            .and_then(UserRecord::as_employee_mut)
    }

    pub fn company(&self, id: &str) -> Option<&Company> {
        self.companies.get(id)
    }

    pub fn company_mut(&mut self, id: &str) -> Option<&mut Company> {
        self.companies.get_mut(id)
    }
}
