//! Company directory: sites and the employee roster, manager-only.

use super::tracker::is_usable_fix;
use crate::errors::{AppError, AppResult};
use crate::models::company::{Company, EmployeeSummary};
use crate::models::position::Position;
use crate::models::site::Site;
use crate::models::state::AppState;
use crate::models::user::{EmployeeRecord, UserRecord, normalize_username};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct NewEmployee<'a> {
    pub username: &'a str,
    pub contact: &'a str,
    pub site_id: Option<&'a str>,
    pub passcode: Option<&'a str>,
}

pub struct DirectoryLogic;

impl DirectoryLogic {
    /// Company id of `manager`, failing unless the account is a manager whose
    /// company record exists.
    pub fn managed_company(state: &AppState, manager: &str) -> AppResult<String> {
        let user = state
            .user(manager)
            .ok_or_else(|| AppError::UnknownUser(normalize_username(manager)))?;

        let company_id = match user {
            UserRecord::Manager(m) => m.company_id.clone(),
            UserRecord::Employee(_) => {
                return Err(AppError::NotAuthorized(
                    "only managers can change the directory".into(),
                ));
            }
        }
        .ok_or_else(|| AppError::CompanyMissing(String::from("(none)")))?;

        if state.company(&company_id).is_none() {
            return Err(AppError::CompanyMissing(company_id));
        }
        Ok(company_id)
    }

    fn company_of<'a>(state: &'a mut AppState, company_id: &str) -> AppResult<&'a mut Company> {
        state
            .company_mut(company_id)
            .ok_or_else(|| AppError::CompanyMissing(company_id.to_string()))
    }

    fn placement(position: Option<&Position>) -> AppResult<Position> {
        let position = *position.ok_or(AppError::NoPosition)?;
        if !is_usable_fix(position.point()) {
            return Err(AppError::InvalidCoordinates(format!(
                "{} is not a usable fix",
                position.point()
            )));
        }
        Ok(position)
    }

    /// Create a site at the manager's current position.
    pub fn create_site(
        state: &mut AppState,
        manager: &str,
        name: &str,
        position: Option<&Position>,
    ) -> AppResult<Site> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::MissingField("site name"));
        }
        let company_id = Self::managed_company(state, manager)?;
        let at = Self::placement(position)?;

        let company = Self::company_of(state, &company_id)?;
        // sites are never deleted, so the sequence only grows
        let mut seq = company.sites.len() + 1;
        let mut id = format!("{company_id}-S{seq}");
        while company.site(&id).is_some() {
            seq += 1;
            id = format!("{company_id}-S{seq}");
        }

        let site = Site::new(id, name, at.point());
        company.sites.push(site.clone());
        debug!(site = %site.id, "site created");
        Ok(site)
    }

    /// Move an existing site to the manager's current position.
    pub fn update_site_location(
        state: &mut AppState,
        manager: &str,
        site_id: &str,
        position: Option<&Position>,
    ) -> AppResult<Site> {
        let company_id = Self::managed_company(state, manager)?;
        let at = Self::placement(position)?;

        let company = Self::company_of(state, &company_id)?;
        let site = company
            .site_mut(site_id.trim())
            .ok_or_else(|| AppError::SiteMissing(site_id.trim().to_string()))?;
        site.relocate(at.point());
        Ok(site.clone())
    }

    /// Register (or re-assign) an employee. Manager-created accounts are verified.
    pub fn register_employee(
        state: &mut AppState,
        manager: &str,
        new: NewEmployee<'_>,
    ) -> AppResult<EmployeeSummary> {
        let username = normalize_username(new.username);
        if username.is_empty() {
            return Err(AppError::MissingField("username"));
        }
        let company_id = Self::managed_company(state, manager)?;

        let site_id = match new.site_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(sid) => {
                let company = Self::company_of(state, &company_id)?;
                if company.site(sid).is_none() {
                    return Err(AppError::SiteMissing(sid.to_string()));
                }
                Some(sid.to_string())
            }
            None => None,
        };

        let contact = new.contact.trim().to_string();
        let passcode = new.passcode.map(str::to_string).filter(|p| !p.is_empty());

        match state.users.get_mut(&username) {
            Some(UserRecord::Manager(_)) => return Err(AppError::DuplicateUser(username)),
            Some(UserRecord::Employee(emp)) => {
                if emp.company_id.as_deref() != Some(company_id.as_str()) {
                    return Err(AppError::UserBelongsElsewhere(username));
                }
                emp.assigned_site_id = site_id.clone();
                emp.verified = true;
                if !contact.is_empty() {
                    emp.contact = contact.clone();
                }
                if passcode.is_some() {
                    emp.passcode = passcode;
                }
            }
            None => {
                let mut record = EmployeeRecord::new(&username, &company_id, &contact, true);
                record.assigned_site_id = site_id.clone();
                record.passcode = passcode;
                state
                    .users
                    .insert(username.clone(), UserRecord::Employee(record));
            }
        }

        let contact = state
            .employee(&username)
            .map(|e| e.contact.clone())
            .unwrap_or(contact);
        let summary = EmployeeSummary {
            username,
            contact,
            assigned_site_id: site_id,
        };
        Self::company_of(state, &company_id)?.upsert_roster(summary.clone());
        Ok(summary)
    }

    /// Remove an employee from the roster and delete the account in one step.
    pub fn remove_employee(state: &mut AppState, manager: &str, username: &str) -> AppResult<()> {
        let username = normalize_username(username);
        let company_id = Self::managed_company(state, manager)?;

        match state.users.get(&username) {
            None => return Err(AppError::UnknownUser(username)),
            Some(UserRecord::Manager(_)) => {
                return Err(AppError::NotAuthorized("managers cannot be removed".into()));
            }
            Some(UserRecord::Employee(emp)) => {
                if emp.company_id.as_deref() != Some(company_id.as_str()) {
                    return Err(AppError::UserBelongsElsewhere(username));
                }
            }
        }

        Self::company_of(state, &company_id)?.remove_roster(&username);
        state.users.remove(&username);
        Ok(())
    }
}
