//! Identity: registration, verification and login gating.

use super::attendance::AttendanceLogic;
use super::geofence::{FenceReading, GeofencePolicy};
use crate::errors::{AppError, AppResult};
use crate::models::company::{Company, EmployeeSummary};
use crate::models::position::Position;
use crate::models::session::{PendingLogin, SessionRecord};
use crate::models::state::AppState;
use crate::models::user::{EmployeeRecord, ManagerRecord, UserRecord, normalize_username};
use chrono::{DateTime, Utc};
use rand::RngExt;
use tracing::debug;

/// Length of the simulated verification code.
const CODE_DIGITS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    SignedIn { username: String, role: &'static str },
    /// Employee login waiting for a position fix.
    Deferred { username: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub company_id: String,
    pub code: String,
}

fn required<'a>(value: &'a str, field: &'static str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn issue_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_DIGITS)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// `ACME1234`: up to six alphanumerics of the name plus a random 4-digit suffix.
fn company_id_for(name: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut prefix: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(6)
        .collect::<String>()
        .to_uppercase();
    if prefix.is_empty() {
        prefix = "CO".to_string();
    }

    let mut rng = rand::rng();
    loop {
        let candidate = format!("{prefix}{}", rng.random_range(1000..10000u32));
        if !taken(&candidate) {
            return candidate;
        }
    }
}

pub struct SessionLogic;

impl SessionLogic {
    /// A manager registers a new company; the manager account starts unverified.
    pub fn register_company(
        state: &mut AppState,
        session: &mut SessionRecord,
        company_name: &str,
        manager: &str,
        contact: &str,
        passcode: Option<&str>,
    ) -> AppResult<Registration> {
        let company_name = required(company_name, "company name")?;
        let username = normalize_username(required(manager, "username")?);

        if state.users.contains_key(&username) {
            return Err(AppError::DuplicateUser(username));
        }

        let company_id = company_id_for(company_name, |id| state.companies.contains_key(id));
        state
            .companies
            .insert(company_id.clone(), Company::new(company_name));

        let mut record = ManagerRecord::new(&username, &company_id, contact.trim());
        record.passcode = passcode.map(str::to_string).filter(|p| !p.is_empty());
        state
            .users
            .insert(username.clone(), UserRecord::Manager(record));

        let code = issue_code();
        session.queue_verification(&username, &code);

        debug!(company = %company_id, user = %username, "company registered");
        Ok(Registration {
            username,
            company_id,
            code,
        })
    }

    /// An employee signs up against an existing company.
    pub fn register_employee_self(
        state: &mut AppState,
        session: &mut SessionRecord,
        company_id: &str,
        username: &str,
        contact: &str,
        passcode: Option<&str>,
    ) -> AppResult<Registration> {
        let company_id = required(company_id, "company id")?.to_uppercase();
        let username = normalize_username(required(username, "username")?);

        if state.company(&company_id).is_none() {
            return Err(AppError::WrongCompany(company_id));
        }

        let passcode = passcode.map(str::to_string).filter(|p| !p.is_empty());

        match state.users.get_mut(&username) {
            Some(UserRecord::Manager(_)) => return Err(AppError::DuplicateUser(username)),
            Some(UserRecord::Employee(emp)) => {
                if emp.company_id.as_deref() != Some(company_id.as_str()) {
                    return Err(AppError::UserBelongsElsewhere(username));
                }
                if emp.verified {
                    return Err(AppError::DuplicateUser(username));
                }
                // unfinished sign-up: refresh details and issue a new code
                emp.passcode = passcode;
                if !contact.trim().is_empty() {
                    emp.contact = contact.trim().to_string();
                }
            }
            None => {
                let mut record = EmployeeRecord::new(&username, &company_id, contact.trim(), false);
                record.passcode = passcode;
                state
                    .users
                    .insert(username.clone(), UserRecord::Employee(record));
            }
        }

        if let Some(company) = state.company_mut(&company_id) {
            let assigned_site_id = company
                .roster_entry(&username)
                .and_then(|r| r.assigned_site_id.clone());
            company.upsert_roster(EmployeeSummary {
                username: username.clone(),
                contact: contact.trim().to_string(),
                assigned_site_id,
            });
        }

        let code = issue_code();
        session.queue_verification(&username, &code);

        Ok(Registration {
            username,
            company_id,
            code,
        })
    }

    /// Confirm the pending account whose code matches. A wrong code leaves
    /// every pending entry intact.
    pub fn verify_account(
        state: &mut AppState,
        session: &mut SessionRecord,
        code: &str,
    ) -> AppResult<String> {
        if session.pending_verifications.is_empty() {
            return Err(AppError::NothingToVerify);
        }

        let code = code.trim();
        let username = session
            .pending_verifications
            .iter()
            .find(|p| p.code == code)
            .map(|p| p.username.clone())
            .ok_or(AppError::VerificationFailed)?;

        let user = state
            .user_mut(&username)
            .ok_or_else(|| AppError::UnknownUser(username.clone()))?;
        user.set_verified(true);
        session
            .pending_verifications
            .retain(|p| p.username != username);
        Ok(username)
    }

    /// Credential checks shared by every login path.
    fn authenticate<'a>(
        state: &'a AppState,
        username: &str,
        passcode: Option<&str>,
    ) -> AppResult<&'a UserRecord> {
        let username = normalize_username(required(username, "username")?);
        let user = state
            .user(&username)
            .ok_or_else(|| AppError::UnknownUser(username.clone()))?;

        if !user.is_verified() {
            return Err(AppError::NotVerified(username));
        }
        match (user.passcode(), passcode) {
            (None, _) => {}
            (Some(expected), Some(given)) if expected == given => {}
            _ => return Err(AppError::BadCredentials),
        }
        if let Some(cid) = user.company_id()
            && state.company(cid).is_none()
        {
            return Err(AppError::CompanyMissing(cid.to_string()));
        }
        Ok(user)
    }

    /// Managers sign in directly. Employees need a fresh fix inside the fence;
    /// without one the login is deferred until a position arrives.
    pub fn login(
        state: &AppState,
        session: &mut SessionRecord,
        username: &str,
        passcode: Option<&str>,
        fresh_fix: Option<&Position>,
        policy: &GeofencePolicy,
        now: DateTime<Utc>,
    ) -> AppResult<LoginOutcome> {
        let user = Self::authenticate(state, username, passcode)?;
        let username = user.username().to_string();

        match user {
            UserRecord::Manager(_) => {
                session.pending_login = None;
                session.current = Some(username.clone());
                Ok(LoginOutcome::SignedIn {
                    username,
                    role: "manager",
                })
            }
            UserRecord::Employee(_) => {
                // referential problems block the login before any waiting
                AttendanceLogic::assigned_site(state, &username)?;

                if fresh_fix.is_none() {
                    session.pending_login = Some(PendingLogin {
                        username: username.clone(),
                        requested_at: now,
                    });
                    return Ok(LoginOutcome::Deferred { username });
                }

                Self::complete_login(state, session, &username, fresh_fix, policy)?;
                Ok(LoginOutcome::SignedIn {
                    username,
                    role: "employee",
                })
            }
        }
    }

    /// Finish an employee login once a fix is available. Clears the pending
    /// login whatever the outcome.
    pub fn complete_login(
        state: &AppState,
        session: &mut SessionRecord,
        username: &str,
        position: Option<&Position>,
        policy: &GeofencePolicy,
    ) -> AppResult<FenceReading> {
        session.pending_login = None;
        let (_, reading) = AttendanceLogic::gate(state, username, position, policy)?;
        session.current = Some(normalize_username(username));
        Ok(reading)
    }
}
