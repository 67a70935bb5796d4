//! Unified application error type.
//! All modules (db, core, cli, geolocation) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / storage
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Stored state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Input validation
    // ---------------------------
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid position feed line {line}: {reason}")]
    InvalidFeed { line: usize, reason: String },

    // ---------------------------
    // Authorization / ownership
    // ---------------------------
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Not allowed: {0}")]
    NotAuthorized(String),

    #[error("Username '{0}' is already taken")]
    DuplicateUser(String),

    #[error("Unknown user '{0}'")]
    UnknownUser(String),

    #[error("User '{0}' belongs to another company")]
    UserBelongsElsewhere(String),

    #[error("Company '{0}' does not exist")]
    WrongCompany(String),

    #[error("Wrong username or passcode")]
    BadCredentials,

    #[error("Account '{0}' is not verified yet")]
    NotVerified(String),

    // ---------------------------
    // Verification
    // ---------------------------
    #[error("No account is waiting for verification")]
    NothingToVerify,

    #[error("Verification code does not match")]
    VerificationFailed,

    // ---------------------------
    // Attendance / geofence
    // ---------------------------
    #[error("Current location is not known yet")]
    NoPosition,

    #[error("Too far from the assigned site ({distance_m:.0} m, limit {limit_m:.0} m)")]
    OutsideGeofence { distance_m: f64, limit_m: f64 },

    #[error("'{0}' is already checked in")]
    AlreadyCheckedIn(String),

    // ---------------------------
    // Referential integrity
    // ---------------------------
    #[error("No site is assigned to '{0}'; ask your manager to assign one")]
    NoAssignedSite(String),

    #[error("Site '{0}' no longer exists; ask your manager to fix the assignment")]
    SiteMissing(String),

    #[error("Company record '{0}' is missing; manager intervention required")]
    CompanyMissing(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
