// src/export/model.rs

use crate::models::company::LogEntry;
use crate::models::user::HistoryPoint;
use serde::Serialize;

/// Flat row for the company activity log.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LogExport {
    pub company_id: String,
    pub time: String,
    pub username: String,
    pub action: String,
}

impl LogExport {
    pub fn from_entry(company_id: &str, e: &LogEntry) -> Self {
        Self {
            company_id: company_id.to_string(),
            time: e.time.to_rfc3339(),
            username: e.username.clone(),
            action: e.action.clone(),
        }
    }
}

/// Flat row for one location history sample.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HistoryExport {
    pub username: String,
    pub timestamp: String,
    pub lat: f64,
    pub lng: f64,
    pub site_id: String,
}

impl HistoryExport {
    pub fn from_point(username: &str, p: &HistoryPoint) -> Self {
        Self {
            username: username.to_string(),
            timestamp: p.timestamp.to_rfc3339(),
            lat: p.position.lat,
            lng: p.position.lng,
            site_id: p.site_id.clone().unwrap_or_default(),
        }
    }
}
