use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account waiting for its verification code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerification {
    pub username: String,
    pub code: String,
}

/// An employee login waiting for a usable position fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLogin {
    pub username: String,
    pub requested_at: DateTime<Utc>,
}

/// Who is using this execution context right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub pending_login: Option<PendingLogin>,
    /// One entry per account; a new registration never displaces another
    /// account's code.
    #[serde(default)]
    pub pending_verifications: Vec<PendingVerification>,
}

impl SessionRecord {
    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn pending_code_for(&self, username: &str) -> Option<&str> {
        self.pending_verifications
            .iter()
            .find(|p| p.username == username)
            .map(|p| p.code.as_str())
    }

    /// Record a code for `username`, replacing only that account's previous one.
    pub fn queue_verification(&mut self, username: &str, code: &str) {
        self.pending_verifications.retain(|p| p.username != username);
        self.pending_verifications.push(PendingVerification {
            username: username.to_string(),
            code: code.to_string(),
        });
    }
}
