//! The application store: in-memory state plus its persistence.
//!
//! All changes to [`AppState`] go through [`AppStore::mutate`], which works on a
//! copy, commits it only on success and persists it right away.

use crate::db::kv::KvBackend;
use crate::errors::AppResult;
use crate::models::state::AppState;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const STATE_KEY: &str = "state";
pub const SESSION_KEY: &str = "session";
pub const TRACKER_KEY: &str = "tracker";

pub struct AppStore {
    backend: Box<dyn KvBackend>,
    state: AppState,
}

impl AppStore {
    pub fn open(backend: Box<dyn KvBackend>) -> AppResult<Self> {
        let mut store = Self {
            backend,
            state: AppState::default(),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Replace the in-memory state with what is persisted.
    fn reload(&mut self) -> AppResult<()> {
        let Some(blob) = self.backend.load(STATE_KEY)? else {
            self.state = AppState::default();
            return Ok(());
        };

        let (state, report) = AppState::from_json(&blob)?;
        self.state = state;

        if report.changed() {
            warn!(?report, "normalized stored state");
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&mut self) -> AppResult<()> {
        let blob = self.state.to_json()?;
        self.backend.save(STATE_KEY, &blob)
    }

    /// Apply `f` to a copy of the state; on success commit and persist it,
    /// on error leave everything untouched.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut AppState) -> AppResult<T>) -> AppResult<T> {
        let mut draft = self.state.clone();
        let out = f(&mut draft)?;
        if draft != self.state {
            self.state = draft;
            self.persist()?;
        }
        Ok(out)
    }

    /// Last write wins: when another context changed the store, drop ours and
    /// take theirs in full. Returns true when a reload happened.
    pub fn sync_external(&mut self) -> AppResult<bool> {
        if !self.backend.changed_externally()? {
            return Ok(false);
        }
        debug!("store changed externally, replacing in-memory state");
        self.reload()?;
        Ok(true)
    }

    pub fn load_record<T: DeserializeOwned + Default>(&mut self, key: &str) -> AppResult<T> {
        match self.backend.load(key)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(T::default()),
        }
    }

    pub fn save_record<T: Serialize>(&mut self, key: &str, record: &T) -> AppResult<()> {
        let blob = serde_json::to_string(record)?;
        self.backend.save(key, &blob)
    }

    /// Audit failures never abort the user's action.
    pub fn audit(&mut self, operation: &str, target: &str, message: &str) {
        if let Err(e) = self.backend.audit(operation, target, message) {
            warn!(error = %e, operation, "failed to write internal log");
        }
    }
}
