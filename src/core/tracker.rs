//! Location tracker: keeps the latest fix and runs the acquisition fallback.
//!
//! ```text
//! HighAccuracy --timeout/unavailable--> LowAccuracy
//!      |                                    |
//!      +------ permission denied -----------+--> stopped, manual override offered
//! any mode --use_manual--> Mock
//! ```

use crate::geolocation::{
    Accuracy, GeoErrorCode, GeoSample, GeolocationProvider, WatchId, WatchOptions,
};
use crate::models::position::{GeoPoint, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcquisitionMode {
    #[default]
    HighAccuracy,
    LowAccuracy,
    Mock,
}

impl AcquisitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionMode::HighAccuracy => "high-accuracy",
            AcquisitionMode::LowAccuracy => "low-accuracy",
            AcquisitionMode::Mock => "mock",
        }
    }
}

/// The persisted part of the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    #[serde(default)]
    pub last_known: Option<Position>,
    #[serde(default)]
    pub mode: AcquisitionMode,
    #[serde(default)]
    pub last_error: Option<GeoErrorCode>,
    /// Set after a permission error: automatic acquisition is off until a
    /// manual position is supplied or tracking is restarted.
    #[serde(default)]
    pub manual_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub high_accuracy_timeout: Duration,
    pub low_accuracy_timeout: Duration,
    pub login_fix_max_age: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            high_accuracy_timeout: Duration::from_secs(8),
            low_accuracy_timeout: Duration::from_secs(60),
            login_fix_max_age: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerEvent {
    Fix(Position),
    /// High accuracy failed with this code; now watching in low accuracy.
    Demoted(GeoErrorCode),
    /// Permission denied: auto-retry stopped, a manual position is needed.
    ManualOverrideRequired,
    /// Non-fatal error, the current watch stays in place.
    Error(GeoErrorCode),
}

/// Rejects "null island" and out-of-range fixes for site placement.
pub fn is_usable_fix(point: GeoPoint) -> bool {
    point.is_in_range() && !point.is_null_island()
}

pub struct LocationTracker {
    state: TrackerState,
    watch: Option<WatchId>,
    settings: TrackerSettings,
}

impl LocationTracker {
    pub fn new(state: TrackerState, settings: TrackerSettings) -> Self {
        Self {
            state,
            watch: None,
            settings,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn last_known(&self) -> Option<Position> {
        self.state.last_known
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.state.mode
    }

    pub fn last_error(&self) -> Option<GeoErrorCode> {
        self.state.last_error
    }

    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Latest fix if it is recent enough to gate a login.
    pub fn fresh_fix(&self, now: DateTime<Utc>) -> Option<Position> {
        let max_age = chrono::TimeDelta::from_std(self.settings.login_fix_max_age)
            .unwrap_or(chrono::TimeDelta::MAX);
        self.state
            .last_known
            .filter(|p| p.age(now) <= max_age)
    }

    fn options_for(&self, mode: AcquisitionMode) -> WatchOptions {
        match mode {
            AcquisitionMode::LowAccuracy => WatchOptions {
                accuracy: Accuracy::Low,
                timeout: self.settings.low_accuracy_timeout,
                max_cache_age: None,
            },
            AcquisitionMode::HighAccuracy | AcquisitionMode::Mock => WatchOptions {
                accuracy: Accuracy::High,
                timeout: self.settings.high_accuracy_timeout,
                max_cache_age: Some(Duration::ZERO),
            },
        }
    }

    fn subscribe(&mut self, provider: &mut dyn GeolocationProvider, mode: AcquisitionMode) {
        // never hold two watches at once
        self.cancel_watch(provider);
        let options = self.options_for(mode);
        self.state.mode = mode;
        self.watch = Some(provider.subscribe(options));
        debug!(mode = mode.as_str(), "position watch started");
    }

    fn cancel_watch(&mut self, provider: &mut dyn GeolocationProvider) {
        if let Some(id) = self.watch.take() {
            provider.cancel(id);
            debug!(watch = id.0, "position watch cancelled");
        }
    }

    /// (Re)start automatic acquisition from the high-accuracy tier.
    pub fn start(&mut self, provider: &mut dyn GeolocationProvider) {
        self.state.last_error = None;
        self.state.manual_required = false;
        self.subscribe(provider, AcquisitionMode::HighAccuracy);
    }

    pub fn stop(&mut self, provider: &mut dyn GeolocationProvider) {
        self.cancel_watch(provider);
    }

    /// Pull the next sample from the active watch, if any.
    pub fn poll(&mut self, provider: &mut dyn GeolocationProvider) -> Option<TrackerEvent> {
        let id = self.watch?;
        let sample = provider.next_sample(id)?;
        Some(self.handle(provider, sample))
    }

    pub fn handle(
        &mut self,
        provider: &mut dyn GeolocationProvider,
        sample: GeoSample,
    ) -> TrackerEvent {
        match sample {
            Ok(position) => {
                self.state.last_known = Some(position);
                self.state.last_error = None;
                TrackerEvent::Fix(position)
            }
            Err(code) => {
                self.state.last_error = Some(code);
                match (self.state.mode, code) {
                    (_, GeoErrorCode::PermissionDenied) => {
                        self.cancel_watch(provider);
                        self.state.manual_required = true;
                        warn!("location permission denied, automatic tracking stopped");
                        TrackerEvent::ManualOverrideRequired
                    }
                    (
                        AcquisitionMode::HighAccuracy,
                        GeoErrorCode::Timeout | GeoErrorCode::PositionUnavailable,
                    ) => {
                        self.subscribe(provider, AcquisitionMode::LowAccuracy);
                        info!(error = %code, "falling back to low-accuracy positioning");
                        TrackerEvent::Demoted(code)
                    }
                    _ => {
                        debug!(error = %code, mode = self.state.mode.as_str(), "position error");
                        TrackerEvent::Error(code)
                    }
                }
            }
        }
    }

    /// Inject a literal position, bypassing acquisition entirely.
    pub fn use_manual(
        &mut self,
        provider: &mut dyn GeolocationProvider,
        position: Position,
    ) -> Position {
        self.cancel_watch(provider);
        self.state.mode = AcquisitionMode::Mock;
        self.state.last_known = Some(position);
        self.state.last_error = None;
        self.state.manual_required = false;
        position
    }

    /// Forget the last fix; the watch, if any, stays in place.
    pub fn clear(&mut self) {
        self.state.last_known = None;
        self.state.last_error = None;
    }

    /// One-shot lookup in the current accuracy tier.
    pub fn locate_once(&mut self, provider: &mut dyn GeolocationProvider) -> TrackerEvent {
        let options = self.options_for(self.state.mode);
        match provider.current_position(options) {
            Ok(position) => {
                if self.state.mode == AcquisitionMode::Mock {
                    self.state.mode = AcquisitionMode::HighAccuracy;
                }
                self.state.last_known = Some(position);
                self.state.last_error = None;
                TrackerEvent::Fix(position)
            }
            Err(code) => {
                self.state.last_error = Some(code);
                if code == GeoErrorCode::PermissionDenied {
                    self.state.manual_required = true;
                    TrackerEvent::ManualOverrideRequired
                } else {
                    TrackerEvent::Error(code)
                }
            }
        }
    }
}
