//! Geolocation capability consumed by the location tracker.
//!
//! A provider hands out cancellable watches that deliver a sequence of
//! `Result<Position, GeoErrorCode>` samples, plus a one-shot lookup.

pub mod feed;

use crate::models::position::Position;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub use feed::FeedProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeoErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl GeoErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoErrorCode::PermissionDenied => "permission-denied",
            GeoErrorCode::PositionUnavailable => "position-unavailable",
            GeoErrorCode::Timeout => "timeout",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().replace('_', "-").as_str() {
            "permission-denied" | "denied" => Some(GeoErrorCode::PermissionDenied),
            "position-unavailable" | "unavailable" => Some(GeoErrorCode::PositionUnavailable),
            "timeout" => Some(GeoErrorCode::Timeout),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeoErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accuracy {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub accuracy: Accuracy,
    pub timeout: Duration,
    /// `None` accepts cached samples of any age.
    pub max_cache_age: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

pub type GeoSample = Result<Position, GeoErrorCode>;

pub trait GeolocationProvider {
    fn subscribe(&mut self, options: WatchOptions) -> WatchId;

    fn cancel(&mut self, id: WatchId);

    /// Next sample for an active watch; `None` once the source is exhausted
    /// or the watch is unknown.
    fn next_sample(&mut self, id: WatchId) -> Option<GeoSample>;

    fn current_position(&mut self, options: WatchOptions) -> GeoSample;
}

/// A shared handle, so the caller can keep feeding or inspecting a provider
/// that the tracker also owns.
impl<P: GeolocationProvider> GeolocationProvider for Rc<RefCell<P>> {
    fn subscribe(&mut self, options: WatchOptions) -> WatchId {
        self.borrow_mut().subscribe(options)
    }

    fn cancel(&mut self, id: WatchId) {
        self.borrow_mut().cancel(id)
    }

    fn next_sample(&mut self, id: WatchId) -> Option<GeoSample> {
        self.borrow_mut().next_sample(id)
    }

    fn current_position(&mut self, options: WatchOptions) -> GeoSample {
        self.borrow_mut().current_position(options)
    }
}
