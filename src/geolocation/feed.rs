//! A geolocation provider that replays a recorded position feed.
//!
//! Feed format, one sample per line (blank lines and `#` comments ignored):
//!
//! ```text
//! [<rfc3339 timestamp>] <lat> <lng>
//! [<rfc3339 timestamp>] error <permission-denied|position-unavailable|timeout>
//! ```
//!
//! When a line carries a timestamp the shared [`ManualClock`] (if any) is moved
//! to it before the sample is handed out.

use super::{GeoErrorCode, GeoSample, GeolocationProvider, WatchId, WatchOptions};
use crate::core::clock::{Clock, ManualClock};
use crate::errors::{AppError, AppResult};
use crate::models::position::{GeoPoint, Position};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::OnceLock;

fn line_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<at>\d{4}-\d{2}-\d{2}T\S+)\s+)?(?:error\s+(?P<code>[A-Za-z_-]+)|(?P<lat>[-+]?\d+(?:\.\d+)?)\s*[,\s]\s*(?P<lng>[-+]?\d+(?:\.\d+)?))$",
        )
        .expect("feed line pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedSample {
    Fix { lat: f64, lng: f64 },
    Error(GeoErrorCode),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedEntry {
    pub at: Option<DateTime<Utc>>,
    pub sample: FeedSample,
}

/// Subscription bookkeeping, exposed so callers can inspect what the tracker did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Subscribed(WatchId, WatchOptions),
    Cancelled(WatchId),
}

#[derive(Debug, Default)]
pub struct FeedProvider {
    entries: VecDeque<FeedEntry>,
    active: Vec<WatchId>,
    next_id: u64,
    clock: Option<ManualClock>,
    events: Vec<WatchEvent>,
}

impl FeedProvider {
    /// A provider with nothing to deliver.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = FeedEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn parse(text: &str) -> AppResult<Self> {
        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            entries.push(parse_line(line, idx + 1)?);
        }
        Ok(Self::from_entries(entries))
    }

    /// Share a clock that follows the feed's timestamps.
    pub fn with_clock(mut self, clock: ManualClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn push(&mut self, entry: FeedEntry) {
        self.entries.push_back(entry);
    }

    /// Timestamp of the first timestamped entry still queued.
    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.entries.iter().find_map(|e| e.at)
    }

    pub fn remaining(&self) -> usize {
        self.entries.len()
    }

    pub fn events(&self) -> &[WatchEvent] {
        &self.events
    }

    pub fn active_watches(&self) -> &[WatchId] {
        &self.active
    }

    fn pop_sample(&mut self) -> Option<GeoSample> {
        let entry = self.entries.pop_front()?;

        if let (Some(at), Some(clock)) = (entry.at, &self.clock) {
            clock.set(at);
        }
        let captured_at = entry
            .at
            .or_else(|| self.clock.as_ref().map(|c| c.now()))
            .unwrap_or_else(Utc::now);

        Some(match entry.sample {
            FeedSample::Fix { lat, lng } => Ok(Position::new(lat, lng, captured_at)),
            FeedSample::Error(code) => Err(code),
        })
    }
}

fn parse_line(line: &str, number: usize) -> AppResult<FeedEntry> {
    let invalid = |reason: String| AppError::InvalidFeed {
        line: number,
        reason,
    };

    let caps = line_pattern()
        .captures(line)
        .ok_or_else(|| invalid(format!("cannot parse '{line}'")))?;

    let at = match caps.name("at") {
        Some(m) => Some(
            DateTime::parse_from_rfc3339(m.as_str())
                .map_err(|e| invalid(format!("bad timestamp '{}': {e}", m.as_str())))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    let sample = if let Some(code) = caps.name("code") {
        let code = GeoErrorCode::from_code(code.as_str())
            .ok_or_else(|| invalid(format!("unknown error code '{}'", code.as_str())))?;
        FeedSample::Error(code)
    } else {
        let lat: f64 = caps["lat"]
            .parse()
            .map_err(|_| invalid("bad latitude".into()))?;
        let lng: f64 = caps["lng"]
            .parse()
            .map_err(|_| invalid("bad longitude".into()))?;
        if !GeoPoint::new(lat, lng).is_in_range() {
            return Err(invalid(format!("coordinates {lat}, {lng} out of range")));
        }
        FeedSample::Fix { lat, lng }
    };

    Ok(FeedEntry { at, sample })
}

impl GeolocationProvider for FeedProvider {
    fn subscribe(&mut self, options: WatchOptions) -> WatchId {
        self.next_id += 1;
        let id = WatchId(self.next_id);
        self.active.push(id);
        self.events.push(WatchEvent::Subscribed(id, options));
        id
    }

    fn cancel(&mut self, id: WatchId) {
        if let Some(pos) = self.active.iter().position(|w| *w == id) {
            self.active.remove(pos);
            self.events.push(WatchEvent::Cancelled(id));
        }
    }

    fn next_sample(&mut self, id: WatchId) -> Option<GeoSample> {
        if !self.active.contains(&id) {
            return None;
        }
        self.pop_sample()
    }

    fn current_position(&mut self, _options: WatchOptions) -> GeoSample {
        self.pop_sample()
            .unwrap_or(Err(GeoErrorCode::PositionUnavailable))
    }
}
