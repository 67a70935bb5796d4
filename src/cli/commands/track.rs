use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::ManualClock;
use crate::errors::AppResult;
use crate::geolocation::FeedProvider;
use crate::ui::messages::info;
use chrono::Utc;
use tracing::debug;

use super::{open_app_with, read_feed};

/// Replay a position feed as one live session: samples are delivered in
/// order, timers fire by feed time and external changes are picked up
/// between samples.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Track { feed } = cmd else {
        return Ok(());
    };

    let provider = FeedProvider::parse(&read_feed(feed)?)?;
    let clock = ManualClock::new(provider.first_timestamp().unwrap_or_else(Utc::now));
    let provider = provider.with_clock(clock.clone());
    let total = provider.remaining();

    let mut app = open_app_with(cfg, Box::new(provider), Box::new(clock), true)?;
    app.start_tracking()?;

    let mut delivered = 0usize;
    loop {
        app.sync_external()?;
        if !app.pump()? {
            break;
        }
        delivered += 1;
        let due = app.tick()?;
        debug!(?due, delivered, "feed step");
    }

    let watching = app.tracker().is_watching();
    app.shutdown()?;

    info(format!("Processed {delivered} of {total} feed entries."));
    if !watching && delivered < total {
        info("Automatic tracking stopped before the end of the feed.");
    }
    Ok(())
}
