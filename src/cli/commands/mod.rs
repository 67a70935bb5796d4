pub mod account;
pub mod attendance;
pub mod backup;
pub mod config;
pub mod db;
pub mod employee;
pub mod export;
pub mod init;
pub mod log;
pub mod position;
pub mod site;
pub mod status;
pub mod track;

use crate::config::Config;
use crate::core::app::App;
use crate::core::clock::{Clock, SystemClock};
use crate::db::initialize::init_db;
use crate::db::kv::SqliteKv;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::geolocation::{FeedProvider, GeolocationProvider};
use crate::ui::dashboard::ConsolePresenter;
use crate::utils::path::expand_tilde;
use std::fs;
use std::io::Read;

/// Open the configured database, creating it and applying migrations if needed.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let path = expand_tilde(&cfg.database);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let pool = DbPool::new(&path.to_string_lossy())?;
    init_db(&pool.conn)?;
    Ok(pool)
}

/// Build the application for one CLI invocation.
pub(crate) fn open_app_with(
    cfg: &Config,
    provider: Box<dyn GeolocationProvider>,
    clock: Box<dyn Clock>,
    live: bool,
) -> AppResult<App> {
    let kv = SqliteKv::open(open_pool(cfg)?)?;
    App::new(
        Box::new(kv),
        provider,
        Box::new(ConsolePresenter::new(live)),
        clock,
        cfg.settings(),
    )
}

/// Application without a position source, for one-shot commands.
pub(crate) fn open_app(cfg: &Config) -> AppResult<App> {
    open_app_with(
        cfg,
        Box::new(FeedProvider::empty()),
        Box::new(SystemClock),
        false,
    )
}

/// Read a position feed from a file, or from stdin when `source` is `-`.
pub(crate) fn read_feed(source: &str) -> AppResult<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(expand_tilde(source))?)
    }
}
