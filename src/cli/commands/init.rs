use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

use super::open_pool;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the SQLite database with all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.as_deref(), cli.test)?;

    let cfg = Config {
        database: db_path.to_string_lossy().to_string(),
        ..Config::load()?
    };

    println!("⚙️  Initializing rattend…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &cfg.database);

    let pool = open_pool(&cfg)?;

    success(format!("Database initialized at {}", &cfg.database));

    if let Err(e) = log::ttlog(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    ) {
        warning(format!("Failed to write internal log: {e}"));
    }

    println!("🎉 rattend initialization completed!");
    Ok(())
}
