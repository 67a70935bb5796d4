//! rattend library root.
//! Exposes the CLI parser, the high-level run() function, and the core
//! attendance engine used by the CLI and by tests.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod geolocation;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    use cli::commands;

    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::Company { .. }
        | Commands::Signup { .. }
        | Commands::Verify { .. }
        | Commands::Login { .. }
        | Commands::Logout => commands::account::handle(&cli.command, cfg),
        Commands::Checkin | Commands::Checkout { .. } => {
            commands::attendance::handle(&cli.command, cfg)
        }
        Commands::Position { .. } => commands::position::handle(&cli.command, cfg),
        Commands::Site { .. } => commands::site::handle(&cli.command, cfg),
        Commands::Employee { .. } => commands::employee::handle(&cli.command, cfg),
        Commands::Status | Commands::History { .. } | Commands::Logs => {
            commands::status::handle(&cli.command, cfg)
        }
        Commands::Track { .. } => commands::track::handle(&cli.command, cfg),
        Commands::Backup { .. } => commands::backup::handle(&cli.command, cfg),
        Commands::Export { .. } => commands::export::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // the configuration is loaded once, then the --db override applies
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}
