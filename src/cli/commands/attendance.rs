use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::utils::format_elapsed;

use super::open_app;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let mut app = open_app(cfg)?;

    match cmd {
        Commands::Checkin => {
            app.check_in()?;
        }
        Commands::Checkout { reason } => {
            if let Some(receipt) = app.check_out(reason.as_deref())?
                && let Some(since) = receipt.checked_in_since
            {
                println!("⏱️  Worked {}", format_elapsed(receipt.at - since));
            }
        }
        _ => {}
    }

    Ok(())
}
