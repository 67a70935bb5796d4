use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::dashboard::{print_dashboard, print_logs, print_table};
use crate::ui::messages::header;
use crate::utils::formatting::format_local;
use crate::utils::table::Table;

use super::open_app;

/// Handle `status`, `history` and `logs`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let app = open_app(cfg)?;

    match cmd {
        Commands::Status => print_dashboard(&app.dashboard_view()),
        Commands::History { user } => {
            let (username, points) = app.history_of(user.as_deref())?;
            header(format!("HISTORY OF {username}"));
            let mut table = Table::new(["Time", "Latitude", "Longitude", "Site"]);
            for p in points {
                table.add_row(vec![
                    format_local(p.timestamp),
                    format!("{:.6}", p.position.lat),
                    format!("{:.6}", p.position.lng),
                    p.site_id.clone().unwrap_or_else(|| "-".into()),
                ]);
            }
            print_table(&table, "No history recorded.");
        }
        Commands::Logs => {
            let (company_id, company) = app.managed_company()?;
            header(format!("ACTIVITY OF {company_id}"));
            print_logs(&company.logs);
        }
        _ => {}
    }

    Ok(())
}
