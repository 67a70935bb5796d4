use crate::cli::parser::{Commands, EmployeeAction};
use crate::config::Config;
use crate::core::dashboard::SessionView;
use crate::core::directory::NewEmployee;
use crate::errors::{AppError, AppResult};
use crate::ui::dashboard::print_roster;
use crate::ui::messages::header;

use super::open_app;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Employee { action } = cmd else {
        return Ok(());
    };
    let mut app = open_app(cfg)?;

    match action {
        EmployeeAction::Add {
            username,
            contact,
            site,
            passcode,
        } => {
            app.register_employee(NewEmployee {
                username,
                contact,
                site_id: site.as_deref(),
                passcode: passcode.as_deref(),
            })?;
        }
        EmployeeAction::Remove { username } => {
            app.remove_employee(username)?;
        }
        EmployeeAction::List => {
            // fail with the precise reason when not a manager
            app.managed_company()?;
            match app.dashboard_view().session {
                SessionView::Manager(m) => {
                    header(format!("ROSTER OF {}", m.company_id));
                    print_roster(&m.roster);
                }
                _ => return Err(AppError::NotAuthorized("only managers see the roster".into())),
            }
        }
    }

    Ok(())
}
