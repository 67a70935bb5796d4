use crate::cli::parser::{Commands, CompanyAction};
use crate::config::Config;
use crate::core::session::{LoginOutcome, Registration};
use crate::errors::AppResult;
use crate::ui::messages::info;

use super::open_app;

/// Verification codes are not delivered anywhere; print them instead.
fn show_code(reg: &Registration) {
    info(format!(
        "Verification code for {} (simulated delivery): {}",
        reg.username, reg.code
    ));
    info(format!("Confirm with: rattend verify {}", reg.code));
}

/// Handle `company`, `signup`, `verify`, `login` and `logout`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let mut app = open_app(cfg)?;

    match cmd {
        Commands::Company {
            action:
                CompanyAction::Register {
                    name,
                    manager,
                    contact,
                    passcode,
                },
        } => {
            let reg = app.register_company(name, manager, contact, passcode.as_deref())?;
            println!("🏢 Company id: {}", reg.company_id);
            show_code(&reg);
        }
        Commands::Signup {
            company,
            username,
            contact,
            passcode,
        } => {
            let reg = app.register_employee_self(company, username, contact, passcode.as_deref())?;
            show_code(&reg);
        }
        Commands::Verify { code } => {
            app.verify_account(code)?;
        }
        Commands::Login { username, passcode } => {
            if let LoginOutcome::Deferred { .. } = app.login(username, passcode.as_deref())? {
                info("Set or stream a position (rattend position set / rattend track) to finish.");
            }
        }
        Commands::Logout => {
            if !app.session().is_signed_in() {
                info("Nobody is signed in.");
            }
            app.logout()?;
        }
        _ => {}
    }

    Ok(())
}
