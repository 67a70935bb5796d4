use crate::cli::parser::{Commands, SiteAction};
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::dashboard::print_sites;
use crate::ui::messages::header;

use super::open_app;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Site { action } = cmd else {
        return Ok(());
    };
    let mut app = open_app(cfg)?;

    match action {
        SiteAction::Create { name } => {
            app.create_site(name)?;
        }
        SiteAction::Relocate { site_id } => {
            app.update_site_location(site_id)?;
        }
        SiteAction::List => {
            let (company_id, company) = app.managed_company()?;
            header(format!("SITES OF {company_id}"));
            print_sites(&company.sites);
        }
    }

    Ok(())
}
