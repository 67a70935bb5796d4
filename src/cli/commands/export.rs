use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::utils::path::expand_tilde;

use super::open_app;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        what,
        user,
        format,
        file,
        force,
    } = cmd
    {
        let mut app = open_app(cfg)?;
        let path = expand_tilde(file);
        let rows = ExportLogic::export(&app, *what, user.as_deref(), *format, &path, *force)?;
        if rows > 0 {
            app.audit(
                "export",
                &path.to_string_lossy(),
                &format!("{rows} rows as {}", format.as_str()),
            );
        }
    }
    Ok(())
}
