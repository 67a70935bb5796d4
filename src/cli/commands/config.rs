use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
    } = cmd
    {
        if *print_config {
            println!("📄 Current configuration ({}):\n", Config::config_file().display());
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        if *check {
            cfg.validate()?;
            let s = cfg.settings();
            success(format!(
                "Configuration is valid: radius {} m, exit buffer {} m, history every {}s",
                s.geofence.radius_m,
                s.geofence.exit_buffer_m,
                s.timers.history_interval.as_secs()
            ));
        }
    }

    Ok(())
}
