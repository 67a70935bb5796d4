use crate::cli::parser::{Commands, PositionAction};
use crate::config::Config;
use crate::core::clock::SystemClock;
use crate::core::tracker::TrackerEvent;
use crate::errors::AppResult;
use crate::geolocation::FeedProvider;
use crate::ui::messages::{info, success};
use crate::utils::colors::{CYAN, RESET};
use crate::utils::format_elapsed;

use super::{open_app, open_app_with, read_feed};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Position { action } = cmd else {
        return Ok(());
    };

    match action {
        PositionAction::Set { lat, lng } => {
            let mut app = open_app(cfg)?;
            let p = app.use_manual_position(*lat, *lng)?;
            success(format!("Manual position set: {}", p.point()));
        }
        PositionAction::Clear => {
            let mut app = open_app(cfg)?;
            app.clear_position()?;
            success("Position cleared.");
        }
        PositionAction::Show => {
            let app = open_app(cfg)?;
            let tracker = app.tracker();
            match app.position() {
                Some(p) => {
                    println!("{CYAN}Position:{RESET} {}", p.point());
                    println!("{CYAN}Mode:{RESET}     {}", tracker.mode().as_str());
                    println!("{CYAN}Age:{RESET}      {}", format_elapsed(p.age(app.now())));
                }
                None => info("No position known."),
            }
            if let Some(code) = tracker.last_error() {
                println!("{CYAN}Last error:{RESET} {code}");
            }
        }
        PositionAction::Locate { feed } => {
            let provider = FeedProvider::parse(&read_feed(feed)?)?;
            let mut app = open_app_with(cfg, Box::new(provider), Box::new(SystemClock), false)?;
            if let TrackerEvent::Fix(p) = app.locate_once()? {
                success(format!("Located at {}", p.point()));
            }
        }
    }

    Ok(())
}
