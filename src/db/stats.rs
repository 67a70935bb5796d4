use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::state::AppState;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_kb = (file_size as f64) / 1024.0;

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.1} KB", CYAN, RESET, file_kb);

    //
    // 2) STATE BLOB
    //
    let blob: Option<(String, String)> = pool
        .conn
        .query_row(
            "SELECT value, updated_at FROM kv WHERE key = 'state'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match blob {
        Some((value, updated_at)) => {
            let (state, _) = AppState::from_json(&value)?;
            let sites: usize = state.companies.values().map(|c| c.sites.len()).sum();
            let checked_in = state
                .users
                .values()
                .filter_map(|u| u.as_employee())
                .filter(|e| e.is_checked_in())
                .count();

            println!(
                "{}• Companies:{} {}{}{}",
                CYAN,
                RESET,
                GREEN,
                state.companies.len(),
                RESET
            );
            println!("{}• Sites:{} {}", CYAN, RESET, sites);
            println!("{}• Users:{} {}", CYAN, RESET, state.users.len());
            println!("{}• Checked in now:{} {}", CYAN, RESET, checked_in);
            println!("{}• State blob:{} {} bytes", CYAN, RESET, value.len());
            println!("{}• Last write:{} {}", CYAN, RESET, updated_at);
        }
        None => println!("{}• State:{} {GREY}empty{RESET}", CYAN, RESET),
    }

    //
    // 3) AUDIT LOG
    //
    let log_rows: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM log", [], |row| row.get(0))?;
    println!("{}• Audit log rows:{} {}", CYAN, RESET, log_rows);

    println!();
    Ok(())
}
