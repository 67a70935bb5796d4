use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::table::strip_ansi;
use ansi_term::Colour;

const OP_TARGET_MAX: usize = 60;

/// ANSI color for an audit operation.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "check_in" | "login" | "verify" => Colour::Green,
        "check_out" | "logout" => Colour::Yellow,
        "remove_employee" => Colour::Red,
        "register_company" | "signup" | "add_employee" => Colour::Cyan,
        "create_site" | "relocate_site" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "backup" | "export" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let raw_date: String = row.get(1)?;
            let operation: String = row.get(2)?;
            let target: String = row.get(3)?;
            let message: String = row.get(4)?;

            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            Ok((id, date, operation, target, message))
        })?;

        let mut entries = Vec::new();
        for r in rows {
            entries.push(r?);
        }

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let id_w = entries
            .iter()
            .map(|(id, ..)| id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries
            .iter()
            .map(|(_, date, ..)| date.len())
            .max()
            .unwrap_or(10);

        let mut lines = Vec::with_capacity(entries.len());
        for (id, date, operation, target, message) in entries {
            let color = color_for_operation(&operation);

            let mut op_target = color.paint(operation.as_str()).to_string();
            if !target.is_empty() {
                op_target.push_str(&format!(" ({target})"));
            }

            // truncate on the visible text, then paint the operation again
            let visible = strip_ansi(&op_target);
            let shown = if visible.chars().count() > OP_TARGET_MAX {
                let mut s: String = visible.chars().take(OP_TARGET_MAX - 3).collect();
                s.push_str("...");
                match s.split_once(' ') {
                    Some((op_word, rest)) => format!("{} {}", color.paint(op_word), rest),
                    None => color.paint(s.as_str()).to_string(),
                }
            } else {
                op_target
            };

            lines.push((id, date, shown, message));
        }

        let op_w = lines
            .iter()
            .map(|(_, _, shown, _)| strip_ansi(shown).chars().count())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");
        for (id, date, shown, message) in lines {
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&shown).chars().count()));
            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                id,
                date,
                shown,
                padding,
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
