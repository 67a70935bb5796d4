use crate::errors::AppResult;
use chrono::Local;
use rusqlite::{Connection, params};
use tracing::trace;

/// Append a line to the internal audit log (`log` table). Attendance events
/// also land in the company log inside the state blob; this one is for
/// operators.
pub fn ttlog(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let now = Local::now().to_rfc3339();

    conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![now, operation, target, message])?;

    trace!(operation, target, "audit line written");
    Ok(())
}
