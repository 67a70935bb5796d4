use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;
use tracing::debug;

/// Prepare a store connection: schema migrations first, then the kv table is
/// guaranteed to exist for [`crate::db::kv::SqliteKv`].
pub fn init_db(conn: &Connection) -> AppResult<()> {
    let applied = run_pending_migrations(conn)?;
    if applied > 0 {
        debug!(applied, "store schema upgraded");
    }
    Ok(())
}
