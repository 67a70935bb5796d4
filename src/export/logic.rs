// src/export/logic.rs

use crate::core::app::App;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::{HistoryExport, LogExport};
use crate::export::{ExportFormat, ExportWhat};
use crate::ui::messages::warning;
use serde::Serialize;
use std::path::Path;

/// High-level export entry point.
pub struct ExportLogic;

impl ExportLogic {
    /// Export company logs or an employee history of the signed-in user.
    ///
    /// Returns the number of rows written (0 when there was nothing to
    /// export, in which case no file is created).
    pub fn export(
        app: &App,
        what: ExportWhat,
        user: Option<&str>,
        format: ExportFormat,
        file: &Path,
        force: bool,
    ) -> AppResult<usize> {
        if file.as_os_str().is_empty() {
            return Err(AppError::Export("output file path is empty".into()));
        }

        match what {
            ExportWhat::Logs => {
                let (company_id, company) = app.managed_company()?;
                let rows: Vec<LogExport> = company
                    .logs
                    .iter()
                    .map(|e| LogExport::from_entry(&company_id, e))
                    .collect();
                write_rows(&rows, format, file, force)
            }
            ExportWhat::History => {
                let (username, points) = app.history_of(user)?;
                let rows: Vec<HistoryExport> = points
                    .iter()
                    .map(|p| HistoryExport::from_point(&username, p))
                    .collect();
                write_rows(&rows, format, file, force)
            }
        }
    }
}

fn write_rows<T: Serialize>(
    rows: &[T],
    format: ExportFormat,
    file: &Path,
    force: bool,
) -> AppResult<usize> {
    if rows.is_empty() {
        warning("Nothing to export.");
        return Ok(0);
    }

    ensure_writable(file, force)?;

    match format {
        ExportFormat::Csv => export_csv(rows, file)?,
        ExportFormat::Json => export_json(rows, file)?,
    }
    Ok(rows.len())
}
