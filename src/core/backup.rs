use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ensure_writable;
use crate::ui::messages::{info, success, warning};
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Write a consistent copy of the database to `dest_file`, optionally
    /// replacing it with a `.zip` archive.
    pub fn backup(
        pool: &mut DbPool,
        dest_file: &Path,
        compress: bool,
        force: bool,
    ) -> AppResult<PathBuf> {
        // with compression the raw copy is a temporary file next to the archive
        let (raw_copy, final_target) = if compress {
            (
                dest_file.with_extension("sqlite"),
                dest_file.with_extension("zip"),
            )
        } else {
            (dest_file.to_path_buf(), dest_file.to_path_buf())
        };
        ensure_writable(&final_target, force)?;

        if let Some(parent) = raw_copy.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if raw_copy.exists() {
            fs::remove_file(&raw_copy)?;
        }

        // VACUUM INTO copies through SQLite, so an open connection is fine
        pool.conn
            .execute("VACUUM INTO ?1", [raw_copy.to_string_lossy().as_ref()])?;
        success(format!("Backup created: {}", raw_copy.display()));

        let final_path = if compress {
            let zipped = compress_backup(&raw_copy)?;
            match fs::remove_file(&raw_copy) {
                Ok(()) => info(format!("Removed uncompressed backup: {}", raw_copy.display())),
                Err(e) => warning(format!("Failed to remove uncompressed backup: {e}")),
            }
            zipped
        } else {
            raw_copy
        };

        ttlog(
            &pool.conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;

        Ok(final_path)
    }
}

/// Compress a backup using .zip
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let entry_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rattend.sqlite".to_string());

    let mut f = fs::File::open(path)?;
    zip.start_file(entry_name, options)
        .map_err(std::io::Error::other)?;

    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    info(format!("Compressed: {}", zip_path.display()));

    Ok(zip_path)
}
