use crate::db::log::audit_or_warn;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::ui::prompt::ask_confirmation;
use rusqlite::Connection;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Write a consistent copy of the database to `dest_file` (`VACUUM INTO`),
    /// optionally zipped. `None` when the user refused to overwrite.
    pub fn backup(db_path: &str, dest_file: &str, compress: bool) -> AppResult<Option<PathBuf>> {
        let src = Path::new(db_path);
        let dest = Path::new(dest_file);

        if !src.is_file() {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Database not found: {}", src.display()),
            )));
        }

        let final_path = if compress {
            dest.with_extension("zip")
        } else {
            dest.to_path_buf()
        };

        if final_path.exists() {
            let question = format!("'{}' already exists. Overwrite it?", final_path.display());
            if !ask_confirmation(&question) {
                info("Backup cancelled.");
                return Ok(None);
            }
            fs::remove_file(&final_path)?;
        }

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(src)?;
        if dest.exists() {
            fs::remove_file(dest)?;
        }
        conn.execute("VACUUM INTO ?1", [dest.to_string_lossy().as_ref()])?;

        if compress {
            zip_single_file(dest, &final_path)?;
            if let Err(e) = fs::remove_file(dest) {
                warning(format!("Uncompressed copy left at {}: {}", dest.display(), e));
            }
        }

        success(format!("Backup created: {}", final_path.display()));

        audit_or_warn(
            &conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Database copied and zipped"
            } else {
                "Database copied"
            },
        );

        Ok(Some(final_path))
    }
}

fn zip_single_file(path: &Path, zip_path: &Path) -> AppResult<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Other(format!("invalid backup path: {}", path.display())))?;

    let mut zip = ZipWriter::new(fs::File::create(zip_path)?);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(name, options).map_err(io::Error::other)?;
    io::copy(&mut fs::File::open(path)?, &mut zip)?;
    zip.finish().map_err(io::Error::other)?;

    Ok(())
}
