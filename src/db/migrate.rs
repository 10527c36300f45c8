use crate::db::schema::{Column, INDEXES_SQL, TABLE, create_table_sql};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check if the distribution table exists.
fn distribution_table_exists(conn: &Connection) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([TABLE], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Column names of the distribution table, as stored.
fn existing_columns(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{TABLE}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;
    cols.collect()
}

/// Columns of the canonical layout that an older table lacks.
/// SQLite column names are case-insensitive, so is the comparison.
pub fn missing_columns(existing: &[String]) -> Vec<Column> {
    let present: Vec<Column> = existing.iter().filter_map(|e| Column::from_name(e)).collect();
    Column::ALL
        .iter()
        .copied()
        .filter(|c| !present.contains(c))
        .collect()
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

fn database_path(conn: &Connection) -> String {
    conn.query_row("PRAGMA database_list;", [], |row| row.get::<_, String>(2))
        .unwrap_or_default()
}

fn backup_before_migration(db_path: &str) -> AppResult<()> {
    use chrono::Local;
    use std::fs::{self, File};
    use std::io::Write;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    let backup_name = format!(
        "{}-backup_db_pre_migration.zip",
        Local::now().format("%Y%m%d_%H%M%S")
    );

    let backup_path = std::path::Path::new(db_path)
        .parent()
        .map(|p| p.join(&backup_name))
        .unwrap_or_else(|| backup_name.clone().into());

    let file = File::create(&backup_path)
        .map_err(|e| AppError::Migration(format!("Backup failed (create): {}", e)))?;

    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("database.sqlite", options)
        .map_err(|e| AppError::Migration(format!("Backup failed (start_file): {}", e)))?;

    let db_content = fs::read(db_path)
        .map_err(|e| AppError::Migration(format!("Backup failed (read): {}", e)))?;

    zip.write_all(&db_content)
        .map_err(|e| AppError::Migration(format!("Backup failed (write_all): {}", e)))?;

    zip.finish()
        .map_err(|e| AppError::Migration(format!("Backup failed (finish): {}", e)))?;

    success(format!("📦 Backup created: {}", backup_path.display()));
    Ok(())
}

/// Add every column the table lacks. Existing rows keep NULL there.
fn migrate_add_missing_columns(conn: &Connection, missing: &[Column]) -> AppResult<()> {
    for col in missing {
        let version = format!("add_column_{}", col.name());

        conn.execute(
            &format!(
                "ALTER TABLE {TABLE} ADD COLUMN {} {}",
                col.name(),
                col.sql_type()
            ),
            [],
        )
        .map_err(|e| {
            AppError::Migration(format!("Failed to add '{}' column: {}", col.name(), e))
        })?;

        mark_applied(
            conn,
            &version,
            &format!("Added {} to {}", col.name(), TABLE),
        )?;

        success(format!(
            "Migration applied: {} → added '{}' to {}",
            version,
            col.name(),
            TABLE
        ));
    }
    Ok(())
}

/// Rows written before the kind column existed get a kind inferred from
/// the presence of hour-meter data.
fn migrate_fill_record_kind(conn: &Connection) -> AppResult<()> {
    let version = "20250901_0002_fill_record_kind";
    if migration_applied(conn, version)? {
        return Ok(());
    }

    let changed = conn.execute(
        &format!(
            "UPDATE {TABLE}
             SET tipo_registro = CASE
                 WHEN horometro_final IS NOT NULL OR horas_trabajadas IS NOT NULL
                 THEN 'HOROMETRO' ELSE 'SIN_HOROMETRO' END
             WHERE tipo_registro IS NULL OR TRIM(tipo_registro) = ''"
        ),
        [],
    )?;

    mark_applied(
        conn,
        version,
        &format!("Inferred record kind for {} rows", changed),
    )?;

    if changed > 0 {
        success(format!(
            "Migration applied: {} → record kind set on {} rows",
            version, changed
        ));
    }
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Create the distribution table if missing
    if !distribution_table_exists(conn)? {
        conn.execute_batch(&create_table_sql())?;
        mark_applied(
            conn,
            "20250901_0001_create_distribution_table",
            "Created distribution table",
        )?;
    } else {
        // 3) Legacy layout → backup, then add what is missing
        let missing = missing_columns(&existing_columns(conn)?);

        if !missing.is_empty() {
            warning("Legacy schema detected, creating safety backup before migration...");

            let db_path = database_path(conn);
            if !db_path.is_empty() {
                backup_before_migration(&db_path)?;
            } else {
                warning("Could not determine DB path, backup skipped.");
            }

            migrate_add_missing_columns(conn, &missing)?;
        }
    }

    // 4) Indexes and data fixes
    conn.execute_batch(INDEXES_SQL)?;
    migrate_fill_record_kind(conn)?;

    Ok(())
}
