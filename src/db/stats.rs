use crate::db::pool::DbPool;
use crate::db::schema::TABLE;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

/// Aggregated facts about the database file, shown by `db --info`.
#[derive(Debug, Clone, PartialEq)]
pub struct DbStats {
    pub file_size: u64,
    pub records: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub total_liters: f64,
    pub missing_meters: i64,
}

pub fn collect_stats(pool: &DbPool, db_path: &str) -> AppResult<DbStats> {
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    let records: i64 = pool
        .conn
        .query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| {
            row.get(0)
        })?;

    let (first_date, last_date): (Option<String>, Option<String>) = pool
        .conn
        .query_row(
            &format!("SELECT MIN(fecha), MAX(fecha) FROM {TABLE}"),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .unwrap_or((None, None));

    let total_liters: f64 = pool.conn.query_row(
        &format!("SELECT IFNULL(SUM(CAST(litros_despachados AS REAL)), 0) FROM {TABLE}"),
        [],
        |row| row.get(0),
    )?;

    let missing_meters: i64 = pool.conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {TABLE}
             WHERE contador_inicial IS NULL OR contador_final IS NULL
                OR typeof(contador_inicial) NOT IN ('real', 'integer')
                OR typeof(contador_final) NOT IN ('real', 'integer')"
        ),
        [],
        |row| row.get(0),
    )?;

    Ok(DbStats {
        file_size,
        records,
        first_date,
        last_date,
        total_liters,
        missing_meters,
    })
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> AppResult<()> {
    let stats = collect_stats(pool, db_path)?;
    println!();

    //
    // 1) FILE SIZE
    //
    let file_mb = (stats.file_size as f64) / (1024.0 * 1024.0);
    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) TOTAL RECORDS
    //
    println!(
        "{}• Total records:{} {}{}{}",
        CYAN, RESET, GREEN, stats.records, RESET
    );

    //
    // 3) DATE RANGE
    //
    let fmt_first = stats
        .first_date
        .clone()
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = stats
        .last_date
        .clone()
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 4) VOLUME AND METER COVERAGE
    //
    println!(
        "{}• Total dispensed:{} {:.2} L",
        CYAN, RESET, stats.total_liters
    );
    if stats.missing_meters > 0 {
        println!(
            "{}• Records without usable meters:{} {}{}{} (run `backfill`)",
            CYAN, RESET, YELLOW, stats.missing_meters, RESET
        );
    } else {
        println!("{}• Records without usable meters:{} 0", CYAN, RESET);
    }

    println!();
    Ok(())
}
