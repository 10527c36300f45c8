use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::counter::ReconciledView;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{hint, success, warning};
use crate::utils::colors::{CYAN, RESET};

fn step(label: &str) {
    println!("{}▶ {}…{}", CYAN, label, RESET);
}

/// SQLite integrity plus the state of the tank meter chain.
fn check(pool: &DbPool) -> AppResult<()> {
    step("Checking database integrity");
    let integrity: String = pool
        .conn
        .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

    if integrity == "ok" {
        success("Integrity check passed.");
    } else {
        warning(format!("Integrity check failed: {}", integrity));
    }

    step("Checking tank meter chain");
    let view = ReconciledView::load(pool)?;
    if view.warnings.is_empty() {
        success(format!("Meter chain complete, ends at {:.2}.", view.last_end));
    } else {
        warning(format!(
            "{} meter value(s) are derived, chain ends at {:.2}.",
            view.warnings.len(),
            view.last_end
        ));
        hint("Run `fuellog backfill` to store them.");
    }
    Ok(())
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check: run_check,
        vacuum,
        info,
    } = cmd
    {
        let pool = DbPool::new(&cfg.database)?;

        if *migrate {
            step("Running migrations");
            run_pending_migrations(&pool.conn)?;
            success("Migration completed.");
        }

        if *info {
            run_pending_migrations(&pool.conn)?;
            stats::print_db_info(&pool, &cfg.database)?;
        }

        if *run_check {
            run_pending_migrations(&pool.conn)?;
            check(&pool)?;
        }

        if *vacuum {
            step("Running VACUUM");
            pool.conn.execute_batch("VACUUM;")?;
            success("Vacuum completed.");
        }
    }

    Ok(())
}
