use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::counter::backfill;
use crate::db::log::audit_or_warn;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Backfill) {
        let mut pool = DbPool::open(&cfg.database)?;

        let updated = backfill(&mut pool)?;

        if updated == 0 {
            info("All records already have stored meters. Nothing to backfill.");
            return Ok(());
        }

        audit_or_warn(
            &pool.conn,
            "backfill",
            "meters",
            &format!("Stored derived meters on {} records", updated),
        );
        success(format!("Backfill completed: {} record(s) updated.", updated));
    }

    Ok(())
}
