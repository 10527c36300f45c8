use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::audit_or_warn;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ExportLogic;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        filter,
        force,
    } = cmd
    {
        let filter = filter.to_filter()?;
        let pool = DbPool::open(&cfg.database)?;

        let exported = ExportLogic::export(&pool, *format, file, &filter, *force)?;

        if exported > 0 {
            audit_or_warn(
                &pool.conn,
                "export",
                file,
                &format!("{} records exported as {}", exported, format.as_str()),
            );
        }
    }
    Ok(())
}
