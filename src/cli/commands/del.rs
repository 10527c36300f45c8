use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::del::DeleteLogic;
use crate::db::pool::DbPool;
use crate::db::store::RecordStore;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use crate::ui::prompt::ask_confirmation;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id } = cmd {
        let mut pool = DbPool::open(&cfg.database)?;

        let record = pool.get_by_id(*id)?.ok_or(AppError::RecordNotFound(*id))?;

        //
        // Confirmation prompt
        //
        let prompt = format!(
            "Delete record {}? This action is irreversible.",
            record.summary()
        );

        if !ask_confirmation(&prompt) {
            info("Operation cancelled.");
            return Ok(());
        }

        //
        // Execute deletion
        //
        DeleteLogic::apply(&mut pool, *id)?.ok_or(AppError::RecordNotFound(*id))?;
        success(format!("Record {} has been deleted.", id));
    }

    Ok(())
}
