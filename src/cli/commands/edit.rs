use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::edit::{EditLogic, EditRequest};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Edit {
        id,
        date,
        time,
        equipment,
        operator,
        liters,
        meter_start,
        meter_end,
        clear_meters,
        hour_start,
        hour_end,
        price,
        kind,
    } = cmd
    {
        let req = EditRequest {
            date: date.clone(),
            time: time.clone(),
            equipment: equipment.clone(),
            operator: operator.clone(),
            liters: *liters,
            meter_start: *meter_start,
            meter_end: *meter_end,
            clear_meters: *clear_meters,
            hour_start: *hour_start,
            hour_end: *hour_end,
            price: *price,
            kind: *kind,
        };

        let mut pool = DbPool::open(&cfg.database)?;

        let updated = EditLogic::apply(&mut pool, *id, &req)?.ok_or(AppError::RecordNotFound(*id))?;
        success(format!("Record updated: {}", updated.summary()));
    }

    Ok(())
}
