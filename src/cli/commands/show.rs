use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::counter::ReconciledView;
use crate::db::pool::DbPool;
use crate::db::store::RecordStore;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use crate::utils::colors::{RESET, color_for_delta, colorize_optional};
use crate::utils::fmt_opt;
use crate::utils::formatting::bold;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Show { id } = cmd {
        let pool = DbPool::open(&cfg.database)?;

        let rec = pool
            .get_by_id(*id)?
            .ok_or(AppError::RecordNotFound(*id))?;

        let view = ReconciledView::load(&pool)?;

        println!("{}", bold(&format!("Record #{}", rec.id)));
        println!("  📅 Date       : {} {}", rec.date, rec.time);
        println!("  🛠️ Equipment  : {}", rec.equipment);
        println!("  👤 Operator   : {}", rec.operator);
        println!("  🧪 Liters     : {:.2}", rec.liters);
        println!("  ⛽ Gallons    : {:.2}", rec.gallons);
        println!("  🏷️ Type       : {}", rec.kind);

        println!(
            "  📟 Stored     : {} → {}",
            colorize_optional(&fmt_opt(rec.meter_start)),
            colorize_optional(&fmt_opt(rec.meter_end))
        );
        if let Some(row) = view.row(rec.id) {
            println!(
                "  📟 Sequence   : {} (Δ {}{:.2}{})",
                row.label,
                color_for_delta(row.delta),
                row.delta,
                RESET
            );
        }

        if let Some(h) = rec.hour_meter {
            println!("  ⏱️ Hour meter : {:.2} → {:.2}", h.start, h.end);
            println!("  🕒 Hours      : {:.2}", h.hours_worked);
            println!("  🔁 Consumption: {:.2} gal/h", h.consumption_rate);
        }

        println!(
            "  💲 Price      : {}",
            colorize_optional(&fmt_opt(rec.diesel_price))
        );
        println!(
            "  💰 Cost (USD) : {}",
            colorize_optional(&fmt_opt(rec.estimated_cost))
        );

        for w in view.warnings.iter().filter(|w| w.id == rec.id) {
            warning(w);
        }
    }

    Ok(())
}
