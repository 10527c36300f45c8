use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::add::{AddLogic, AddOptions};
use crate::core::price::PriceSource;
use crate::core::workflow::{PresetPrompt, Step};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::{DistributionRecord, RecordKind};
use crate::ui::messages::{header, info, success};
use crate::ui::prompt::TerminalPrompt;
use crate::utils::date::today;
use crate::utils::fmt_opt;
use chrono::Local;

fn print_saved(rec: &DistributionRecord) {
    success(format!("Record saved: {}", rec.summary()));
    println!(
        "   ⛽ {:.2} gal | 📟 {} → {} | 💰 {}",
        rec.gallons,
        fmt_opt(rec.meter_start),
        fmt_opt(rec.meter_end),
        fmt_opt(rec.estimated_cost)
    );
    if let Some(h) = rec.hour_meter {
        println!(
            "   ⏱️ {:.2} → {:.2} | 🕒 {:.2} h | 🔁 {:.2} gal/h",
            h.start, h.end, h.hours_worked, h.consumption_rate
        );
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Add {
        interactive,
        kind,
        date,
        time,
        equipment,
        operator,
        liters,
        meter_start,
        meter_end,
        hour_start,
        hour_end,
        price,
    } = cmd
    {
        let mut pool = DbPool::open(&cfg.database)?;

        let opts = AddOptions {
            equipment: &cfg.equipment,
            operators: &cfg.operators,
            today: today(),
            now: Local::now().time(),
            default_price: PriceSource::from_config(cfg).current_price(),
            kind: if *interactive {
                *kind
            } else {
                Some(kind.unwrap_or(RecordKind::WithoutHourMeter))
            },
        };

        let saved = if *interactive {
            header("New diesel distribution");
            let (next_start, _) = AddLogic::defaults(&pool, None)?;
            info(format!("Next meter start: {:.2}", next_start));

            AddLogic::apply(&mut pool, opts, &mut TerminalPrompt::stdin())?
        } else {
            let mut preset = PresetPrompt::new()
                .set(Step::Date, date.as_ref())
                .set(Step::Time, time.as_ref())
                .set(Step::Equipment, equipment.as_ref())
                .set(Step::Operator, operator.as_ref())
                .set(Step::Liters, liters.as_ref())
                .set(Step::MeterStart, meter_start.as_ref())
                .set(Step::MeterEnd, meter_end.as_ref())
                .set(Step::HourMeterStart, hour_start.as_ref())
                .set(Step::HourMeterEnd, hour_end.as_ref())
                .set(Step::Price, price.as_ref());

            AddLogic::apply(&mut pool, opts, &mut preset)?
        };

        match saved {
            Some(rec) => print_saved(&rec),
            None => info("Entry cancelled, nothing saved."),
        }
    }

    Ok(())
}
