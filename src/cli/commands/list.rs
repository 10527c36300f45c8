use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::list::{ListLogic, Listing};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::SortOrder;
use crate::ui::messages::{hint, info, warning};
use crate::utils::fmt_opt;
use crate::utils::table::{Column, Table};

/// Render the reconciled listing as a table.
pub fn render_listing(listing: &Listing, separator: &str) -> String {
    let mut table = Table::new(vec![
        Column::right("ID"),
        Column::left("Date"),
        Column::left("Time"),
        Column::left("Equipment"),
        Column::right("Liters"),
        Column::right("Gal"),
        Column::left("Operator"),
        Column::right("Meter start"),
        Column::right("Meter end"),
        Column::left("Sequence"),
        Column::right("Delta"),
        Column::left("Type"),
        Column::right("Hour start"),
        Column::right("Hour end"),
        Column::right("Hours"),
        Column::right("gal/h"),
        Column::right("Price"),
        Column::right("Cost"),
    ])
    .with_separator(separator);

    for row in &listing.rows {
        let r = &row.record;
        let c = &row.counter;
        table.add_row(vec![
            r.id.to_string(),
            r.date.clone(),
            r.time.clone(),
            r.equipment.clone(),
            format!("{:.2}", r.liters),
            format!("{:.2}", r.gallons),
            r.operator.clone(),
            format!("{:.2}", c.display_start),
            format!("{:.2}", c.display_end),
            c.label.clone(),
            format!("{:.2}", c.delta),
            r.kind.as_str().to_string(),
            fmt_opt(r.hour_meter.map(|h| h.start)),
            fmt_opt(r.hour_meter.map(|h| h.end)),
            fmt_opt(r.hours_worked()),
            fmt_opt(r.consumption_rate()),
            fmt_opt(r.diesel_price),
            fmt_opt(r.estimated_cost),
        ]);
    }

    table.render()
}

/// One summary line for the data-quality warnings of a listing.
pub fn report_warnings(listing: &Listing) {
    if listing.warnings.is_empty() {
        return;
    }

    let malformed = listing
        .warnings
        .iter()
        .filter(|w| w.issue == crate::core::counter::MeterIssue::Malformed)
        .count();
    let missing = listing.warnings.len() - malformed;

    warning(format!(
        "{} meter value(s) derived from the chain ({} missing, {} not numeric).",
        listing.warnings.len(),
        missing,
        malformed
    ));
    hint("Run `fuellog backfill` to store them.");
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { filter, asc } = cmd {
        let filter = filter.to_filter()?;
        let pool = DbPool::open(&cfg.database)?;

        let order = if *asc {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        };

        let listing = ListLogic::load(&pool, &filter, order)?;

        if listing.is_empty() {
            info("No records found.");
            return Ok(());
        }

        println!("{}", render_listing(&listing, &cfg.separator_char));
        println!("{} record(s)", listing.rows.len());
        report_warnings(&listing);
    }

    Ok(())
}
