use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::{ReportLogic, ReportOutcome};
use crate::ui::messages::{success, warning};
use crate::utils::date::parse_month;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report {
        month,
        template,
        out_dir,
    } = cmd
    {
        let (year, mon) = parse_month(month)?;
        let token = format!("{:04}-{:02}", year, mon);

        let template = match template {
            Some(t) => expand_tilde(t),
            None => cfg.template_path(),
        };
        let out_dir = out_dir.as_deref().map(expand_tilde);
        let out = cfg.report_path(out_dir.as_deref(), &token);

        let pool = DbPool::open(&cfg.database)?;

        match ReportLogic::generate(&pool, &token, &template, &cfg.template_sheet, &out)? {
            ReportOutcome::Written { path, rows } => {
                success(format!(
                    "Report {} written: {} ({} records)",
                    token,
                    path.display(),
                    rows
                ));
            }
            ReportOutcome::NoRecords => {
                warning(format!("No records for {}, no report written.", token));
            }
        }
    }

    Ok(())
}
