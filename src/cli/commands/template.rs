use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::export::template::write_default_template;
use crate::ui::messages::success;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Template { file, force } = cmd {
        let path = match file {
            Some(f) => expand_tilde(f),
            None => cfg.template_path(),
        };

        if path.exists() && !*force {
            return Err(AppError::Export(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        write_default_template(&path, &cfg.template_sheet)?;
        success(format!("Report template written: {}", path.display()));
    }

    Ok(())
}
