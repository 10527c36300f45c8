use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, info, success, warning};
use std::path::Path;
use std::process::Command;

fn platform_editor() -> String {
    std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        })
}

fn open_in(editor: &str, path: &Path) -> bool {
    Command::new(editor)
        .arg(path)
        .status()
        .is_ok_and(|s| s.success())
}

fn print_effective(cfg: &Config) -> AppResult<()> {
    let yaml = serde_yaml::to_string(cfg).map_err(|e| AppError::Config(e.to_string()))?;
    println!("📄 Current configuration ({}):\n", Config::config_file().display());
    println!("{}", yaml);

    info(format!(
        "{} equipment, {} operators, {} price source(s), report template {}",
        cfg.equipment.len(),
        cfg.operators.len(),
        cfg.price_sources.len(),
        cfg.template_path().display()
    ));
    Ok(())
}

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        edit_config,
        editor,
    } = cmd
    {
        if *print_config {
            print_effective(cfg)?;
        }

        if *edit_config {
            let path = Config::config_file();
            if !path.exists() {
                warning("No configuration file yet, run `fuellog init` first.");
                return Ok(());
            }

            let fallback = platform_editor();
            let chosen = editor.clone().unwrap_or_else(|| fallback.clone());

            if open_in(&chosen, &path) {
                success(format!("Configuration edited with '{}'", chosen));
            } else if chosen != fallback && open_in(&fallback, &path) {
                warning(format!("Editor '{}' not available, used '{}'", chosen, fallback));
            } else {
                error(format!("Could not open {} with '{}'", path.display(), chosen));
            }
        }
    }

    Ok(())
}
