use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::audit_or_warn;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::template::write_default_template;
use crate::ui::messages::{info, success};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (not in test mode)
///  - the SQLite database and all pending migrations
///  - a default report template when none exists (not in test mode)
pub fn handle(cli: &Cli) -> AppResult<()> {
    //
    // 1️⃣ CONFIGURATION
    //
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = cfg.database.clone();

    println!("⚙️  Initializing fuellog…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", &db_path);

    //
    // 2️⃣ DATABASE (tables + migrations)
    //
    let pool = DbPool::open(&db_path)?;
    success(format!("Database initialized at {}", &db_path));

    //
    // 3️⃣ REPORT TEMPLATE
    //
    let template = cfg.template_path();
    if !cli.test && !template.exists() {
        write_default_template(&template, &cfg.template_sheet)?;
        info(format!("Report template written to {}", template.display()));
    }

    //
    // 4️⃣ INTERNAL LOG (non blocking)
    //
    audit_or_warn(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &db_path),
    );

    println!("🎉 fuellog initialization completed!");
    Ok(())
}
