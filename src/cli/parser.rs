use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::models::{KindFilter, RecordFilter, RecordKind};
use crate::utils::date::{parse_date, parse_month};
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for fuellog
/// CLI application to record diesel distributions with SQLite
#[derive(Parser)]
#[command(
    name = "fuellog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Record diesel distributions from the central tank, reconcile the meter chain and export monthly reports",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filters shared by `list` and `export`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long, help = "First date included (YYYY-MM-DD)")]
    pub from: Option<String>,

    #[arg(long, help = "Last date included (YYYY-MM-DD)")]
    pub to: Option<String>,

    #[arg(long, short = 'e', help = "Equipment contains (case-insensitive)")]
    pub equipment: Option<String>,

    #[arg(long, short = 'o', help = "Operator contains (case-insensitive)")]
    pub operator: Option<String>,

    #[arg(long, value_enum, default_value_t = KindFilter::All, help = "Record type")]
    pub kind: KindFilter,

    #[arg(long, short = 'm', help = "Only this month (YYYY-MM)")]
    pub month: Option<String>,
}

impl FilterArgs {
    /// Validate the flags and build the store filter.
    pub fn to_filter(&self) -> AppResult<RecordFilter> {
        for d in [&self.from, &self.to].into_iter().flatten() {
            parse_date(d.trim()).ok_or_else(|| AppError::InvalidDate(d.clone()))?;
        }

        let month = match &self.month {
            Some(m) => {
                let (y, mo) = parse_month(m)?;
                Some(format!("{:04}-{:02}", y, mo))
            }
            None => None,
        };

        Ok(RecordFilter {
            from: self.from.clone(),
            to: self.to.clone(),
            equipment: self.equipment.clone(),
            operator: self.operator.clone(),
            kind: self.kind,
            month,
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database, the configuration and the report template
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Record a new distribution
    ///
    /// Without -i every value comes from the flags; omitted values take
    /// their default (today, now, next meter start, ...).
    Add {
        #[arg(long, short = 'i', help = "Ask every field interactively")]
        interactive: bool,

        #[arg(long, value_enum, help = "Record type (with or without hour meter)")]
        kind: Option<RecordKind>,

        #[arg(long, help = "Date: YYYY-MM-DD or day of the current month")]
        date: Option<String>,

        #[arg(long, help = "Time (HH:MM)")]
        time: Option<String>,

        #[arg(long, help = "Equipment: catalog number or name")]
        equipment: Option<String>,

        #[arg(long, help = "Operator: catalog number or name")]
        operator: Option<String>,

        #[arg(long, help = "Liters dispensed")]
        liters: Option<String>,

        #[arg(long = "meter-start", help = "Tank meter start (default: last meter end)")]
        meter_start: Option<String>,

        #[arg(long = "meter-end", help = "Tank meter end (default: start + liters)")]
        meter_end: Option<String>,

        #[arg(long = "hour-start", help = "Hour meter start (default: last for this equipment)")]
        hour_start: Option<String>,

        #[arg(long = "hour-end", help = "Hour meter end")]
        hour_end: Option<String>,

        #[arg(long, help = "Diesel price USD/gal (default: price source)")]
        price: Option<String>,
    },

    /// Correct fields of an existing record
    Edit {
        id: i64,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        equipment: Option<String>,

        #[arg(long)]
        operator: Option<String>,

        #[arg(long)]
        liters: Option<f64>,

        #[arg(long = "meter-start")]
        meter_start: Option<f64>,

        #[arg(long = "meter-end")]
        meter_end: Option<f64>,

        #[arg(
            long = "clear-meters",
            conflicts_with_all = ["meter_start", "meter_end"],
            help = "Remove the stored tank meters (they will be derived again)"
        )]
        clear_meters: bool,

        #[arg(long = "hour-start")]
        hour_start: Option<f64>,

        #[arg(long = "hour-end")]
        hour_end: Option<f64>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long, value_enum)]
        kind: Option<RecordKind>,
    },

    /// Delete a record by ID (permanent)
    Del { id: i64 },

    /// Show one record
    Show { id: i64 },

    /// List records with reconciled meters
    List {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, help = "Oldest first")]
        asc: bool,
    },

    /// Persist derived tank meters for records missing them
    Backfill,

    /// Write the monthly report into the template
    Report {
        #[arg(long, short = 'm', help = "Month (YYYY-MM)")]
        month: String,

        #[arg(long, help = "Template file (default from config)")]
        template: Option<String>,

        #[arg(long = "out-dir", help = "Output directory (default from config)")]
        out_dir: Option<String>,
    },

    /// Write a default report template
    Template {
        #[arg(long, value_name = "FILE", help = "Destination (default from config)")]
        file: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,
    },

    /// Export the reconciled listing
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, short = 'f')]
        force: bool,
    },
}
