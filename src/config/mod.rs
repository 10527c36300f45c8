use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An external table that may hold the current diesel price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSourceEntry {
    pub database: String,
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_template_sheet")]
    pub template_sheet: String,
    #[serde(default = "default_report_prefix")]
    pub report_prefix: String,
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
    #[serde(default = "default_equipment")]
    pub equipment: Vec<String>,
    #[serde(default = "default_operators")]
    pub operators: Vec<String>,
    #[serde(default = "default_fallback_price")]
    pub fallback_price: f64,
    #[serde(default = "default_price_sources")]
    pub price_sources: Vec<PriceSourceEntry>,
    #[serde(default = "default_separator_char")]
    pub separator_char: String,
}

fn default_template() -> String {
    Config::config_dir()
        .join("report_template.xlsx")
        .to_string_lossy()
        .to_string()
}
fn default_template_sheet() -> String {
    "Distribucion_Equipos".to_string()
}
fn default_report_prefix() -> String {
    "Distribucion_Equipos".to_string()
}
fn default_report_dir() -> String {
    ".".to_string()
}
fn default_fallback_price() -> f64 {
    2.7955
}
fn default_separator_char() -> String {
    "-".to_string()
}

fn default_equipment() -> Vec<String> {
    [
        "GENERADOR P1 CHICO",
        "GENERADOR P2",
        "GENERADOR P1",
        "BLOWER CISTERNA MOVIL",
        "CARGADOR SEM 636D",
        "CAMION AH7922",
        "CARGADOR SEM 639C",
        "LIMPIEZA P1",
        "LIMPIEZA P2",
        "PICK UP CE9798",
        "PALA DOOSAN",
        "RETRO JCB RE02",
        "TORRE DE LUZ RL4000",
        "CAMION AU8648",
        "CAMION KODIAK AB7045",
        "PICK UP 967767 AMADOR MANYOMA",
        "LIMPIEZA BOMBA DE TRASIEGO",
        "LIMPIEZA VAGON  DE CAMION EP7333",
        "CAMIONSITO DEL DIESEL AB7045",
        "DISTRIBUIDORA AH1509",
        "LIMPIEZA DE FILTROS CAMION AU8648",
        "TANQUE GRIS P1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_operators() -> Vec<String> {
    ["Allan", "Alexander", "Manioma", "Jose", "Banega"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_price_sources() -> Vec<PriceSourceEntry> {
    vec![
        PriceSourceEntry {
            database: "reportes_DMI.db".to_string(),
            table: "reportes_DMI".to_string(),
        },
        PriceSourceEntry {
            database: "reportes.db".to_string(),
            table: "reportes".to_string(),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db_path: PathBuf) -> Self {
        Self {
            database: db_path.to_string_lossy().to_string(),
            template: default_template(),
            template_sheet: default_template_sheet(),
            report_prefix: default_report_prefix(),
            report_dir: default_report_dir(),
            equipment: default_equipment(),
            operators: default_operators(),
            fallback_price: default_fallback_price(),
            price_sources: default_price_sources(),
            separator_char: default_separator_char(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("fuellog")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".fuellog")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("fuellog.conf")
    }

    /// Return the full path of the default SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("control_diesel.db")
    }

    /// Load configuration from file, or return defaults if not found.
    /// Fields missing from an older file fall back to their defaults.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Initialize configuration and database files.
    /// Returns the configuration that was written (or would have been, in test mode).
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(&name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        // keep an existing configuration, only the database is re-targeted
        let mut config = Self::load().unwrap_or_default();
        config.database = db_path.to_string_lossy().to_string();

        if !is_test {
            config.save()?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if !db_path.exists() {
            if let Some(parent) = db_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }

    pub fn save(&self) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)?;
        let mut file = fs::File::create(Self::config_file()).map_err(|_| AppError::ConfigSave)?;
        file.write_all(yaml.as_bytes())
            .map_err(|_| AppError::ConfigSave)?;
        Ok(())
    }

    pub fn template_path(&self) -> PathBuf {
        expand_tilde(&self.template)
    }

    /// Report file for a month token, e.g. `Distribucion_Equipos_2025-09.xlsx`.
    pub fn report_path(&self, dir: Option<&Path>, month: &str) -> PathBuf {
        let base = match dir {
            Some(d) => d.to_path_buf(),
            None => expand_tilde(&self.report_dir),
        };
        base.join(format!("{}_{}.xlsx", self.report_prefix, month))
    }
}
