use crate::config::{Config, PriceSourceEntry};
use crate::utils::path::expand_tilde;
use regex::Regex;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::PathBuf;

/// Best-effort lookup of the current diesel price (USD/gal).
pub struct PriceSource {
    sources: Vec<PriceSourceEntry>,
    fallback: f64,
}

fn is_identifier(name: &str) -> bool {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

impl PriceSource {
    pub fn new(sources: Vec<PriceSourceEntry>, fallback: f64) -> Self {
        Self { sources, fallback }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.price_sources.clone(), cfg.fallback_price)
    }

    fn source_path(entry: &PriceSourceEntry) -> PathBuf {
        expand_tilde(&entry.database)
    }

    /// Latest non-null price of one source; any failure yields `None`.
    fn query(entry: &PriceSourceEntry) -> Option<f64> {
        let path = Self::source_path(entry);
        if !path.exists() || !is_identifier(&entry.table) {
            return None;
        }

        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).ok()?;
        let sql = format!(
            "SELECT precio_diesel FROM {} WHERE precio_diesel IS NOT NULL \
             ORDER BY fecha_produccion DESC LIMIT 1",
            entry.table
        );

        conn.query_row(&sql, [], |row| row.get::<_, f64>(0))
            .optional()
            .ok()
            .flatten()
            .filter(|p| p.is_finite())
    }

    /// First source that answers wins, otherwise the fallback constant.
    pub fn current_price(&self) -> f64 {
        self.sources
            .iter()
            .find_map(Self::query)
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_when_nothing_answers() {
        let src = PriceSource::new(
            vec![PriceSourceEntry {
                database: "/nonexistent/prices.db".into(),
                table: "reportes".into(),
            }],
            2.7955,
        );
        assert_eq!(src.current_price(), 2.7955);
    }

    #[test]
    fn table_names_must_be_identifiers() {
        assert!(is_identifier("reportes_DMI"));
        assert!(!is_identifier("reportes; DROP TABLE x"));
        assert!(!is_identifier(""));
    }
}
