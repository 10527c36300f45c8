use clap::ValueEnum;

use super::record_kind::RecordKind;

/// Record kind selector used by list / export filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum KindFilter {
    #[default]
    All,
    #[value(alias = "WITH_HOUR_METER", alias = "with_hour_meter")]
    With,
    #[value(alias = "WITHOUT_HOUR_METER", alias = "without_hour_meter")]
    Without,
}

impl KindFilter {
    pub fn kind(&self) -> Option<RecordKind> {
        match self {
            KindFilter::All => None,
            KindFilter::With => Some(RecordKind::WithHourMeter),
            KindFilter::Without => Some(RecordKind::WithoutHourMeter),
        }
    }
}

/// Event order is always `(date, time, id)`, in one direction or the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Filter parameters accepted by scan, list and export.
///
/// - `from` / `to`: inclusive, lexicographic on `YYYY-MM-DD`
/// - `equipment`, `operator`: case-insensitive substring
/// - `month`: `YYYY-MM`, prefix match on the date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub equipment: Option<String>,
    pub operator: Option<String>,
    pub kind: KindFilter,
    pub month: Option<String>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn month(month: &str) -> Self {
        Self {
            month: Some(month.to_string()),
            ..Self::default()
        }
    }

    /// Case-insensitive substring match on equipment and operator, with
    /// full Unicode case folding (`josé` finds `JOSÉ`).
    pub fn matches_names(&self, equipment: &str, operator: &str) -> bool {
        contains_folded(equipment, self.equipment.as_deref())
            && contains_folded(operator, self.operator.as_deref())
    }
}

fn contains_folded(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
        None => true,
    }
}
