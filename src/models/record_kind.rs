use clap::ValueEnum;
use serde::Serialize;

/// Whether a distribution was recorded together with the equipment hour meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum RecordKind {
    #[value(name = "with")]
    #[serde(rename = "WITH_HOUR_METER")]
    WithHourMeter,
    #[value(name = "without")]
    #[serde(rename = "WITHOUT_HOUR_METER")]
    WithoutHourMeter,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::WithHourMeter => "WITH_HOUR_METER",
            RecordKind::WithoutHourMeter => "WITHOUT_HOUR_METER",
        }
    }

    /// Convert enum → DB string (legacy values kept for existing databases)
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RecordKind::WithHourMeter => "HOROMETRO",
            RecordKind::WithoutHourMeter => "SIN_HOROMETRO",
        }
    }

    /// Convert DB string → enum. Accepts both the legacy and the canonical names.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HOROMETRO" | "WITH_HOUR_METER" | "WITH" => Some(RecordKind::WithHourMeter),
            "SIN_HOROMETRO" | "WITHOUT_HOUR_METER" | "WITHOUT" => {
                Some(RecordKind::WithoutHourMeter)
            }
            _ => None,
        }
    }

    /// Helper for interactive input: `1`/`2` or any accepted name.
    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(RecordKind::WithHourMeter),
            "2" => Some(RecordKind::WithoutHourMeter),
            other => Self::from_db_str(other),
        }
    }

    pub fn uses_hour_meter(&self) -> bool {
        matches!(self, RecordKind::WithHourMeter)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
