//! Storage layout of the distribution table.
//!
//! Column names are those of the legacy spreadsheet-era database so that an
//! existing `control_diesel.db` can be opened as is. Every mapping between
//! domain fields and column names goes through [`Column`].

pub const TABLE: &str = "distribucion_hyundai_equipos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Date,
    Time,
    Equipment,
    Gallons,
    Operator,
    Liters,
    HourMeterStart,
    HourMeterEnd,
    HoursWorked,
    ConsumptionRate,
    DieselPrice,
    EstimatedCost,
    MeterStart,
    MeterEnd,
    Kind,
}

impl Column {
    pub const ALL: [Column; 16] = [
        Column::Id,
        Column::Date,
        Column::Time,
        Column::Equipment,
        Column::Gallons,
        Column::Operator,
        Column::Liters,
        Column::HourMeterStart,
        Column::HourMeterEnd,
        Column::HoursWorked,
        Column::ConsumptionRate,
        Column::DieselPrice,
        Column::EstimatedCost,
        Column::MeterStart,
        Column::MeterEnd,
        Column::Kind,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Date => "fecha",
            Column::Time => "hora",
            Column::Equipment => "equipo",
            Column::Gallons => "volumen_despachado",
            Column::Operator => "responsable",
            Column::Liters => "litros_despachados",
            Column::HourMeterStart => "horometro_inicial",
            Column::HourMeterEnd => "horometro_final",
            Column::HoursWorked => "horas_trabajadas",
            Column::ConsumptionRate => "consumo_por_gl_h",
            Column::DieselPrice => "precio_diesel",
            Column::EstimatedCost => "costo_diesel_usd",
            Column::MeterStart => "contador_inicial",
            Column::MeterEnd => "contador_final",
            Column::Kind => "tipo_registro",
        }
    }

    pub fn sql_type(&self) -> &'static str {
        match self {
            Column::Id => "INTEGER",
            Column::Date | Column::Time | Column::Equipment | Column::Operator | Column::Kind => {
                "TEXT"
            }
            _ => "REAL",
        }
    }

    /// Case-insensitive lookup (`Contador_inicial` and `contador_inicial`
    /// are the same column for SQLite).
    pub fn from_name(name: &str) -> Option<Column> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// `id, fecha, hora, ...` in canonical order.
pub fn select_list() -> String {
    Column::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn create_table_sql() -> String {
    let cols = Column::ALL
        .iter()
        .map(|c| match c {
            Column::Id => "id INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
            other => format!("{} {}", other.name(), other.sql_type()),
        })
        .collect::<Vec<_>>()
        .join(",\n            ");

    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {TABLE} (
            {cols}
        );
        "#
    )
}

pub const INDEXES_SQL: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_distribution_order ON distribucion_hyundai_equipos(fecha, hora, id);
    CREATE INDEX IF NOT EXISTS idx_distribution_equipment ON distribucion_hyundai_equipos(equipo);
"#;
