use fuellog::db::DbPool;
use fuellog::db::migrate::missing_columns;
use fuellog::db::schema::Column;
use predicates::str::contains;

mod common;
use common::{db_path, fl, test_home};

const LEGACY_TABLE: &str = "CREATE TABLE distribucion_hyundai_equipos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fecha TEXT, hora TEXT, equipo TEXT,
    volumen_despachado REAL, responsable TEXT, litros_despachados REAL,
    horometro_inicial REAL, horometro_final REAL, horas_trabajadas REAL,
    consumo_por_gl_h REAL, precio_diesel REAL, costo_diesel_usd REAL,
    Contador_inicial REAL
)";

#[test]
fn column_names_match_case_insensitively() {
    let existing = vec!["ID".to_string(), "Contador_Inicial".to_string(), "fecha".to_string()];
    let missing = missing_columns(&existing);

    assert!(!missing.contains(&Column::MeterStart));
    assert!(!missing.contains(&Column::Date));
    assert!(missing.contains(&Column::MeterEnd));
    assert!(missing.contains(&Column::Kind));
}

#[test]
fn legacy_database_is_upgraded_on_open() {
    let home = test_home("legacy_db");
    let path = db_path(&home);

    let conn = rusqlite::Connection::open(&path).expect("create legacy db");
    conn.execute_batch(LEGACY_TABLE).expect("legacy table");
    conn.execute(
        "INSERT INTO distribucion_hyundai_equipos
         (fecha, hora, equipo, volumen_despachado, responsable, litros_despachados,
          horometro_inicial, horometro_final, horas_trabajadas, consumo_por_gl_h,
          Contador_inicial)
         VALUES ('2025-07-01', '06:30', 'PALA DOOSAN', 10.57, 'Jose', 40.0,
                 1200.0, 1204.0, 4.0, 2.64, 1000.0)",
        [],
    )
    .expect("legacy row");
    drop(conn);

    fl(&home)
        .args(["list", "--asc"])
        .assert()
        .success()
        .stdout(contains("1000.00 → 1040.00"))
        .stdout(contains("WITH_HOUR_METER"));

    let pool = DbPool::open(&path).expect("reopen");
    let kind: String = pool
        .conn
        .query_row("SELECT tipo_registro FROM distribucion_hyundai_equipos", [], |r| {
            r.get(0)
        })
        .expect("kind filled");
    assert_eq!(kind, "HOROMETRO");

    let applied: i64 = pool
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
            [],
            |r| r.get(0),
        )
        .expect("migration log");
    assert!(applied >= 3);
}
