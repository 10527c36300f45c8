use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{add_simple, db_path, fl, setup, temp_out};

#[test]
fn test_add_and_list_reconciled_chain() {
    let home = setup("add_list");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");
    add_simple(&home, "2025-09-02", "09:30", "GENERADOR P2", "30");

    fl(&home)
        .args(["list", "--asc"])
        .assert()
        .success()
        .stdout(contains("0.00 → 50.00"))
        .stdout(contains("50.00 → 80.00"))
        .stdout(contains("2 record(s)"));
}

#[test]
fn test_add_with_hour_meter() {
    let home = setup("add_hour_meter");

    fl(&home)
        .args([
            "add",
            "--kind",
            "with",
            "--date",
            "2025-09-03",
            "--time",
            "07:00",
            "--equipment",
            "retro jcb re02",
            "--operator",
            "allan",
            "--liters",
            "100",
            "--hour-start",
            "500",
            "--hour-end",
            "510",
            "--price",
            "3",
        ])
        .assert()
        .success()
        .stdout(contains("RETRO JCB RE02"))
        .stdout(contains("2.64 gal/h"));

    fl(&home)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(contains("WITH_HOUR_METER"))
        .stdout(contains("79.26"));
}

#[test]
fn test_add_rejects_bad_input() {
    let home = setup("add_reject");

    fl(&home)
        .args([
            "add",
            "--equipment",
            "PALA DOOSAN",
            "--operator",
            "Nobody",
            "--liters",
            "10",
        ])
        .assert()
        .failure()
        .stderr(contains("not in the operator list"));

    fl(&home)
        .args([
            "add",
            "--kind",
            "with",
            "--equipment",
            "PALA DOOSAN",
            "--operator",
            "Jose",
            "--liters",
            "10",
            "--hour-start",
            "100",
            "--hour-end",
            "100",
        ])
        .assert()
        .failure();

    fl(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No records found"));
}

#[test]
fn test_list_filters() {
    let home = setup("list_filters");

    add_simple(&home, "2025-08-30", "08:00", "PALA DOOSAN", "100");
    add_simple(&home, "2025-09-01", "08:00", "GENERADOR P2", "25");

    // the September record keeps the value chained from August
    fl(&home)
        .args(["list", "--month", "2025-09"])
        .assert()
        .success()
        .stdout(contains("100.00 → 125.00"))
        .stdout(contains("PALA DOOSAN").not());

    fl(&home)
        .args(["list", "--equipment", "pala"])
        .assert()
        .success()
        .stdout(contains("1 record(s)"));

    fl(&home)
        .args(["list", "--month", "2025-13"])
        .assert()
        .failure()
        .stderr(contains("Invalid month"));
}

#[test]
fn test_list_name_filters_fold_accents() {
    let home = setup("list_accents");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "10");

    let conn = rusqlite::Connection::open(db_path(&home)).expect("open db");
    conn.execute(
        "INSERT INTO distribucion_hyundai_equipos
         (fecha, hora, equipo, responsable, litros_despachados, tipo_registro)
         VALUES ('2025-09-02', '08:00', 'CAMIÓN ÑANDÚ', 'José', 20.0, 'SIN_HOROMETRO')",
        [],
    )
    .expect("accented row");
    drop(conn);

    for op in ["José", "josé", "JOSÉ", "Jos"] {
        let expected = if op == "Jos" { "2 record(s)" } else { "1 record(s)" };
        fl(&home)
            .args(["list", "-o", op])
            .assert()
            .success()
            .stdout(contains(expected));
    }

    fl(&home)
        .args(["list", "-e", "camión ñandú"])
        .assert()
        .success()
        .stdout(contains("1 record(s)"))
        .stdout(contains("PALA DOOSAN").not());
}

#[test]
fn test_list_kind_accepts_stored_names() {
    let home = setup("list_kind_names");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "10");

    fl(&home)
        .args(["list", "--kind", "WITHOUT_HOUR_METER"])
        .assert()
        .success()
        .stdout(contains("1 record(s)"));

    fl(&home)
        .args(["list", "--kind", "WITH_HOUR_METER"])
        .assert()
        .success()
        .stdout(contains("No records found"));

    fl(&home)
        .args(["list", "--kind", "sideways"])
        .assert()
        .failure();
}

#[test]
fn test_show_missing_record_fails() {
    let home = setup("show_missing");

    fl(&home)
        .args(["show", "42"])
        .assert()
        .failure()
        .stderr(contains("No record found with id 42"));
}

#[test]
fn test_edit_recomputes_derived_fields() {
    let home = setup("edit");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");

    fl(&home)
        .args(["edit", "1", "--liters", "100"])
        .assert()
        .success()
        .stdout(contains("100.00 L"));

    fl(&home)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(contains("26.42"))
        .stdout(contains("73.98"));

    // stored meters are not recomputed by a volume change
    fl(&home)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(contains("0.00 → 50.00"));

    fl(&home)
        .args(["edit", "1"])
        .assert()
        .failure()
        .stderr(contains("nothing to change"));

    fl(&home)
        .args(["edit", "7", "--liters", "1"])
        .assert()
        .failure()
        .stderr(contains("No record found with id 7"));
}

#[test]
fn test_delete_with_confirmation() {
    let home = setup("delete");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");
    add_simple(&home, "2025-09-02", "08:00", "PALA DOOSAN", "20");

    fl(&home)
        .args(["del", "1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Operation cancelled"));

    fl(&home)
        .args(["del", "1"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(contains("Record 1 has been deleted"));

    // the stored meters of the remaining record are untouched
    fl(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("50.00 → 70.00"))
        .stdout(contains("1 record(s)"));

    fl(&home)
        .args(["del", "1"])
        .assert()
        .failure()
        .stderr(contains("No record found with id 1"));
}

#[test]
fn test_backfill_is_idempotent() {
    let home = setup("backfill");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");
    add_simple(&home, "2025-09-02", "08:00", "PALA DOOSAN", "30");

    for id in ["1", "2"] {
        fl(&home)
            .args(["edit", id, "--clear-meters"])
            .assert()
            .success();
    }

    fl(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("4 meter value(s) derived"))
        .stdout(contains("fuellog backfill"));

    fl(&home)
        .arg("backfill")
        .assert()
        .success()
        .stdout(contains("2 record(s) updated"));

    fl(&home)
        .arg("backfill")
        .assert()
        .success()
        .stdout(contains("Nothing to backfill"));

    fl(&home)
        .args(["list", "--asc"])
        .assert()
        .success()
        .stdout(contains("50.00 → 80.00"))
        .stdout(contains("derived").not());
}

#[test]
fn test_malformed_meter_is_reported() {
    let home = setup("malformed");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");
    add_simple(&home, "2025-09-02", "08:00", "PALA DOOSAN", "30");

    let conn = rusqlite::Connection::open(db_path(&home)).expect("open db");
    conn.execute(
        "UPDATE distribucion_hyundai_equipos SET contador_final = 'n/a' WHERE id = 1",
        [],
    )
    .expect("corrupt meter");
    drop(conn);

    fl(&home)
        .args(["list", "--asc"])
        .assert()
        .success()
        .stdout(contains("0.00 → 50.00"))
        .stdout(contains("1 not numeric"));

    fl(&home)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(contains("meter end is not a number"));
}

#[test]
fn test_export_csv_and_json() {
    let home = setup("export");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");
    add_simple(&home, "2025-09-02", "08:00", "GENERADOR P2", "30");

    let csv = temp_out(&home, "out.csv");
    fl(&home)
        .args(["export", "--format", "csv", "--file", &csv])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let content = fs::read_to_string(&csv).expect("csv written");
    assert!(content.starts_with("id,date,time,equipment"));
    assert!(content.contains("50.00 → 80.00"));

    let json = temp_out(&home, "out.json");
    fl(&home)
        .args(["export", "--format", "json", "--file", &json, "-e", "generador"])
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).expect("json written")).expect("valid json");
    let rows = value.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sequence"], "50.00 → 80.00");
    assert_eq!(rows[0]["kind"], "WITHOUT_HOUR_METER");

    fl(&home)
        .args(["export", "--format", "csv", "--file", "relative.csv"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_export_empty_selection_writes_nothing() {
    let home = setup("export_empty");
    let csv = temp_out(&home, "empty.csv");

    fl(&home)
        .args(["export", "--file", &csv, "--month", "2025-01"])
        .assert()
        .success()
        .stdout(contains("No records found"));

    assert!(!std::path::Path::new(&csv).exists());
}

#[test]
fn test_log_records_operations() {
    let home = setup("log");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");

    fl(&home)
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("add"));
}

#[test]
fn test_db_info() {
    let home = setup("db_info");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");

    fl(&home)
        .args(["db", "--info"])
        .assert()
        .success()
        .stdout(contains("2025-09-01"));
}

#[test]
fn test_backup_plain_and_compressed() {
    let home = setup("backup");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");

    let dest = home.join("bk").join("copy.db");
    let dest_arg = dest.to_string_lossy().to_string();

    fl(&home)
        .args(["backup", "--file", &dest_arg])
        .assert()
        .success()
        .stdout(contains("Backup created"));

    let conn = rusqlite::Connection::open(&dest).expect("open backup");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM distribucion_hyundai_equipos", [], |r| r.get(0))
        .expect("count");
    assert_eq!(count, 1);
    drop(conn);
    fs::remove_file(&dest).expect("remove plain backup");

    fl(&home)
        .args(["backup", "--file", &dest_arg, "--compress"])
        .assert()
        .success();

    assert!(home.join("bk").join("copy.zip").exists());
    assert!(!dest.exists());
}

#[test]
fn test_db_check_reports_derived_meters() {
    let home = setup("db_check");

    add_simple(&home, "2025-09-01", "08:00", "PALA DOOSAN", "50");
    fl(&home)
        .args(["edit", "1", "--clear-meters"])
        .assert()
        .success();

    fl(&home)
        .args(["db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"))
        .stdout(contains("2 meter value(s) are derived"));
}
