use fuellog::core::counter::{
    MeterField, MeterIssue, ReconciledView, backfill, backfill_patches, last_hour_meter_end,
    last_meter_end, reconcile, resolve_records,
};
use fuellog::core::list::ListLogic;
use fuellog::db::{DbPool, RecordStore};
use fuellog::models::{
    DistributionRecord, HourMeter, MeterQuality, RecordFilter, RecordKind, RecordPatch, SortOrder,
};
use fuellog::utils::{liters_to_gallons, round2};

fn rec(id: i64, date: &str, liters: f64, start: Option<f64>, end: Option<f64>) -> DistributionRecord {
    DistributionRecord {
        id,
        date: date.to_string(),
        time: "08:00".to_string(),
        equipment: "PALA DOOSAN".to_string(),
        operator: "Jose".to_string(),
        liters,
        gallons: liters_to_gallons(liters),
        meter_start: start,
        meter_end: end,
        hour_meter: None,
        diesel_price: None,
        estimated_cost: None,
        kind: RecordKind::WithoutHourMeter,
        stored_hour_end: None,
        meter_quality: MeterQuality::default(),
    }
}

#[test]
fn chain_starts_at_zero_and_carries_forward() {
    let records = vec![
        rec(1, "2025-09-01", 50.0, None, None),
        rec(2, "2025-09-02", 30.0, None, None),
    ];

    let r = reconcile(&records);

    assert_eq!(r.rows[0].label, "0.00 → 50.00");
    assert_eq!(r.rows[1].label, "50.00 → 80.00");
    assert_eq!(r.rows[1].delta, 30.0);
    assert_eq!(r.last_end, 80.0);
    assert_eq!(r.missing_count(), 4);
    assert_eq!(r.malformed_count(), 0);
}

#[test]
fn stored_start_breaks_the_chain() {
    let records = vec![
        rec(1, "2025-09-01", 50.0, Some(1000.0), Some(1050.0)),
        rec(2, "2025-09-02", 20.0, Some(2000.0), None),
        rec(3, "2025-09-03", 10.0, None, None),
    ];

    let r = reconcile(&records);

    assert_eq!(r.rows[1].label, "2000.00 → 2020.00");
    assert_eq!(r.rows[2].label, "2020.00 → 2030.00");
    assert!(!r.rows[0].needs_backfill());
    assert!(r.rows[1].needs_backfill());
}

#[test]
fn stored_values_win_even_when_inconsistent() {
    // end lower than start is shown as stored, with a negative delta
    let records = vec![rec(1, "2025-09-01", 40.0, Some(500.0), Some(480.0))];

    let r = reconcile(&records);

    assert_eq!(r.rows[0].display_start, 500.0);
    assert_eq!(r.rows[0].display_end, 480.0);
    assert_eq!(r.rows[0].delta, -20.0);
    assert!(r.warnings.is_empty());
}

#[test]
fn reconciling_resolved_records_changes_nothing() {
    let records = vec![
        rec(1, "2025-09-01", 12.345, None, None),
        rec(2, "2025-09-02", 7.5, Some(100.0), None),
        rec(3, "2025-09-03", 3.0, None, Some(150.0)),
        rec(4, "2025-09-04", 9.99, None, None),
    ];

    let first = reconcile(&records);
    let second = reconcile(&resolve_records(&records));

    let resolved = |r: &fuellog::core::counter::Reconciliation| {
        r.rows
            .iter()
            .map(|row| (row.id, row.resolved_start, row.resolved_end))
            .collect::<Vec<_>>()
    };
    assert_eq!(resolved(&first), resolved(&second));
    assert!(second.warnings.is_empty());
    assert_eq!(first.last_end, second.last_end);
}

#[test]
fn malformed_values_are_warnings() {
    let mut bad = rec(1, "2025-09-01", 10.0, None, None);
    bad.meter_quality.end_malformed = true;

    let r = reconcile(&[bad]);

    assert_eq!(r.rows[0].resolved_end, 10.0);
    assert_eq!(r.malformed_count(), 1);
    assert_eq!(r.missing_count(), 1);

    let w = r
        .warnings
        .iter()
        .find(|w| w.issue == MeterIssue::Malformed)
        .expect("malformed warning");
    assert_eq!(w.field, MeterField::End);
    assert!(w.to_string().contains("not a number"));
}

#[test]
fn next_meter_start_defaults() {
    assert_eq!(last_meter_end(&[]), 0.0);

    let records = vec![
        rec(1, "2025-09-01", 50.0, None, None),
        rec(2, "2025-09-02", 30.0, None, None),
    ];
    assert_eq!(last_meter_end(&records), 80.0);
}

#[test]
fn hour_meter_default_is_per_equipment() {
    let mut a = rec(1, "2025-09-01", 40.0, None, None);
    a.kind = RecordKind::WithHourMeter;
    a.hour_meter = Some(HourMeter::new(100.0, 108.5, a.gallons).expect("valid hour meter"));

    let mut b = rec(2, "2025-09-02", 20.0, None, None);
    b.equipment = "GENERADOR P2".to_string();

    let records = vec![a, b];
    assert_eq!(last_hour_meter_end(&records, " pala doosan "), 108.5);
    assert_eq!(last_hour_meter_end(&records, "GENERADOR P2"), 0.0);
    assert_eq!(last_hour_meter_end(&records, "RETRO JCB RE02"), 0.0);
}

#[test]
fn derived_quantities() {
    assert_eq!(liters_to_gallons(100.0), 26.42);
    assert_eq!(round2(2.675_1), 2.68);

    let hm = HourMeter::new(100.0, 110.0, 26.42).expect("valid hour meter");
    assert_eq!(hm.hours_worked, 10.0);
    assert_eq!(hm.consumption_rate, 2.64);

    let err = HourMeter::new(100.0, 100.0, 26.42).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn backfill_patches_only_touch_incomplete_rows() {
    let records = vec![
        rec(1, "2025-09-01", 50.0, Some(10.0), Some(60.0)),
        rec(2, "2025-09-02", 30.0, None, None),
    ];

    let patches = backfill_patches(&records);

    assert_eq!(patches, vec![(2, RecordPatch::meters(60.0, 90.0))]);
}

#[test]
fn backfill_reaches_a_fixpoint() {
    let mut pool = DbPool::in_memory().expect("in-memory db");

    let ids: Vec<i64> = [
        rec(0, "2025-09-01", 50.0, None, None),
        rec(0, "2025-09-02", 30.0, Some(200.0), None),
        rec(0, "2025-09-03", 20.0, None, None),
    ]
    .iter()
    .map(|r| pool.insert(r).expect("insert"))
    .collect();

    let before = reconcile(&pool.scan_all().expect("scan"));

    assert_eq!(backfill(&mut pool).expect("backfill"), 3);
    assert_eq!(backfill(&mut pool).expect("second backfill"), 0);

    let after = reconcile(&pool.scan_all().expect("scan"));
    assert!(after.warnings.is_empty());
    for (b, a) in before.rows.iter().zip(after.rows.iter()) {
        assert_eq!(b.resolved_start, a.resolved_start);
        assert_eq!(b.resolved_end, a.resolved_end);
    }

    let third = pool.get_by_id(ids[2]).expect("get").expect("exists");
    assert_eq!(third.meter_start, Some(230.0));
    assert_eq!(third.meter_end, Some(250.0));
}

#[test]
fn filtered_listing_uses_the_full_chain() {
    let mut pool = DbPool::in_memory().expect("in-memory db");
    for r in [
        rec(0, "2025-08-30", 100.0, None, None),
        rec(0, "2025-09-01", 25.0, None, None),
    ] {
        pool.insert(&r).expect("insert");
    }

    let listing = ListLogic::load(
        &pool,
        &RecordFilter::month("2025-09"),
        SortOrder::Ascending,
    )
    .expect("listing");

    assert_eq!(listing.rows.len(), 1);
    assert_eq!(listing.rows[0].counter.label, "100.00 → 125.00");

    let view = ReconciledView::load(&pool).expect("view");
    assert_eq!(view.last_end, 125.0);
}

#[test]
fn ties_on_date_and_time_follow_the_id() {
    let mut pool = DbPool::in_memory().expect("in-memory db");
    let first = pool
        .insert(&rec(0, "2025-09-01", 10.0, None, None))
        .expect("insert");
    let second = pool
        .insert(&rec(0, "2025-09-01", 5.0, None, None))
        .expect("insert");

    let view = ReconciledView::load(&pool).expect("view");

    assert_eq!(view.row(first).map(|r| r.label.as_str()), Some("0.00 → 10.00"));
    assert_eq!(view.row(second).map(|r| r.label.as_str()), Some("10.00 → 15.00"));
}

#[test]
fn hour_meter_default_reads_unpaired_stored_end() {
    let pool = DbPool::in_memory().expect("in-memory db");
    pool.conn
        .execute(
            "INSERT INTO distribucion_hyundai_equipos
             (fecha, hora, equipo, responsable, litros_despachados, horometro_final)
             VALUES ('2025-06-10', '07:00', 'PALA DOOSAN', 'Jose', 40.0, 2315.5)",
            [],
        )
        .expect("legacy row");

    let records = pool.scan_all().expect("scan");
    assert_eq!(records.len(), 1);
    assert!(records[0].hour_meter.is_none());
    assert_eq!(records[0].hour_meter_end(), Some(2315.5));

    assert_eq!(last_hour_meter_end(&records, "pala doosan"), 2315.5);
}
