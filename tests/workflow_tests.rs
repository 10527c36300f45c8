use chrono::{NaiveDate, NaiveTime};
use fuellog::core::workflow::{
    EntryContext, EntryPrompt, EntryWorkflow, Input, PresetPrompt, Question, Step, Transition,
};
use fuellog::errors::AppResult;
use fuellog::models::{DistributionRecord, MeterQuality, RecordKind};
use fuellog::ui::prompt::TerminalPrompt;
use std::collections::VecDeque;
use std::io::Cursor;

/// Replays a fixed list of answers and records what was asked.
struct Scripted {
    answers: VecDeque<Input>,
    asked: Vec<Step>,
    rejections: Vec<Step>,
}

impl Scripted {
    fn new(answers: &[&str]) -> Self {
        let answers = answers
            .iter()
            .map(|a| match *a {
                "<back>" => Input::Back,
                "<cancel>" => Input::Cancel,
                text => Input::Text(text.to_string()),
            })
            .collect();
        Self {
            answers,
            asked: Vec::new(),
            rejections: Vec::new(),
        }
    }
}

impl EntryPrompt for Scripted {
    fn ask(&mut self, question: &Question) -> AppResult<Input> {
        self.asked.push(question.step);
        Ok(self.answers.pop_front().unwrap_or(Input::Cancel))
    }

    fn rejected(&mut self, step: Step, _reason: &str) -> AppResult<()> {
        self.rejections.push(step);
        Ok(())
    }
}

fn catalogs() -> (Vec<String>, Vec<String>) {
    (
        vec!["GENERADOR P2".to_string(), "PALA DOOSAN".to_string()],
        vec!["Allan".to_string(), "Jose".to_string()],
    )
}

fn ctx<'a>(
    records: &'a [DistributionRecord],
    eq: &'a [String],
    ops: &'a [String],
) -> EntryContext<'a> {
    EntryContext {
        records,
        equipment: eq,
        operators: ops,
        today: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
        now: NaiveTime::from_hms_opt(14, 5, 0).unwrap(),
        default_price: 2.7955,
    }
}

fn previous() -> Vec<DistributionRecord> {
    vec![DistributionRecord {
        id: 1,
        date: "2025-09-01".into(),
        time: "08:00".into(),
        equipment: "GENERADOR P2".into(),
        operator: "Allan".into(),
        liters: 120.0,
        gallons: 31.7,
        meter_start: Some(1000.0),
        meter_end: Some(1120.0),
        hour_meter: None,
        diesel_price: None,
        estimated_cost: None,
        kind: RecordKind::WithoutHourMeter,
        stored_hour_end: None,
        meter_quality: MeterQuality::default(),
    }]
}

#[test]
fn defaults_fill_a_record_without_hour_meter() {
    let (eq, ops) = catalogs();
    let records = previous();
    let wf = EntryWorkflow::new(ctx(&records, &eq, &ops), None);

    // kind, date, time, equipment, operator, liters, meters and price
    let mut prompt = Scripted::new(&["2", "", "", "1", "2", "100", "", "", ""]);
    let rec = wf.run(&mut prompt).expect("run").expect("not cancelled");

    assert_eq!(rec.kind, RecordKind::WithoutHourMeter);
    assert_eq!(rec.date, "2025-09-15");
    assert_eq!(rec.time, "14:05");
    assert_eq!(rec.equipment, "GENERADOR P2");
    assert_eq!(rec.operator, "Jose");
    assert_eq!(rec.gallons, 26.42);
    assert_eq!(rec.meter_start, Some(1120.0));
    assert_eq!(rec.meter_end, Some(1220.0));
    assert_eq!(rec.diesel_price, Some(2.7955));
    assert_eq!(rec.estimated_cost, Some(73.86));
    assert!(rec.hour_meter.is_none());
    assert!(!prompt.asked.contains(&Step::HourMeterStart));
}

#[test]
fn hour_meter_record_computes_consumption() {
    let (eq, ops) = catalogs();
    let wf = EntryWorkflow::new(ctx(&[], &eq, &ops), None);

    let mut prompt = Scripted::new(&[
        "1", "3", "07:15", "PALA DOOSAN", "Allan", "100", "0", "", "500", "510", "3",
    ]);
    let rec = wf.run(&mut prompt).expect("run").expect("not cancelled");

    assert_eq!(rec.date, "2025-09-03");
    let hm = rec.hour_meter.expect("hour meter");
    assert_eq!(hm.hours_worked, 10.0);
    assert_eq!(hm.consumption_rate, 2.64);
    assert_eq!(rec.estimated_cost, Some(79.26));
}

#[test]
fn back_returns_to_previous_step() {
    let (eq, ops) = catalogs();
    let mut wf = EntryWorkflow::new(ctx(&[], &eq, &ops), Some(RecordKind::WithoutHourMeter));

    assert_eq!(wf.handle(Input::Text("2025-09-10".into())), Transition::Advance);
    assert_eq!(wf.current(), Some(Step::Time));
    assert_eq!(wf.handle(Input::Back), Transition::Back);
    assert_eq!(wf.current(), Some(Step::Date));

    // back on the first step stays there
    assert_eq!(wf.handle(Input::Back), Transition::Back);
    assert_eq!(wf.current(), Some(Step::Date));
}

#[test]
fn invalid_answers_are_asked_again() {
    let (eq, ops) = catalogs();
    let wf = EntryWorkflow::new(ctx(&[], &eq, &ops), Some(RecordKind::WithHourMeter));

    let mut prompt = Scripted::new(&[
        "2025-09-31", // no such day
        "2025-09-30",
        "25:00", // bad time
        "",
        "2",
        "1",
        "abc", // not a number
        "40",
        "",
        "",
        "",
        "0", // hours must be positive
        "4",
        "",
    ]);
    let rec = wf.run(&mut prompt).expect("run").expect("not cancelled");

    assert_eq!(
        prompt.rejections,
        vec![Step::Date, Step::Time, Step::Liters, Step::HourMeterEnd]
    );
    assert_eq!(rec.date, "2025-09-30");
    assert_eq!(rec.liters, 40.0);
    assert_eq!(rec.hour_meter.map(|h| h.hours_worked), Some(4.0));
}

#[test]
fn cancel_produces_nothing() {
    let (eq, ops) = catalogs();
    let wf = EntryWorkflow::new(ctx(&[], &eq, &ops), None);

    let mut prompt = Scripted::new(&["2", "", "<cancel>"]);
    assert!(wf.run(&mut prompt).expect("run").is_none());
    assert_eq!(prompt.asked, vec![Step::Kind, Step::Date, Step::Time]);
}

#[test]
fn switching_kind_after_back_changes_the_steps() {
    let (eq, ops) = catalogs();
    let mut wf = EntryWorkflow::new(ctx(&[], &eq, &ops), None);

    assert_eq!(wf.handle(Input::Text("1".into())), Transition::Advance);
    assert!(wf.steps().contains(&Step::HourMeterEnd));

    assert_eq!(wf.handle(Input::Back), Transition::Back);
    assert_eq!(wf.handle(Input::Text("2".into())), Transition::Advance);
    assert!(!wf.steps().contains(&Step::HourMeterEnd));
    assert!(!wf.is_done());
}

#[test]
fn preset_rejection_is_a_validation_error() {
    let (eq, ops) = catalogs();
    let wf = EntryWorkflow::new(ctx(&[], &eq, &ops), Some(RecordKind::WithoutHourMeter));

    let mut preset = PresetPrompt::new()
        .set(Step::Equipment, Some("PALA DOOSAN"))
        .set(Step::Operator, Some("Nobody"))
        .set(Step::Liters, Some("10"));

    let err = wf.run(&mut preset).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("Operator"));
}

#[test]
fn terminal_prompt_understands_back_and_quit() {
    let (eq, ops) = catalogs();
    let wf = EntryWorkflow::new(ctx(&[], &eq, &ops), Some(RecordKind::WithoutHourMeter));

    let input = Cursor::new("2025-09-02\nb\n\n08:30\nq\n");
    let mut prompt = TerminalPrompt::new(input);

    assert!(wf.run(&mut prompt).expect("run").is_none());
}

#[test]
fn terminal_prompt_end_of_input_cancels() {
    let (eq, ops) = catalogs();
    let wf = EntryWorkflow::new(ctx(&[], &eq, &ops), None);

    let mut prompt = TerminalPrompt::new(Cursor::new(""));
    assert!(wf.run(&mut prompt).expect("run").is_none());
}
