//! Record entry as an explicit state machine over an ordered list of steps.
//!
//! The workflow itself does no I/O: answers come from an [`EntryPrompt`]
//! (terminal or command-line flags), and everything it needs to compute
//! defaults is handed in through [`EntryContext`].

use crate::core::counter::{last_hour_meter_end, last_meter_end};
use crate::errors::{AppError, AppResult};
use crate::models::{DistributionRecord, RecordDraft, RecordKind, normalize_equipment};
use crate::utils::date::parse_flexible_date;
use crate::utils::time::parse_time_or_now;
use crate::utils::units::{parse_number, round2};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Kind,
    Date,
    Time,
    Equipment,
    Operator,
    Liters,
    MeterStart,
    MeterEnd,
    HourMeterStart,
    HourMeterEnd,
    Price,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::Kind => "Record type (1 = with hour meter, 2 = without)",
            Step::Date => "Date (YYYY-MM-DD or day DD)",
            Step::Time => "Time (HH:MM)",
            Step::Equipment => "Equipment (number or name)",
            Step::Operator => "Operator (number or name)",
            Step::Liters => "Liters dispensed",
            Step::MeterStart => "Meter start",
            Step::MeterEnd => "Meter end",
            Step::HourMeterStart => "Hour meter start",
            Step::HourMeterEnd => "Hour meter end",
            Step::Price => "Diesel price (USD/gal)",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One answer from the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Back,
    Cancel,
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advance,
    Back,
    Cancel,
    Retry(String),
}

/// What the prompt shows for a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub step: Step,
    pub default: Option<String>,
    /// Numbered catalog entries, for equipment and operator.
    pub choices: Vec<String>,
}

/// Source of answers for the workflow.
pub trait EntryPrompt {
    fn ask(&mut self, question: &Question) -> AppResult<Input>;

    /// Called when an answer was rejected. Returning an error aborts the
    /// workflow; returning `Ok` asks the same step again.
    fn rejected(&mut self, step: Step, reason: &str) -> AppResult<()>;
}

/// Everything the workflow reads, passed in explicitly.
pub struct EntryContext<'a> {
    /// Existing records, ascending by `(date, time, id)`.
    pub records: &'a [DistributionRecord],
    pub equipment: &'a [String],
    pub operators: &'a [String],
    pub today: NaiveDate,
    pub now: NaiveTime,
    pub default_price: f64,
}

#[derive(Debug, Clone, Default)]
struct EntryState {
    kind: Option<RecordKind>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    equipment: Option<String>,
    operator: Option<String>,
    liters: Option<f64>,
    meter_start: Option<f64>,
    meter_end: Option<f64>,
    hour_meter_start: Option<f64>,
    hour_meter_end: Option<f64>,
    price: Option<f64>,
}

pub struct EntryWorkflow<'a> {
    ctx: EntryContext<'a>,
    preset_kind: Option<RecordKind>,
    state: EntryState,
    index: usize,
}

fn pick_from_catalog<'c>(input: &str, catalog: &'c [String]) -> Option<&'c String> {
    let n: usize = input.parse().ok()?;
    catalog.get(n.checked_sub(1)?)
}

impl<'a> EntryWorkflow<'a> {
    pub fn new(ctx: EntryContext<'a>, preset_kind: Option<RecordKind>) -> Self {
        let state = EntryState {
            kind: preset_kind,
            ..EntryState::default()
        };
        Self {
            ctx,
            preset_kind,
            state,
            index: 0,
        }
    }

    /// Ordered steps for the kind chosen so far.
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(11);
        if self.preset_kind.is_none() {
            steps.push(Step::Kind);
        }
        steps.extend([
            Step::Date,
            Step::Time,
            Step::Equipment,
            Step::Operator,
            Step::Liters,
            Step::MeterStart,
            Step::MeterEnd,
        ]);
        if self.state.kind.is_some_and(|k| k.uses_hour_meter()) {
            steps.extend([Step::HourMeterStart, Step::HourMeterEnd]);
        }
        steps.push(Step::Price);
        steps
    }

    pub fn current(&self) -> Option<Step> {
        self.steps().get(self.index).copied()
    }

    pub fn is_done(&self) -> bool {
        self.current().is_none()
    }

    fn meter_start_default(&self) -> f64 {
        last_meter_end(self.ctx.records)
    }

    fn meter_end_default(&self) -> f64 {
        let start = self
            .state
            .meter_start
            .unwrap_or_else(|| self.meter_start_default());
        round2(start + self.state.liters.unwrap_or(0.0))
    }

    fn hour_start_default(&self) -> f64 {
        match &self.state.equipment {
            Some(eq) => last_hour_meter_end(self.ctx.records, eq),
            None => 0.0,
        }
    }

    pub fn question(&self, step: Step) -> Question {
        let default = match step {
            Step::Kind | Step::Equipment | Step::Operator | Step::Liters | Step::HourMeterEnd => {
                None
            }
            Step::Date => Some(self.ctx.today.format("%Y-%m-%d").to_string()),
            Step::Time => Some(self.ctx.now.format("%H:%M").to_string()),
            Step::MeterStart => Some(format!("{:.2}", self.meter_start_default())),
            Step::MeterEnd => Some(format!("{:.2}", self.meter_end_default())),
            Step::HourMeterStart => Some(format!("{:.2}", self.hour_start_default())),
            Step::Price => Some(format!("{:.4}", self.ctx.default_price)),
        };

        let choices = match step {
            Step::Equipment => self.ctx.equipment.to_vec(),
            Step::Operator => self.ctx.operators.to_vec(),
            _ => Vec::new(),
        };

        Question {
            step,
            default,
            choices,
        }
    }

    fn number_or(&self, text: &str, default: f64) -> Result<f64, String> {
        if text.is_empty() {
            return Ok(default);
        }
        parse_number(text).ok_or_else(|| format!("'{}' is not a number", text))
    }

    /// Validate one answer and store it. Returns the rejection reason.
    fn accept(&mut self, step: Step, text: &str) -> Result<(), String> {
        let text = text.trim();

        match step {
            Step::Kind => {
                let kind = RecordKind::from_input(text)
                    .ok_or_else(|| "choose 1 (with hour meter) or 2 (without)".to_string())?;
                self.state.kind = Some(kind);
            }
            Step::Date => {
                let d = parse_flexible_date(text, self.ctx.today).map_err(|e| e.to_string())?;
                self.state.date = Some(d);
            }
            Step::Time => {
                let t = parse_time_or_now(text, self.ctx.now).map_err(|e| e.to_string())?;
                self.state.time = Some(t);
            }
            Step::Equipment => {
                if text.is_empty() {
                    return Err("equipment is required".into());
                }
                let name = pick_from_catalog(text, self.ctx.equipment)
                    .cloned()
                    .unwrap_or_else(|| text.to_string());
                self.state.equipment = Some(normalize_equipment(&name));
            }
            Step::Operator => {
                if text.is_empty() {
                    return Err("operator is required".into());
                }
                let name = pick_from_catalog(text, self.ctx.operators)
                    .or_else(|| {
                        self.ctx
                            .operators
                            .iter()
                            .find(|o| o.eq_ignore_ascii_case(text))
                    })
                    .ok_or_else(|| format!("'{}' is not in the operator list", text))?;
                self.state.operator = Some(name.clone());
            }
            Step::Liters => {
                if text.is_empty() {
                    return Err("liters are required".into());
                }
                let v = self.number_or(text, 0.0)?;
                if v < 0.0 {
                    return Err("liters cannot be negative".into());
                }
                self.state.liters = Some(v);
            }
            Step::MeterStart => {
                let v = self.number_or(text, self.meter_start_default())?;
                self.state.meter_start = Some(v);
            }
            Step::MeterEnd => {
                let v = self.number_or(text, self.meter_end_default())?;
                self.state.meter_end = Some(v);
            }
            Step::HourMeterStart => {
                let v = self.number_or(text, self.hour_start_default())?;
                self.state.hour_meter_start = Some(v);
            }
            Step::HourMeterEnd => {
                if text.is_empty() {
                    return Err("hour meter end is required".into());
                }
                let end = self.number_or(text, 0.0)?;
                let start = self.state.hour_meter_start.unwrap_or(0.0);
                if round2(end - start) <= 0.0 {
                    return Err(format!(
                        "hour meter end must be greater than start ({:.2})",
                        start
                    ));
                }
                self.state.hour_meter_end = Some(end);
            }
            Step::Price => {
                let v = self.number_or(text, self.ctx.default_price)?;
                if v < 0.0 {
                    return Err("price cannot be negative".into());
                }
                self.state.price = Some(v);
            }
        }

        Ok(())
    }

    /// Feed one input to the current step and move accordingly.
    pub fn handle(&mut self, input: Input) -> Transition {
        let Some(step) = self.current() else {
            return Transition::Advance;
        };

        match input {
            Input::Cancel => Transition::Cancel,
            Input::Back => {
                self.index = self.index.saturating_sub(1);
                Transition::Back
            }
            Input::Text(text) => match self.accept(step, &text) {
                Ok(()) => {
                    self.index += 1;
                    Transition::Advance
                }
                Err(reason) => Transition::Retry(reason),
            },
        }
    }

    /// The collected draft, once every step has been answered.
    pub fn draft(&self) -> AppResult<RecordDraft> {
        let missing = |what: &str| AppError::Validation(format!("{} was not entered", what));
        let s = &self.state;

        Ok(RecordDraft {
            kind: s.kind.ok_or_else(|| missing("record type"))?,
            date: s.date.ok_or_else(|| missing("date"))?,
            time: s.time.ok_or_else(|| missing("time"))?,
            equipment: s.equipment.clone().ok_or_else(|| missing("equipment"))?,
            operator: s.operator.clone().ok_or_else(|| missing("operator"))?,
            liters: s.liters.ok_or_else(|| missing("liters"))?,
            meter_start: s.meter_start.ok_or_else(|| missing("meter start"))?,
            meter_end: s.meter_end.ok_or_else(|| missing("meter end"))?,
            hour_meter_start: s.hour_meter_start,
            hour_meter_end: s.hour_meter_end,
            diesel_price: s.price,
        })
    }

    /// Drive the workflow to completion. `None` means cancelled.
    pub fn run<P: EntryPrompt>(mut self, prompt: &mut P) -> AppResult<Option<DistributionRecord>> {
        while let Some(step) = self.current() {
            let question = self.question(step);
            let input = prompt.ask(&question)?;

            match self.handle(input) {
                Transition::Advance | Transition::Back => {}
                Transition::Cancel => return Ok(None),
                Transition::Retry(reason) => prompt.rejected(step, &reason)?,
            }
        }

        self.draft()?.build().map(Some)
    }
}

/// Answers taken from command-line flags. A missing answer accepts the
/// step's default; a rejected answer is a validation error.
#[derive(Debug, Clone, Default)]
pub struct PresetPrompt {
    answers: HashMap<Step, String>,
}

impl PresetPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, step: Step, value: Option<impl ToString>) -> Self {
        if let Some(v) = value {
            self.answers.insert(step, v.to_string());
        }
        self
    }
}

impl EntryPrompt for PresetPrompt {
    fn ask(&mut self, question: &Question) -> AppResult<Input> {
        Ok(Input::Text(
            self.answers.get(&question.step).cloned().unwrap_or_default(),
        ))
    }

    fn rejected(&mut self, step: Step, reason: &str) -> AppResult<()> {
        Err(AppError::Validation(format!("{}: {}", step.label(), reason)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(eq: &'a [String], ops: &'a [String]) -> EntryContext<'a> {
        EntryContext {
            records: &[],
            equipment: eq,
            operators: ops,
            today: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            now: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            default_price: 2.7955,
        }
    }

    #[test]
    fn hour_steps_only_for_with_kind() {
        let eq = vec!["PALA DOOSAN".to_string()];
        let ops = vec!["Jose".to_string()];

        let wf = EntryWorkflow::new(ctx(&eq, &ops), Some(RecordKind::WithoutHourMeter));
        assert!(!wf.steps().contains(&Step::HourMeterEnd));
        assert!(!wf.steps().contains(&Step::Kind));

        let wf = EntryWorkflow::new(ctx(&eq, &ops), Some(RecordKind::WithHourMeter));
        assert!(wf.steps().contains(&Step::HourMeterStart));
    }

    #[test]
    fn bare_day_past_month_end_is_retried() {
        let eq: Vec<String> = vec![];
        let ops: Vec<String> = vec![];
        let mut wf = EntryWorkflow::new(ctx(&eq, &ops), Some(RecordKind::WithoutHourMeter));
        assert_eq!(wf.current(), Some(Step::Date));
        assert!(matches!(
            wf.handle(Input::Text("30".into())),
            Transition::Retry(_)
        ));
        assert_eq!(wf.handle(Input::Text("28".into())), Transition::Advance);
        assert_eq!(wf.current(), Some(Step::Time));
    }

    #[test]
    fn operator_must_come_from_catalog() {
        let eq: Vec<String> = vec![];
        let ops = vec!["Allan".to_string(), "Jose".to_string()];
        let mut wf = EntryWorkflow::new(ctx(&eq, &ops), Some(RecordKind::WithoutHourMeter));
        for answer in ["", "", "camion ah7922"] {
            assert_eq!(wf.handle(Input::Text(answer.into())), Transition::Advance);
        }
        assert_eq!(wf.current(), Some(Step::Operator));
        assert!(matches!(
            wf.handle(Input::Text("Pedro".into())),
            Transition::Retry(_)
        ));
        assert_eq!(wf.handle(Input::Text("jose".into())), Transition::Advance);
        assert_eq!(wf.state.operator.as_deref(), Some("Jose"));
        assert_eq!(wf.state.equipment.as_deref(), Some("CAMION AH7922"));
    }
}
