use super::record_kind::RecordKind;

/// Typed partial update of a distribution record.
///
/// `None` leaves the stored field untouched. For nullable columns the inner
/// option is the new value, so `Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub date: Option<String>,
    pub time: Option<String>,
    pub equipment: Option<String>,
    pub operator: Option<String>,
    pub liters: Option<f64>,
    pub gallons: Option<f64>,
    pub meter_start: Option<Option<f64>>,
    pub meter_end: Option<Option<f64>>,
    pub hour_meter_start: Option<Option<f64>>,
    pub hour_meter_end: Option<Option<f64>>,
    pub hours_worked: Option<Option<f64>>,
    pub consumption_rate: Option<Option<f64>>,
    pub diesel_price: Option<Option<f64>>,
    pub estimated_cost: Option<Option<f64>>,
    pub kind: Option<RecordKind>,
}

impl RecordPatch {
    /// Patch that writes only the two tank meter values.
    pub fn meters(start: f64, end: f64) -> Self {
        Self {
            meter_start: Some(Some(start)),
            meter_end: Some(Some(end)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Clear all hour-meter derived columns at once.
    pub fn clear_hour_meter(&mut self) {
        self.hour_meter_start = Some(None);
        self.hour_meter_end = Some(None);
        self.hours_worked = Some(None);
        self.consumption_rate = Some(None);
    }
}
