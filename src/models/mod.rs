pub mod filter;
pub mod patch;
pub mod record;
pub mod record_kind;

pub use filter::{KindFilter, RecordFilter, SortOrder};
pub use patch::RecordPatch;
pub use record::{DistributionRecord, HourMeter, MeterQuality, RecordDraft, normalize_equipment};
pub use record_kind::RecordKind;
