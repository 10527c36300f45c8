pub mod colors;
pub mod date;
pub mod formatting;
pub mod path;
pub mod table;
pub mod time;
pub mod units;

pub use formatting::{fmt_meter, fmt_opt};
pub use units::{liters_to_gallons, round2};
