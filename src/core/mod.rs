pub mod add;
pub mod backup;
pub mod counter;
pub mod del;
pub mod edit;
pub mod list;
pub mod log;
pub mod price;
pub mod workflow;
