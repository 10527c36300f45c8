pub mod add;
pub mod backfill;
pub mod backup;
pub mod config;
pub mod db;
pub mod del;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod report;
pub mod show;
pub mod template;
