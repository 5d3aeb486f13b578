pub mod config;
pub mod core;
pub mod utils;

pub use crate::config::job::{JobConfig, OutputFormat};
pub use crate::core::export::{export_channels, export_users, run_job, ExportParams, ExportSummary};
pub use crate::core::{
    flatten, from_table, to_table, ChannelFilters, CsvSink, Record, SheetSink, SlackClient, Table,
    XlsxSink,
};
pub use crate::utils::error::{Result, SyncError};
