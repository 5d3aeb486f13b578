pub mod export;
pub mod flatten;
pub mod sink;
pub mod slack;
pub mod table;

pub use flatten::{flatten, Record};
pub use sink::{CsvSink, SheetSink, XlsxSink};
pub use slack::{ChannelFilters, SlackClient};
pub use table::{from_table, to_table, Table};

pub use crate::utils::error::Result;
