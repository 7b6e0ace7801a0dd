//! Parsers for campaign history exports

pub mod history;

pub use history::{HistoryFile, HistoryFormat, HistoryParser, RowLocation, SkippedRow};
