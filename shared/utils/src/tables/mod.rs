//! Spreadsheet ingestion for the two positional table exports.

pub mod parser;

pub use parser::{
    parse_registration, parse_reporting, columns, ParsedTable, TableFormat,
};
