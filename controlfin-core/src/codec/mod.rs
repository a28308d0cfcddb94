//! Tabular codecs: delimited text and spreadsheets
//!
//! Readers turn a whole file into rows of raw string cells; writers turn a
//! header row plus typed cells into a byte payload. Field mapping happens in
//! the import/export services, not here.

pub mod csv;
pub mod xlsx;

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::result::Result;

pub use self::csv::CsvCodec;
pub use self::xlsx::XlsxCodec;

/// Options shared by the readers
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Field separator for delimited text; ignored by spreadsheets
    pub delimiter: char,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

/// A single output cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(Decimal),
}

impl CellValue {
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<Decimal> for CellValue {
    fn from(n: Decimal) -> Self {
        CellValue::Number(n)
    }
}

pub trait TableReader {
    /// Parse a whole file; blank rows are dropped
    fn read_rows(bytes: &[u8], options: &ReadOptions) -> Result<Vec<Vec<String>>>;
}

pub trait TableWriter {
    fn write_rows(headers: &[&str], rows: &[Vec<CellValue>]) -> Result<Vec<u8>>;
}

/// Supported file layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// Guess the format from a file extension; anything unknown is read as CSV
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => TableFormat::Xlsx,
            _ => TableFormat::Csv,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Xlsx => "xlsx",
        }
    }

    pub fn read_rows(&self, bytes: &[u8], options: &ReadOptions) -> Result<Vec<Vec<String>>> {
        match self {
            TableFormat::Csv => CsvCodec::read_rows(bytes, options),
            TableFormat::Xlsx => XlsxCodec::read_rows(bytes, options),
        }
    }

    pub fn write_rows(&self, headers: &[&str], rows: &[Vec<CellValue>]) -> Result<Vec<u8>> {
        match self {
            TableFormat::Csv => CsvCodec::write_rows(headers, rows),
            TableFormat::Xlsx => XlsxCodec::write_rows(headers, rows),
        }
    }
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}
