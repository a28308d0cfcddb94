//! Spreadsheet workbooks
//!
//! Reading accepts anything calamine can open (xlsx, xlsm, xlsb, xls, ods) and
//! uses the first worksheet. Writing always produces a single-sheet xlsx.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use super::{is_blank_row, CellValue, ReadOptions, TableReader, TableWriter};
use crate::domain::result::{Error, Result};

pub const SHEET_NAME: &str = "Transactions";

pub struct XlsxCodec;

impl TableReader for XlsxCodec {
    fn read_rows(bytes: &[u8], _options: &ReadOptions) -> Result<Vec<Vec<String>>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::parse("workbook has no worksheets"))??;

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
            .filter(|row| !is_blank_row(row))
            .collect();
        Ok(rows)
    }
}

impl TableWriter for XlsxCodec {
    fn write_rows(headers: &[&str], rows: &[Vec<CellValue>]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        for (r, row) in rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    CellValue::Text(s) => {
                        worksheet.write_string(r, c, s.as_str())?;
                    }
                    CellValue::Number(n) => match n.to_f64() {
                        Some(f) => {
                            worksheet.write_number(r, c, f)?;
                        }
                        None => {
                            worksheet.write_string(r, c, n.to_string())?;
                        }
                    },
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

/// Render a cell the way it would appear as CSV text
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        Data::DateTimeIso(s) => s.get(..10).unwrap_or(s).to_string(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// Excel serial day number to `YYYY-MM-DD`
///
/// Excel's epoch is 1899-12-30 once the 1900 leap year bug is accounted for.
pub fn excel_serial_to_date(serial: f64) -> String {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|base| base.checked_add_signed(Duration::days(serial.trunc() as i64)))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| serial.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), "2025-01-10");
        assert_eq!(excel_serial_to_date(45667.75), "2025-01-10");
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell_to_string(&Data::Float(12.0)), "12");
        assert_eq!(cell_to_string(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_to_string(&Data::String(" Rent ".into())), "Rent");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let bytes = XlsxCodec::write_rows(
            &["description", "amount"],
            &[
                vec![CellValue::from("Groceries, weekly"), CellValue::from(Decimal::new(4599, 2))],
                vec![CellValue::from("Rent"), CellValue::from(Decimal::new(1200, 0))],
            ],
        )
        .unwrap();
        assert!(bytes.starts_with(b"PK"));

        let rows = XlsxCodec::read_rows(&bytes, &ReadOptions::default()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["description", "amount"]);
        assert_eq!(rows[1], vec!["Groceries, weekly", "45.99"]);
        assert_eq!(rows[2], vec!["Rent", "1200"]);
    }

    #[test]
    fn test_garbage_is_a_single_error() {
        let err = XlsxCodec::read_rows(b"not a workbook", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Spreadsheet(_)));
    }
}
