//! Delimited text (RFC 4180 quoting)

use csv::{ReaderBuilder, WriterBuilder};

use super::{is_blank_row, CellValue, ReadOptions, TableReader, TableWriter};
use crate::domain::result::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct CsvCodec;

impl TableReader for CsvCodec {
    fn read_rows(bytes: &[u8], options: &ReadOptions) -> Result<Vec<Vec<String>>> {
        if !options.delimiter.is_ascii() {
            return Err(Error::validation(format!(
                "delimiter must be a single ASCII character, got {:?}",
                options.delimiter
            )));
        }
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter as u8)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| Error::parse(format!("malformed CSV: {e}")))?;
            let row: Vec<String> = record.iter().map(|f| f.to_string()).collect();
            if !is_blank_row(&row) {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

impl TableWriter for CsvCodec {
    fn write_rows(headers: &[&str], rows: &[Vec<CellValue>]) -> Result<Vec<u8>> {
        let mut wrt = WriterBuilder::new().from_writer(Vec::new());
        wrt.write_record(headers)?;
        for row in rows {
            wrt.write_record(row.iter().map(CellValue::as_text))?;
        }
        wrt.into_inner()
            .map_err(|e| Error::Other(format!("failed to flush CSV: {e}")))
    }
}
