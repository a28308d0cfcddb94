//! Export service - CSV and spreadsheet export

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::filter::sort_transactions;
use crate::codec::{CellValue, TableFormat};
use crate::domain::result::Error;
use crate::domain::{DateRange, ReferenceData, SortKey, SortOrder, Transaction};
use crate::i18n::{catalog, Locale};
use crate::ports::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
    /// Recognised but not implemented
    Pdf,
}

impl ExportFormat {
    fn table_format(&self) -> Option<TableFormat> {
        match self {
            ExportFormat::Csv => Some(TableFormat::Csv),
            ExportFormat::Xlsx => Some(TableFormat::Xlsx),
            ExportFormat::Pdf => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Xlsx => write!(f, "xlsx"),
            ExportFormat::Pdf => write!(f, "pdf"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(Error::validation(format!("unknown export format: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// `None` exports everything
    pub date_range: Option<DateRange>,
    pub include_categories: bool,
    pub include_payment_methods: bool,
    pub include_metadata: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            date_range: None,
            include_categories: true,
            include_payment_methods: true,
            include_metadata: false,
        }
    }
}

impl ExportOptions {
    /// Column keys in output order
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![
            "id",
            "type",
            "amount",
            "description",
            "date",
            "tags",
            "isRecurring",
        ];
        if self.include_categories {
            columns.push("category");
        }
        if self.include_payment_methods {
            columns.push("paymentMethod");
        }
        if self.include_metadata {
            columns.push("location");
            columns.push("notes");
        }
        columns
    }
}

/// Serialized export ready to be written or downloaded
#[derive(Debug, Clone)]
pub struct ExportPayload {
    /// `transactions_<YYYY-MM-DD>.<ext>`
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Transactions included
    pub count: usize,
}

/// Flat record for one transaction, aligned with [`ExportOptions::columns`]
pub fn export_row(
    tx: &Transaction,
    options: &ExportOptions,
    reference: &ReferenceData,
    locale: &Locale,
) -> Vec<CellValue> {
    let recurring_key = if tx.is_recurring { "common.yes" } else { "common.no" };

    let mut row = vec![
        CellValue::from(tx.id.to_string()),
        CellValue::from(tx.transaction_type.as_str()),
        CellValue::from(tx.amount),
        CellValue::from(tx.description.as_str()),
        CellValue::from(tx.date.format("%Y-%m-%d").to_string()),
        CellValue::from(tx.tags.join(",")),
        CellValue::from(catalog().get_message(locale, recurring_key, None)),
    ];
    if options.include_categories {
        let name = reference.category_name(&tx.category_id).unwrap_or(&tx.category_id);
        row.push(CellValue::from(name));
    }
    if options.include_payment_methods {
        let name = reference
            .payment_method_name(&tx.payment_method_id)
            .unwrap_or(&tx.payment_method_id);
        row.push(CellValue::from(name));
    }
    if options.include_metadata {
        row.push(CellValue::from(tx.location().unwrap_or_default()));
        row.push(CellValue::from(tx.notes().unwrap_or_default()));
    }
    row
}

/// Narrow, shape and serialize transactions
///
/// PDF is rejected before any work is done.
pub fn export_transactions(
    transactions: &[Transaction],
    options: &ExportOptions,
    reference: &ReferenceData,
    locale: &Locale,
    today: NaiveDate,
) -> crate::domain::result::Result<ExportPayload> {
    let Some(format) = options.format.table_format() else {
        return Err(Error::NotImplemented(catalog().get_message(
            locale,
            "export.pdfNotImplemented",
            None,
        )));
    };

    let rows: Vec<Vec<CellValue>> = transactions
        .iter()
        .filter(|tx| options.date_range.map_or(true, |r| r.contains(&tx.date)))
        .map(|tx| export_row(tx, options, reference, locale))
        .collect();

    let bytes = format.write_rows(&options.columns(), &rows)?;

    Ok(ExportPayload {
        file_name: format!("transactions_{}.{}", today.format("%Y-%m-%d"), format.extension()),
        bytes,
        count: rows.len(),
    })
}

/// Where an export landed
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub count: usize,
}

/// Export service writing payloads to disk
pub struct ExportService {
    repository: Arc<dyn Repository>,
}

impl ExportService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Build the payload for stored transactions, oldest first
    pub async fn build(&self, options: &ExportOptions, locale: &Locale) -> Result<ExportPayload> {
        let mut transactions = self.repository.list_transactions().await?;
        let reference = ReferenceData::new(
            self.repository.list_categories().await?,
            self.repository.list_payment_methods().await?,
        );
        sort_transactions(&mut transactions, SortKey::Date, SortOrder::Asc, &reference);

        let payload = export_transactions(
            &transactions,
            options,
            &reference,
            locale,
            Local::now().date_naive(),
        )?;
        log::debug!("built {} export of {} bytes", options.format, payload.bytes.len());
        Ok(payload)
    }

    /// Write the payload into `out_dir`
    pub async fn export(
        &self,
        options: &ExportOptions,
        locale: &Locale,
        out_dir: &Path,
    ) -> Result<ExportOutcome> {
        let payload = self.build(options, locale).await?;

        tokio::fs::create_dir_all(out_dir)
            .await
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        let path = out_dir.join(&payload.file_name);
        tokio::fs::write(&path, &payload.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        log::info!("exported {} transactions as {}", payload.count, options.format);
        Ok(ExportOutcome {
            path,
            count: payload.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CsvCodec, ReadOptions, TableReader, XlsxCodec};
    use crate::domain::reference::{default_categories, default_payment_methods};
    use crate::domain::{TransactionMetadata, TransactionType};
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reference() -> ReferenceData {
        ReferenceData::new(default_categories(), default_payment_methods())
    }

    fn sample() -> Vec<Transaction> {
        let mut rent = Transaction::new(
            TransactionType::Expense,
            Decimal::new(150000, 2),
            "Rent, \"March\"",
            "housing",
            "bank-transfer",
            date(2025, 3, 1),
        );
        rent.is_recurring = true;
        rent.metadata = Some(TransactionMetadata {
            location: Some("Home".to_string()),
            notes: None,
        });

        let gift = Transaction::new(
            TransactionType::Income,
            Decimal::new(5000, 2),
            "Gift",
            "gifts",
            "cash",
            date(2025, 3, 31),
        )
        .with_tags(&["family".to_string(), "birthday".to_string()]);

        let late = Transaction::new(
            TransactionType::Expense,
            Decimal::new(999, 2),
            "Late",
            "leisure",
            "pix",
            date(2025, 4, 1),
        );
        vec![rent, gift, late]
    }

    fn read_csv(bytes: &[u8]) -> Vec<Vec<String>> {
        CsvCodec::read_rows(bytes, &ReadOptions::default()).unwrap()
    }

    #[test]
    fn test_columns_follow_flags() {
        let options = ExportOptions {
            include_categories: false,
            include_payment_methods: true,
            include_metadata: true,
            ..Default::default()
        };
        assert_eq!(
            options.columns(),
            vec![
                "id",
                "type",
                "amount",
                "description",
                "date",
                "tags",
                "isRecurring",
                "paymentMethod",
                "location",
                "notes"
            ]
        );
    }

    #[test]
    fn test_csv_export_range_and_names() {
        let options = ExportOptions {
            date_range: Some(DateRange::new(date(2025, 3, 1), date(2025, 3, 31))),
            include_metadata: true,
            ..Default::default()
        };
        let payload =
            export_transactions(&sample(), &options, &reference(), &Locale::default(), date(2025, 4, 2))
                .unwrap();

        assert_eq!(payload.file_name, "transactions_2025-04-02.csv");
        assert_eq!(payload.count, 2);

        let rows = read_csv(&payload.bytes);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], options.columns());

        let rent = &rows[1];
        assert_eq!(rent[1], "expense");
        assert_eq!(rent[2], "1500.00");
        assert_eq!(rent[3], "Rent, \"March\"");
        assert_eq!(rent[6], "Yes");
        assert_eq!(rent[7], "Housing");
        assert_eq!(rent[8], "Bank Transfer");
        assert_eq!(rent[9], "Home");
        assert_eq!(rent[10], "");

        let gift = &rows[2];
        assert_eq!(gift[5], "family,birthday");
        // unknown category falls back to its id
        assert_eq!(gift[7], "gifts");
    }

    #[test]
    fn test_recurring_flag_is_localised() {
        let payload = export_transactions(
            &sample()[..1],
            &ExportOptions::default(),
            &reference(),
            &Locale::new("pt"),
            date(2025, 4, 2),
        )
        .unwrap();
        let rows = read_csv(&payload.bytes);
        assert_eq!(rows[1][6], "Sim");
    }

    #[test]
    fn test_xlsx_export_has_header_row() {
        let options = ExportOptions {
            format: ExportFormat::Xlsx,
            ..Default::default()
        };
        let payload =
            export_transactions(&sample(), &options, &reference(), &Locale::default(), date(2025, 4, 2))
                .unwrap();
        assert_eq!(payload.file_name, "transactions_2025-04-02.xlsx");

        let rows = XlsxCodec::read_rows(&payload.bytes, &ReadOptions::default()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], "id");
        assert_eq!(rows[1][2], "1500");
        assert_eq!(rows[3][3], "Late");
    }

    #[test]
    fn test_pdf_not_implemented() {
        let options = ExportOptions {
            format: ExportFormat::Pdf,
            ..Default::default()
        };
        let err = export_transactions(&sample(), &options, &reference(), &Locale::default(), date(2025, 4, 2))
            .unwrap_err();
        assert!(matches!(err, Error::NotImplemented(_)));
        assert_eq!(err.to_string(), "PDF export is not yet implemented");

        let err = export_transactions(&sample(), &options, &reference(), &Locale::new("pt"), date(2025, 4, 2))
            .unwrap_err();
        assert_eq!(err.to_string(), "A exportação em PDF ainda não foi implementada");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
