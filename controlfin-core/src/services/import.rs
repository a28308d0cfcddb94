//! Import service - CSV and spreadsheet transaction import
//!
//! The pipeline runs in two steps so a caller can show the outcome before
//! anything is written:
//!
//! 1. [`ImportService::preview`] parses the file, locates the header row,
//!    maps columns to fields and validates every row.
//! 2. [`ImportService::commit`] persists the valid subset, handling
//!    duplicates according to [`ImportOptions`].
//!
//! Row problems are collected as [`RowIssue`]s and never abort the batch. A
//! file the codec cannot parse at all is a single error.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use crate::codec::{ReadOptions, TableFormat};
use crate::config::{Config, ImportDefaults, ImportProfile};
use crate::domain::{
    ColumnMapping, HeaderMode, ImportField, ReferenceData, RowIssue, Transaction,
    TransactionMetadata, TransactionType,
};
use crate::i18n::{catalog, Locale};
use crate::ports::Repository;

/// Date layouts tried after the caller's hint
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
];

static HINT_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"YYYY|YY|MM|DD").unwrap());

/// Import options
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Drop rows whose fingerprint matches an existing transaction
    pub skip_duplicates: bool,
    /// Overwrite the matching transaction instead; wins over `skip_duplicates`
    pub update_existing: bool,
    /// Preferred date layout, either chrono (`%d/%m/%Y`) or `DD/MM/YYYY` style
    pub date_format: Option<String>,
    pub delimiter: char,
    pub header_mode: HeaderMode,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::from_defaults(&ImportDefaults::default())
    }
}

impl ImportOptions {
    pub fn from_defaults(defaults: &ImportDefaults) -> Self {
        Self {
            skip_duplicates: defaults.skip_duplicates,
            update_existing: defaults.update_existing,
            date_format: defaults.date_format.clone(),
            delimiter: defaults.delimiter,
            header_mode: HeaderMode::FirstRow,
        }
    }

    /// Layer a saved profile over these options
    pub fn with_profile(mut self, profile: &ImportProfile) -> Self {
        if let Some(delimiter) = profile.delimiter {
            self.delimiter = delimiter;
        }
        if profile.date_format.is_some() {
            self.date_format = profile.date_format.clone();
        }
        self.header_mode = profile.header_mode;
        self
    }
}

/// A row that failed validation, kept verbatim for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidRow {
    pub row: usize,
    pub cells: Vec<String>,
}

/// Outcome of parsing and validating a file, before anything is persisted
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub headers: Vec<String>,
    /// Field per column, aligned with `headers`
    pub mapping: Vec<Option<ImportField>>,
    pub valid: Vec<Transaction>,
    pub invalid: Vec<InvalidRow>,
    pub errors: Vec<RowIssue>,
    pub warnings: Vec<RowIssue>,
}

impl ImportPreview {
    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    /// Header of the column feeding `field`, if any
    pub fn column_for(&self, field: ImportField) -> Option<&str> {
        self.mapping
            .iter()
            .position(|m| *m == Some(field))
            .and_then(|i| self.headers.get(i))
            .map(String::as_str)
    }

    /// Required fields no column is mapped to
    pub fn unmapped_required(&self) -> Vec<ImportField> {
        ImportField::REQUIRED
            .into_iter()
            .filter(|f| self.column_for(*f).is_none())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// The persistence step completed
    pub success: bool,
    /// Transactions newly inserted
    pub imported: usize,
    /// Existing transactions overwritten (`update_existing`)
    pub updated: usize,
    pub skipped_duplicates: usize,
    pub errors: Vec<RowIssue>,
    pub warnings: Vec<RowIssue>,
    /// Storage failure message when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Import service for CSV and spreadsheet files
pub struct ImportService {
    repository: Arc<dyn Repository>,
    data_dir: PathBuf,
}

impl ImportService {
    pub fn new(repository: Arc<dyn Repository>, data_dir: PathBuf) -> Self {
        Self {
            repository,
            data_dir,
        }
    }

    /// Read a file into raw rows; the format comes from the extension
    pub async fn read_rows(&self, path: &Path, options: &ImportOptions) -> Result<Vec<Vec<String>>> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let format = TableFormat::from_path(path);
        let rows = format.read_rows(
            &bytes,
            &ReadOptions {
                delimiter: options.delimiter,
            },
        )?;
        log::debug!("parsed {} rows as {}", rows.len(), format.extension());
        Ok(rows)
    }

    /// Parse, map and validate a file without persisting anything
    pub async fn preview(
        &self,
        path: &Path,
        mapping: &ColumnMapping,
        options: &ImportOptions,
        locale: &Locale,
    ) -> Result<ImportPreview> {
        let rows = self.read_rows(path, options).await?;
        let reference = ReferenceData::new(
            self.repository.list_categories().await?,
            self.repository.list_payment_methods().await?,
        );
        Ok(build_preview(rows, mapping, options, &reference, locale))
    }

    /// Persist the valid rows of a preview
    ///
    /// Storage failures do not propagate; they come back as `success: false`.
    pub async fn commit(&self, preview: &ImportPreview, options: &ImportOptions) -> ImportResult {
        let mut result = ImportResult {
            errors: preview.errors.clone(),
            warnings: preview.warnings.clone(),
            ..Default::default()
        };

        match self.persist(&preview.valid, options, &mut result).await {
            Ok(()) => {
                result.success = true;
                log::info!(
                    "imported {} transactions ({} updated, {} duplicates skipped)",
                    result.imported,
                    result.updated,
                    result.skipped_duplicates
                );
            }
            Err(e) => {
                log::error!("import failed: {:#}", e);
                result.failure = Some(format!("{:#}", e));
            }
        }

        result
    }

    /// Preview and commit in one go
    pub async fn import(
        &self,
        path: &Path,
        mapping: &ColumnMapping,
        options: &ImportOptions,
        locale: &Locale,
    ) -> Result<ImportResult> {
        let preview = self.preview(path, mapping, options, locale).await?;
        Ok(self.commit(&preview, options).await)
    }

    async fn persist(
        &self,
        valid: &[Transaction],
        options: &ImportOptions,
        result: &mut ImportResult,
    ) -> Result<()> {
        let dedupe = options.skip_duplicates || options.update_existing;

        let mut existing: HashMap<String, Transaction> = HashMap::new();
        if dedupe {
            for tx in self.repository.list_transactions().await? {
                existing.entry(tx.fingerprint()).or_insert(tx);
            }
        }

        let mut seen = HashSet::new();
        let mut fresh = Vec::new();

        for tx in valid {
            let fp = tx.fingerprint();
            // Repeats inside the same file
            if dedupe && !seen.insert(fp.clone()) {
                result.skipped_duplicates += 1;
                continue;
            }

            match existing.get(&fp) {
                Some(current) if options.update_existing => {
                    let mut replacement = tx.clone();
                    replacement.id = current.id;
                    replacement.created_at = current.created_at;
                    replacement.updated_at = Utc::now();
                    self.repository
                        .update_transaction(&replacement)
                        .await
                        .context("Failed to update existing transaction")?;
                    result.updated += 1;
                }
                Some(_) if options.skip_duplicates => result.skipped_duplicates += 1,
                _ => fresh.push(tx.clone()),
            }
        }

        if !fresh.is_empty() {
            result.imported = self
                .repository
                .insert_transactions(&fresh)
                .await
                .context("Failed to store imported transactions")?;
        }
        Ok(())
    }

    /// List saved import profiles
    pub fn list_profiles(&self) -> Result<HashMap<String, ImportProfile>> {
        let config = Config::load(&self.data_dir)?;
        Ok(config.import_profiles)
    }

    /// Save an import profile
    pub fn save_profile(&self, name: &str, profile: ImportProfile) -> Result<()> {
        let mut config = Config::load(&self.data_dir)?;
        config.import_profiles.insert(name.to_string(), profile);
        config.save(&self.data_dir)
    }

    /// Get a saved profile
    pub fn get_profile(&self, name: &str) -> Result<Option<ImportProfile>> {
        let config = Config::load(&self.data_dir)?;
        Ok(config.import_profiles.get(name).cloned())
    }
}

/// Auto-map headers to fields by keyword containment
///
/// Fields are tried in priority order; a field already claimed by an earlier
/// header is passed over, so each field feeds from at most one column.
pub fn auto_map(headers: &[String]) -> Vec<Option<ImportField>> {
    resolve_mapping(headers, &ColumnMapping::default())
}

/// Combine the user's mapping with auto-mapping for the remaining headers
pub fn resolve_mapping(headers: &[String], user: &ColumnMapping) -> Vec<Option<ImportField>> {
    let mut resolved = vec![None; headers.len()];
    let mut overridden = vec![false; headers.len()];
    let mut claimed = HashSet::new();

    for (i, header) in headers.iter().enumerate() {
        if let Some(field) = user.get(header) {
            overridden[i] = true;
            if field != ImportField::Skip && claimed.insert(field) {
                resolved[i] = Some(field);
            }
        }
    }

    // exact keyword headers claim their field before containment matches
    for (i, header) in headers.iter().enumerate() {
        if overridden[i] {
            continue;
        }
        let field = ImportField::AUTO
            .into_iter()
            .find(|f| !claimed.contains(f) && f.is_exact_header(header));
        if let Some(f) = field {
            claimed.insert(f);
            resolved[i] = Some(f);
        }
    }

    for (i, header) in headers.iter().enumerate() {
        if overridden[i] || resolved[i].is_some() {
            continue;
        }
        let field = ImportField::AUTO
            .into_iter()
            .find(|f| !claimed.contains(f) && f.matches_header(header));
        if let Some(f) = field {
            claimed.insert(f);
        }
        resolved[i] = field;
    }

    resolved
}

/// Index of the header row
fn locate_header(rows: &[Vec<String>], mode: HeaderMode, user: &ColumnMapping) -> Option<usize> {
    if rows.is_empty() {
        return None;
    }
    match mode {
        HeaderMode::FirstRow => Some(0),
        HeaderMode::Scan => {
            let found = rows
                .iter()
                .position(|row| resolve_mapping(row, user).iter().flatten().count() >= 2);
            if found.is_none() {
                log::debug!("no header-like row found, using the first row");
            }
            Some(found.unwrap_or(0))
        }
    }
}

/// Map and validate parsed rows
///
/// Row numbers are 1-based positions among the parsed rows, header included,
/// so with the header on top the first data row is row 2.
pub fn build_preview(
    rows: Vec<Vec<String>>,
    mapping: &ColumnMapping,
    options: &ImportOptions,
    reference: &ReferenceData,
    locale: &Locale,
) -> ImportPreview {
    let Some(header_idx) = locate_header(&rows, options.header_mode, mapping) else {
        return ImportPreview::default();
    };

    let headers: Vec<String> = rows[header_idx].iter().map(|h| h.trim().to_string()).collect();
    let columns = resolve_mapping(&headers, mapping);
    let validator = RowValidator {
        columns: columns
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.map(|f| (f, i)))
            .collect(),
        reference,
        locale,
        date_format: options.date_format.as_deref().map(chrono_format),
    };

    let mut preview = ImportPreview {
        headers,
        mapping: columns,
        ..Default::default()
    };

    for (idx, cells) in rows.into_iter().enumerate().skip(header_idx + 1) {
        let row = idx + 1;
        let outcome = validator.validate(row, &cells);
        preview.warnings.extend(outcome.warnings);
        match outcome.transaction {
            Some(tx) if outcome.errors.is_empty() => preview.valid.push(tx),
            _ => {
                preview.errors.extend(outcome.errors);
                preview.invalid.push(InvalidRow { row, cells });
            }
        }
    }

    log::debug!(
        "validated {} rows: {} valid, {} invalid",
        preview.valid.len() + preview.invalid.len(),
        preview.valid.len(),
        preview.invalid.len()
    );
    if !preview.invalid.is_empty() {
        log::warn!("{} rows failed validation", preview.invalid.len());
    }

    preview
}

#[derive(Default)]
struct RowOutcome {
    transaction: Option<Transaction>,
    errors: Vec<RowIssue>,
    warnings: Vec<RowIssue>,
}

struct RowValidator<'a> {
    columns: HashMap<ImportField, usize>,
    reference: &'a ReferenceData,
    locale: &'a Locale,
    date_format: Option<String>,
}

impl RowValidator<'_> {
    fn message(&self, key: &str, params: Value) -> String {
        catalog().get_message(self.locale, key, Some(&params))
    }

    fn value<'c>(&self, cells: &'c [String], field: ImportField) -> Option<&'c str> {
        self.columns
            .get(&field)
            .and_then(|&i| cells.get(i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    fn validate(&self, row: usize, cells: &[String]) -> RowOutcome {
        let mut out = RowOutcome::default();

        let missing: Vec<&str> = ImportField::REQUIRED
            .iter()
            .filter(|f| self.value(cells, **f).is_none())
            .map(|f| f.as_str())
            .collect();
        if !missing.is_empty() {
            out.errors.push(RowIssue::new(
                row,
                missing.join(","),
                self.message("import.errors.missingFields", json!({ "fields": missing.join(", ") })),
            ));
        }

        let amount = self.value(cells, ImportField::Amount).and_then(|raw| {
            let parsed = parse_amount(raw).filter(|a| !a.is_zero());
            if parsed.is_none() {
                out.errors.push(
                    RowIssue::new(
                        row,
                        ImportField::Amount.as_str(),
                        self.message("import.errors.invalidAmount", json!({ "value": raw })),
                    )
                    .with_value(raw),
                );
            }
            parsed
        });

        let transaction_type = self.value(cells, ImportField::Type).and_then(|raw| {
            let parsed = raw.to_lowercase().parse::<TransactionType>().ok();
            if parsed.is_none() {
                out.errors.push(
                    RowIssue::new(
                        row,
                        ImportField::Type.as_str(),
                        self.message("import.errors.invalidType", json!({ "value": raw })),
                    )
                    .with_value(raw),
                );
            }
            parsed
        });

        let date = self.value(cells, ImportField::Date).and_then(|raw| {
            let parsed = parse_date(raw, self.date_format.as_deref());
            if parsed.is_none() {
                out.errors.push(
                    RowIssue::new(
                        row,
                        ImportField::Date.as_str(),
                        self.message("import.errors.invalidDate", json!({ "value": raw })),
                    )
                    .with_value(raw),
                );
            }
            parsed
        });

        let category_id = self.value(cells, ImportField::CategoryId).and_then(|raw| {
            let found = self.reference.find_category(raw).map(|c| c.id.clone());
            if found.is_none() {
                out.errors.push(
                    RowIssue::new(
                        row,
                        ImportField::CategoryId.as_str(),
                        self.message("import.errors.categoryNotFound", json!({ "value": raw })),
                    )
                    .with_value(raw),
                );
            }
            found
        });

        let payment_method_id = self.value(cells, ImportField::PaymentMethodId).map(|raw| {
            match self.reference.find_payment_method(raw) {
                Some(method) => method.id.clone(),
                None => {
                    out.warnings.push(
                        RowIssue::new(
                            row,
                            ImportField::PaymentMethodId.as_str(),
                            self.message(
                                "import.warnings.paymentMethodNotFound",
                                json!({ "value": raw }),
                            ),
                        )
                        .with_value(raw),
                    );
                    raw.to_string()
                }
            }
        });

        let is_recurring = match self.value(cells, ImportField::IsRecurring) {
            None => false,
            Some(raw) => parse_flag(raw).unwrap_or_else(|| {
                out.warnings.push(
                    RowIssue::new(
                        row,
                        ImportField::IsRecurring.as_str(),
                        self.message("import.warnings.invalidRecurring", json!({ "value": raw })),
                    )
                    .with_value(raw),
                );
                false
            }),
        };

        let description = self.value(cells, ImportField::Description);

        if let (
            Some(transaction_type),
            Some(amount),
            Some(description),
            Some(category_id),
            Some(payment_method_id),
            Some(date),
        ) = (
            transaction_type,
            amount,
            description,
            category_id,
            payment_method_id,
            date,
        ) {
            let tags: Vec<String> = self
                .value(cells, ImportField::Tags)
                .map(|raw| raw.split(',').map(|t| t.trim().to_string()).collect())
                .unwrap_or_default();

            let metadata = TransactionMetadata {
                location: self.value(cells, ImportField::Location).map(str::to_string),
                notes: self.value(cells, ImportField::Notes).map(str::to_string),
            };

            let mut tx = Transaction::new(
                transaction_type,
                amount,
                description,
                category_id,
                payment_method_id,
                date,
            )
            .with_tags(&tags);
            tx.is_recurring = is_recurring;
            if !metadata.is_empty() {
                tx.metadata = Some(metadata);
            }
            out.transaction = Some(tx);
        }

        out
    }
}

/// Turn a `DD/MM/YYYY` style hint into a chrono format; `%` formats pass through
fn chrono_format(hint: &str) -> String {
    if hint.contains('%') {
        return hint.to_string();
    }
    HINT_TOKEN_RE
        .replace_all(&hint.to_uppercase(), |caps: &regex::Captures| match &caps[0] {
            "YYYY" => "%Y",
            "YY" => "%y",
            "MM" => "%m",
            _ => "%d",
        })
        .into_owned()
}

fn parse_date(s: &str, hint: Option<&str>) -> Option<NaiveDate> {
    let s = s.trim();
    // Drop a time part from `YYYY-MM-DD HH:MM:SS` or ISO timestamps
    let s = match s.get(..10) {
        Some(head) if s.len() > 10 && matches!(s.as_bytes()[10], b' ' | b'T') => head,
        _ => s,
    };

    if let Some(fmt) = hint {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a money amount
///
/// Tolerates currency symbols, thousands separators, a decimal comma and
/// parentheses for negatives: `(R$ 1.234,50)` is -1234.50.
fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();

    let (is_negative, s) = match s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };

    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let cleaned = match (kept.rfind('.'), kept.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => kept.replace('.', "").replace(',', "."),
        (None, Some(comma)) if kept.matches(',').count() == 1 && kept.len() - comma - 1 <= 2 => {
            kept.replace(',', ".")
        }
        _ => kept.replace(',', ""),
    };

    let mut amount: Decimal = cleaned.parse().ok()?;
    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }
    Some(amount)
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "sim" | "s" => Some(true),
        "no" | "n" | "false" | "0" | "não" | "nao" => Some(false),
        _ => None,
    }
}
