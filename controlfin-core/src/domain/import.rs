//! Import vocabulary: canonical fields, column mappings and row diagnostics

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::Error;

/// Canonical transaction field an input column can feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportField {
    Amount,
    CategoryId,
    PaymentMethodId,
    Date,
    Tags,
    Location,
    Description,
    Type,
    IsRecurring,
    Notes,
    /// Explicitly ignored column
    Skip,
}

impl ImportField {
    /// Auto-mapping priority order
    pub const AUTO: [ImportField; 9] = [
        ImportField::Amount,
        ImportField::CategoryId,
        ImportField::PaymentMethodId,
        ImportField::Date,
        ImportField::Tags,
        ImportField::Location,
        ImportField::Description,
        ImportField::Type,
        ImportField::IsRecurring,
    ];

    pub const REQUIRED: [ImportField; 6] = [
        ImportField::Type,
        ImportField::Amount,
        ImportField::Description,
        ImportField::CategoryId,
        ImportField::PaymentMethodId,
        ImportField::Date,
    ];

    /// Header keywords that select this field (lower-case containment)
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ImportField::Amount => &["amount", "value"],
            ImportField::CategoryId => &["category"],
            ImportField::PaymentMethodId => &["payment", "method"],
            ImportField::Date => &["date"],
            ImportField::Tags => &["tag"],
            ImportField::Location => &["location"],
            ImportField::Description => &["description", "memo", "note"],
            ImportField::Type => &["type", "transaction"],
            ImportField::IsRecurring => &["recurring"],
            ImportField::Notes | ImportField::Skip => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportField::Amount => "amount",
            ImportField::CategoryId => "categoryId",
            ImportField::PaymentMethodId => "paymentMethodId",
            ImportField::Date => "date",
            ImportField::Tags => "tags",
            ImportField::Location => "location",
            ImportField::Description => "description",
            ImportField::Type => "type",
            ImportField::IsRecurring => "isRecurring",
            ImportField::Notes => "notes",
            ImportField::Skip => "skip",
        }
    }

    /// Does a header select this field?
    pub fn matches_header(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.keywords().iter().any(|k| header.contains(k))
    }

    /// Is the header exactly one of this field's keywords?
    pub fn is_exact_header(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.keywords().iter().any(|k| header == *k)
    }
}

impl fmt::Display for ImportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        [
            ImportField::Amount,
            ImportField::CategoryId,
            ImportField::PaymentMethodId,
            ImportField::Date,
            ImportField::Tags,
            ImportField::Location,
            ImportField::Description,
            ImportField::Type,
            ImportField::IsRecurring,
            ImportField::Notes,
            ImportField::Skip,
        ]
        .into_iter()
        .find(|f| f.as_str().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| Error::validation(format!("unknown import field: {}", s)))
    }
}

/// User-edited header → field assignments
///
/// Headers are compared trimmed and case-insensitively. Entries here win over
/// the auto-mapping; `Skip` drops a column the auto-mapping would have used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<String, ImportField>);

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, header: impl Into<String>, field: ImportField) {
        self.0.insert(header.into(), field);
    }

    pub fn with(mut self, header: impl Into<String>, field: ImportField) -> Self {
        self.set(header, field);
        self
    }

    pub fn get(&self, header: &str) -> Option<ImportField> {
        let wanted = header.trim();
        self.0
            .iter()
            .find(|(h, _)| h.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, f)| *f)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ImportField)> {
        self.0.iter().map(|(h, f)| (h.as_str(), *f))
    }
}

/// Where the header row is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderMode {
    /// The first non-blank row
    #[default]
    FirstRow,
    /// The first row that maps at least two fields (saved mapping or
    /// keywords); rows above it are preamble such as statement titles
    Scan,
}

impl FromStr for HeaderMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "firstrow" | "first-row" => Ok(HeaderMode::FirstRow),
            "scan" => Ok(HeaderMode::Scan),
            other => Err(Error::validation(format!("unknown header mode: {}", other))),
        }
    }
}

/// A diagnostic tied to one input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowIssue {
    /// 1-based, counting the header row
    pub row: usize,
    /// Field name, or comma-joined names for missing fields
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RowIssue {
    pub fn new(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_matching() {
        assert!(ImportField::Amount.matches_header("Transaction Value"));
        assert!(ImportField::PaymentMethodId.matches_header("  Method "));
        assert!(ImportField::Description.matches_header("MEMO"));
        assert!(!ImportField::Notes.matches_header("notes"));
    }

    #[test]
    fn test_exact_header() {
        assert!(ImportField::Description.is_exact_header(" Description "));
        assert!(!ImportField::Description.is_exact_header("Notes"));
        assert!(!ImportField::Amount.is_exact_header("Amount (USD)"));
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("categoryid".parse::<ImportField>().unwrap(), ImportField::CategoryId);
        assert_eq!("skip".parse::<ImportField>().unwrap(), ImportField::Skip);
        assert!("balance".parse::<ImportField>().is_err());
    }

    #[test]
    fn test_mapping_lookup_ignores_case() {
        let mapping = ColumnMapping::new().with("Valor", ImportField::Amount);
        assert_eq!(mapping.get(" valor"), Some(ImportField::Amount));
        assert_eq!(mapping.get("Data"), None);
    }

    #[test]
    fn test_mapping_serializes_as_object() {
        let mapping = ColumnMapping::new().with("Quando", ImportField::Date);
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"Quando":"date"}"#);
    }

    #[test]
    fn test_header_mode_parse() {
        assert_eq!("scan".parse::<HeaderMode>().unwrap(), HeaderMode::Scan);
        assert_eq!("first-row".parse::<HeaderMode>().unwrap(), HeaderMode::FirstRow);
        assert!("middle".parse::<HeaderMode>().is_err());
    }
}
