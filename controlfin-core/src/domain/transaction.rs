//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::result::Error;

static NULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnull\b").unwrap());
static CARD_MASK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"x{10,}\d{4}").unwrap());
static ACCOUNT_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[x0-9]{7,12}").unwrap());
static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]").unwrap());

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [Self::Income, Self::Expense, Self::Transfer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(Error::validation(format!("unknown transaction type: {other}"))),
        }
    }
}

/// Free-form extras attached to a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TransactionMetadata {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.notes.is_none()
    }
}

/// A single income, expense or transfer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub description: String,
    pub category_id: String,
    pub payment_method_id: String,
    pub date: NaiveDate,
    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_recurring: bool,
    /// Weak back-reference to the recurring template that produced this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TransactionMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction with required fields
    pub fn new(
        transaction_type: TransactionType,
        amount: Decimal,
        description: impl Into<String>,
        category_id: impl Into<String>,
        payment_method_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            transaction_type,
            amount,
            description: description.into(),
            category_id: category_id.into(),
            payment_method_id: payment_method_id.into(),
            date,
            tags: Vec::new(),
            is_recurring: false,
            recurring_id: None,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tags(mut self, tags: &[String]) -> Self {
        self.tags = Self::normalize_tags(tags);
        self
    }

    pub fn location(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.location.as_deref())
    }

    pub fn notes(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.notes.as_deref())
    }

    /// Apply a partial update; fields left as `None` in the patch keep their value
    pub fn apply(&mut self, patch: TransactionPatch) {
        if let Some(t) = patch.transaction_type {
            self.transaction_type = t;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(payment_method_id) = patch.payment_method_id {
            self.payment_method_id = payment_method_id;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(tags) = patch.tags {
            self.tags = Self::normalize_tags(&tags);
        }
        if let Some(is_recurring) = patch.is_recurring {
            self.is_recurring = is_recurring;
        }
        if let Some(recurring_id) = patch.recurring_id {
            self.recurring_id = recurring_id;
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = metadata.filter(|m| !m.is_empty());
        }
        self.updated_at = Utc::now();
    }

    /// Calculate fingerprint hash for duplicate detection
    ///
    /// Uses: date, amount (two decimal places, -0 as 0) and normalized description.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.date, &self.amount, &self.description)
    }

    /// Normalize tags: deduplicate, trim whitespace, remove empty
    pub fn normalize_tags(tags: &[String]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();

        for tag in tags {
            let trimmed = tag.trim().to_string();
            if !trimmed.is_empty() && seen.insert(trimmed.clone()) {
                result.push(trimmed);
            }
        }

        result
    }
}

/// Partial update for a transaction (edit form semantics)
///
/// `recurring_id` and `metadata` are doubly optional: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub payment_method_id: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_recurring: Option<bool>,
    #[serde(default)]
    pub recurring_id: Option<Option<String>>,
    #[serde(default)]
    pub metadata: Option<Option<TransactionMetadata>>,
}

/// Fingerprint of the fields that identify a duplicate row
pub fn fingerprint(date: &NaiveDate, amount: &Decimal, description: &str) -> String {
    let amount = if amount.is_zero() { Decimal::ZERO } else { *amount };
    let input = format!(
        "{}|{:.2}|{}",
        date.format("%Y-%m-%d"),
        amount,
        normalize_description(description)
    );

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

/// Normalize description for fingerprint comparison
///
/// - Lowercase
/// - Remove literal "null" strings
/// - Remove card number masks (10+ X's followed by 4 digits)
/// - Normalize account/phone numbers to last 4 digits
/// - Keep only alphanumerics
fn normalize_description(desc: &str) -> String {
    let desc = desc.to_lowercase();

    let normalized = NULL_RE.replace_all(&desc, "");
    let normalized = CARD_MASK_RE.replace_all(&normalized, "");
    let normalized = ACCOUNT_NUMBER_RE.replace_all(&normalized, |caps: &regex::Captures| {
        let text = &caps[0];
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= 4 {
            digits[digits.len() - 4..].to_string()
        } else {
            text.to_string()
        }
    });

    NON_ALNUM_RE.replace_all(&normalized, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction::new(
            TransactionType::Expense,
            Decimal::new(4250, 2),
            "ACME STORE",
            "cat-groceries",
            "pm-card",
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_transaction_type_parsing() {
        assert_eq!("Income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!(" EXPENSE ".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_fingerprint_generation() {
        let tx = sample();
        let fp = tx.fingerprint();
        assert_eq!(fp.len(), 16);

        let mut same = sample();
        same.description = "acme store".to_string();
        assert_eq!(fp, same.fingerprint());

        let mut other = sample();
        other.amount = Decimal::new(4251, 2);
        assert_ne!(fp, other.fingerprint());
    }

    #[test]
    fn test_description_normalization() {
        assert!(!normalize_description("PURCHASE XXXXXXXXXXXX1234 STORE").contains("xxxx"));
        assert!(!normalize_description("null PAYMENT null").contains("null"));
        assert!(normalize_description("PAYMENT 7208987070").contains("7070"));
    }

    #[test]
    fn test_tag_normalization() {
        let tags = vec![
            "food".to_string(),
            "  groceries ".to_string(),
            "food".to_string(), // duplicate
            "".to_string(),     // empty
        ];
        let normalized = Transaction::normalize_tags(&tags);
        assert_eq!(normalized, vec!["food", "groceries"]);
    }

    #[test]
    fn test_apply_patch_merges_fields() {
        let mut tx = sample();
        let before = tx.clone();
        tx.apply(TransactionPatch {
            description: Some("Corner shop".to_string()),
            tags: Some(vec!["food".to_string(), " food ".to_string()]),
            metadata: Some(Some(TransactionMetadata {
                location: Some("Lisbon".to_string()),
                notes: None,
            })),
            ..Default::default()
        });

        assert_eq!(tx.id, before.id);
        assert_eq!(tx.amount, before.amount);
        assert_eq!(tx.description, "Corner shop");
        assert_eq!(tx.tags, vec!["food"]);
        assert_eq!(tx.location(), Some("Lisbon"));
        assert!(tx.updated_at >= before.updated_at);

        tx.apply(TransactionPatch {
            metadata: Some(None),
            ..Default::default()
        });
        assert!(tx.metadata.is_none());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["categoryId"], "cat-groceries");
        assert_eq!(json["isRecurring"], false);
    }
}
