//! Filter criteria and sort settings for transaction lists
//!
//! Every field has a "no constraint" sentinel (`None`, `TypeFilter::All`,
//! empty tag list) and [`TransactionFilters::default`] is all sentinels.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionType;
use super::Transaction;

/// Type constraint; `All` matches every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum TypeFilter {
    #[default]
    All,
    Only(TransactionType),
}

impl TypeFilter {
    pub fn matches(&self, transaction_type: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => *t == transaction_type,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = super::result::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(TypeFilter::All)
        } else {
            s.parse().map(TypeFilter::Only)
        }
    }
}

/// Inclusive calendar-day range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Reversed endpoints are swapped rather than rejected
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }
}

/// Inclusive amount range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl AmountRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, amount: &Decimal) -> bool {
        *amount >= self.min && *amount <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default, rename = "type")]
    pub transaction_type: TypeFilter,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub amount_range: Option<AmountRange>,
    /// Every listed tag must be present on a matching transaction
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_recurring: Option<bool>,
}

impl TransactionFilters {
    pub fn builder() -> TransactionFiltersBuilder {
        TransactionFiltersBuilder::default()
    }

    /// True when every dimension is at its sentinel
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Test every stage except free-text search
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.transaction_type.matches(tx.transaction_type)
            && self.category.as_ref().map_or(true, |c| *c == tx.category_id)
            && self
                .payment_method
                .as_ref()
                .map_or(true, |p| *p == tx.payment_method_id)
            && self.date_range.map_or(true, |r| r.contains(&tx.date))
            && self.amount_range.map_or(true, |r| r.contains(&tx.amount))
            && self.tags.iter().all(|tag| tx.tags.contains(tag))
            && self.is_recurring.map_or(true, |r| r == tx.is_recurring)
    }
}

/// Builds [`TransactionFilters`], normalizing values once
///
/// Empty strings become `None`, tags are trimmed and de-duplicated.
#[derive(Debug, Default)]
pub struct TransactionFiltersBuilder {
    filters: TransactionFilters,
}

impl TransactionFiltersBuilder {
    pub fn category(mut self, id: impl Into<String>) -> Self {
        self.filters.category = non_empty(id.into());
        self
    }

    pub fn payment_method(mut self, id: impl Into<String>) -> Self {
        self.filters.payment_method = non_empty(id.into());
        self
    }

    pub fn transaction_type(mut self, filter: TypeFilter) -> Self {
        self.filters.transaction_type = filter;
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.filters.date_range = Some(DateRange::new(start, end));
        self
    }

    pub fn amount_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.filters.amount_range = Some(AmountRange::new(min, max));
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        self.filters.tags = Transaction::normalize_tags(&tags);
        self
    }

    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.filters.is_recurring = Some(is_recurring);
        self
    }

    pub fn build(self) -> TransactionFilters {
        self.filters
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Amount,
    Description,
    Category,
}

impl SortKey {
    /// Unknown keys yield `None`, which leaves the list order untouched
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "amount" => Some(Self::Amount),
            "description" => Some(Self::Description),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}
