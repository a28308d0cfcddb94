//! Category and payment method lookups

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::Error;
use super::transaction::TransactionType;

/// Payment method classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodType {
    Cash,
    Card,
    Bank,
    Digital,
    Crypto,
    Other,
}

impl PaymentMethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Bank => "bank",
            Self::Digital => "digital",
            Self::Crypto => "crypto",
            Self::Other => "other",
        }
    }
}

impl FromStr for PaymentMethodType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "bank" => Ok(Self::Bank),
            "digital" => Ok(Self::Digital),
            "crypto" => Ok(Self::Crypto),
            "other" => Ok(Self::Other),
            other => Err(Error::validation(format!("unknown payment method type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Categories are partitioned the same way transactions are
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    #[serde(default)]
    pub color: String,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category_type: TransactionType,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category_type,
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub method_type: PaymentMethodType,
    #[serde(default)]
    pub color: String,
}

impl PaymentMethod {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        method_type: PaymentMethodType,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            method_type,
            color: color.into(),
        }
    }
}

/// Outcome of resolving a foreign id to a display name
///
/// Lookups never fail; callers decide how to render `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Found(&'a str),
    NotFound,
}

impl<'a> Resolved<'a> {
    pub fn unwrap_or(self, fallback: &'a str) -> &'a str {
        match self {
            Resolved::Found(name) => name,
            Resolved::NotFound => fallback,
        }
    }
}

/// Read-only id → entity index over categories and payment methods
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    categories: Vec<Category>,
    payment_methods: Vec<PaymentMethod>,
    category_index: HashMap<String, usize>,
    payment_method_index: HashMap<String, usize>,
}

impl ReferenceData {
    pub fn new(categories: Vec<Category>, payment_methods: Vec<PaymentMethod>) -> Self {
        let category_index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        let payment_method_index = payment_methods
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self {
            categories,
            payment_methods,
            category_index,
            payment_method_index,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.category_index.get(id).map(|&i| &self.categories[i])
    }

    pub fn payment_method(&self, id: &str) -> Option<&PaymentMethod> {
        self.payment_method_index
            .get(id)
            .map(|&i| &self.payment_methods[i])
    }

    pub fn category_name(&self, id: &str) -> Resolved<'_> {
        match self.category(id) {
            Some(c) => Resolved::Found(&c.name),
            None => Resolved::NotFound,
        }
    }

    pub fn payment_method_name(&self, id: &str) -> Resolved<'_> {
        match self.payment_method(id) {
            Some(p) => Resolved::Found(&p.name),
            None => Resolved::NotFound,
        }
    }

    /// Match a category by id, falling back to a case-insensitive name match
    pub fn find_category(&self, id_or_name: &str) -> Option<&Category> {
        let needle = id_or_name.trim();
        self.category(needle).or_else(|| {
            self.categories
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(needle))
        })
    }

    /// Match a payment method by id, falling back to a case-insensitive name match
    pub fn find_payment_method(&self, id_or_name: &str) -> Option<&PaymentMethod> {
        let needle = id_or_name.trim();
        self.payment_method(needle).or_else(|| {
            self.payment_methods
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(needle))
        })
    }
}

/// Categories seeded into a fresh data file
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("salary", "Salary", TransactionType::Income, "#10B981"),
        Category::new("freelance", "Freelance", TransactionType::Income, "#34D399"),
        Category::new("groceries", "Groceries", TransactionType::Expense, "#F59E0B"),
        Category::new("housing", "Housing", TransactionType::Expense, "#EF4444"),
        Category::new("transport", "Transport", TransactionType::Expense, "#3B82F6"),
        Category::new("leisure", "Leisure", TransactionType::Expense, "#8B5CF6"),
        Category::new("health", "Health", TransactionType::Expense, "#EC4899"),
        Category::new("savings", "Savings", TransactionType::Transfer, "#6B7280"),
    ]
}

/// Payment methods seeded into a fresh data file
pub fn default_payment_methods() -> Vec<PaymentMethod> {
    vec![
        PaymentMethod::new("cash", "Cash", PaymentMethodType::Cash, "#10B981"),
        PaymentMethod::new("credit-card", "Credit Card", PaymentMethodType::Card, "#3B82F6"),
        PaymentMethod::new("debit-card", "Debit Card", PaymentMethodType::Card, "#6366F1"),
        PaymentMethod::new("bank-transfer", "Bank Transfer", PaymentMethodType::Bank, "#6B7280"),
        PaymentMethod::new("pix", "PIX", PaymentMethodType::Digital, "#14B8A6"),
    ]
}
