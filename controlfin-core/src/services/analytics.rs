//! Analytics service - totals, spending by category and monthly series
//!
//! The transaction type decides the direction of money; the sign of the
//! stored amount is ignored.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{DateRange, ReferenceData, Transaction, TransactionType};
use crate::ports::Repository;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
    pub transfer: Decimal,
    /// income - expense
    pub balance: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category_id: String,
    /// Resolved name, or the id when the category is gone
    pub name: String,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();
    for tx in transactions {
        let amount = tx.amount.abs();
        match tx.transaction_type {
            TransactionType::Income => summary.income += amount,
            TransactionType::Expense => summary.expense += amount,
            TransactionType::Transfer => summary.transfer += amount,
        }
        summary.count += 1;
    }
    summary.balance = summary.income - summary.expense;
    summary
}

/// Expense totals per category, largest first (ties by name)
pub fn spending_by_category(
    transactions: &[Transaction],
    reference: &ReferenceData,
) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense)
    {
        let entry = totals.entry(tx.category_id.as_str()).or_default();
        entry.0 += tx.amount.abs();
        entry.1 += 1;
    }

    let mut result: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(id, (total, count))| CategoryTotal {
            category_id: id.to_string(),
            name: reference.category_name(id).unwrap_or(id).to_string(),
            total,
            count,
        })
        .collect();
    result.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    result
}

/// Income and expense per calendar month, oldest first
pub fn monthly_series(transactions: &[Transaction]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for tx in transactions {
        let entry = months.entry(tx.date.format("%Y-%m").to_string()).or_default();
        match tx.transaction_type {
            TransactionType::Income => entry.0 += tx.amount.abs(),
            TransactionType::Expense => entry.1 += tx.amount.abs(),
            TransactionType::Transfer => {}
        }
    }
    months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTotal {
            month,
            income,
            expense,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub by_category: Vec<CategoryTotal>,
    pub monthly: Vec<MonthlyTotal>,
}

/// Analytics over stored transactions
pub struct AnalyticsService {
    repository: Arc<dyn Repository>,
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    pub async fn report(&self, range: Option<DateRange>) -> Result<Report> {
        let transactions: Vec<Transaction> = self
            .repository
            .list_transactions()
            .await?
            .into_iter()
            .filter(|tx| range.map_or(true, |r| r.contains(&tx.date)))
            .collect();
        let reference = ReferenceData::new(
            self.repository.list_categories().await?,
            self.repository.list_payment_methods().await?,
        );

        Ok(Report {
            summary: summarize(&transactions),
            by_category: spending_by_category(&transactions, &reference),
            monthly: monthly_series(&transactions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reference::{default_categories, default_payment_methods};
    use chrono::NaiveDate;

    fn tx(t: TransactionType, cents: i64, category: &str, y: i32, m: u32, d: u32) -> Transaction {
        Transaction::new(
            t,
            Decimal::new(cents, 2),
            "x",
            category,
            "cash",
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        )
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(TransactionType::Income, 300000, "salary", 2025, 1, 5),
            tx(TransactionType::Expense, 12000, "groceries", 2025, 1, 7),
            tx(TransactionType::Expense, -3000, "groceries", 2025, 1, 9),
            tx(TransactionType::Expense, 100000, "housing", 2025, 2, 1),
            tx(TransactionType::Transfer, 50000, "savings", 2025, 2, 2),
            tx(TransactionType::Expense, 1500, "old-category", 2025, 2, 3),
        ]
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&sample());
        assert_eq!(summary.income, Decimal::new(300000, 2));
        assert_eq!(summary.expense, Decimal::new(116500, 2));
        assert_eq!(summary.transfer, Decimal::new(50000, 2));
        assert_eq!(summary.balance, Decimal::new(183500, 2));
        assert_eq!(summary.count, 6);
    }

    #[test]
    fn test_spending_by_category() {
        let reference = ReferenceData::new(default_categories(), default_payment_methods());
        let totals = spending_by_category(&sample(), &reference);
        let names: Vec<&str> = totals.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Housing", "Groceries", "old-category"]);
        assert_eq!(totals[1].total, Decimal::new(15000, 2));
        assert_eq!(totals[1].count, 2);
    }

    #[test]
    fn test_monthly_series() {
        let series = monthly_series(&sample());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].month, "2025-01");
        assert_eq!(series[0].income, Decimal::new(300000, 2));
        assert_eq!(series[0].expense, Decimal::new(15000, 2));
        assert_eq!(series[1].expense, Decimal::new(101500, 2));
    }

    #[test]
    fn test_empty() {
        assert_eq!(summarize(&[]), Summary::default());
        assert!(monthly_series(&[]).is_empty());
    }
}
