//! Add command - record a transaction

use anyhow::Result;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde_json::json;

use controlfin_core::domain::TransactionMetadata;
use controlfin_core::{Transaction, TransactionType};

use super::get_context;
use crate::output;

pub struct AddArgs {
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub payment_method: String,
    pub date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub recurring: bool,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl AddArgs {
    fn into_transaction(self, today: NaiveDate) -> Transaction {
        let mut tx = Transaction::new(
            self.transaction_type,
            self.amount,
            self.description.trim(),
            self.category,
            self.payment_method,
            self.date.unwrap_or(today),
        )
        .with_tags(&self.tags);
        tx.is_recurring = self.recurring;

        let metadata = TransactionMetadata {
            location: self.location,
            notes: self.notes,
        };
        if !metadata.is_empty() {
            tx.metadata = Some(metadata);
        }
        tx
    }
}

pub async fn run(lang: Option<&str>, args: AddArgs, json: bool) -> Result<()> {
    let ctx = get_context(lang).await?;
    let tx = args.into_transaction(Local::now().date_naive());
    let created = ctx.transaction_service.create(tx).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        output::success(&ctx.message(
            "transactions.created",
            Some(&json!({ "id": created.id.to_string() })),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_transaction_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let args = AddArgs {
            transaction_type: TransactionType::Expense,
            amount: Decimal::new(4250, 2),
            description: "  Lunch ".to_string(),
            category: "food".to_string(),
            payment_method: "cash".to_string(),
            date: None,
            tags: vec!["work".to_string(), " work ".to_string()],
            recurring: false,
            location: None,
            notes: None,
        };

        let tx = args.into_transaction(today);
        assert_eq!(tx.date, today);
        assert_eq!(tx.description, "Lunch");
        assert_eq!(tx.tags, vec!["work".to_string()]);
        assert!(tx.metadata.is_none());
    }

    #[test]
    fn test_into_transaction_keeps_metadata() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let args = AddArgs {
            transaction_type: TransactionType::Income,
            amount: Decimal::new(1000, 0),
            description: "Bonus".to_string(),
            category: "salary".to_string(),
            payment_method: "bank".to_string(),
            date: Some(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()),
            tags: Vec::new(),
            recurring: true,
            location: None,
            notes: Some("Q1".to_string()),
        };

        let tx = args.into_transaction(today);
        assert!(tx.is_recurring);
        assert_eq!(tx.notes(), Some("Q1"));
        assert_eq!(tx.location(), None);
    }
}
