//! Edit command - partial update of a transaction

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;

use controlfin_core::domain::{TransactionMetadata, TransactionPatch};
use controlfin_core::TransactionType;

use super::get_context;
use crate::output;

pub struct EditArgs {
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub recurring: Option<bool>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl EditArgs {
    /// Build the patch; an empty `--location ""` or `--notes ""` clears that field
    fn into_patch(self, current: Option<&TransactionMetadata>) -> TransactionPatch {
        let metadata = if self.location.is_some() || self.notes.is_some() {
            let mut merged = current.cloned().unwrap_or_default();
            if let Some(location) = self.location {
                merged.location = Some(location).filter(|s| !s.trim().is_empty());
            }
            if let Some(notes) = self.notes {
                merged.notes = Some(notes).filter(|s| !s.trim().is_empty());
            }
            Some(Some(merged))
        } else {
            None
        };

        TransactionPatch {
            transaction_type: self.transaction_type,
            amount: self.amount,
            description: self.description.map(|d| d.trim().to_string()),
            category_id: self.category,
            payment_method_id: self.payment_method,
            date: self.date,
            tags: self.tags,
            is_recurring: self.recurring,
            recurring_id: None,
            metadata,
        }
    }
}

pub async fn run(lang: Option<&str>, id: &str, args: EditArgs, json: bool) -> Result<()> {
    let ctx = get_context(lang).await?;
    let id = ctx.transaction_service.resolve_id(id).await?;

    let current = ctx
        .repository
        .get_transaction(id)
        .await?
        .with_context(|| format!("Transaction not found: {}", id))?;

    let patch = args.into_patch(current.metadata.as_ref());
    let updated = ctx.transaction_service.update(id, patch).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        output::success(&ctx.message(
            "transactions.updated",
            Some(&json!({ "id": updated.id.to_string() })),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> EditArgs {
        EditArgs {
            transaction_type: None,
            amount: None,
            description: None,
            category: None,
            payment_method: None,
            date: None,
            tags: None,
            recurring: None,
            location: None,
            notes: None,
        }
    }

    #[test]
    fn test_untouched_metadata_stays_out_of_patch() {
        let patch = empty().into_patch(None);
        assert!(patch.metadata.is_none());
        assert!(patch.amount.is_none());
    }

    #[test]
    fn test_metadata_merges_with_current() {
        let current = TransactionMetadata {
            location: Some("Lisbon".to_string()),
            notes: Some("old".to_string()),
        };
        let mut args = empty();
        args.notes = Some(String::new());

        let patch = args.into_patch(Some(&current));
        let merged = patch.metadata.unwrap().unwrap();
        assert_eq!(merged.location.as_deref(), Some("Lisbon"));
        assert_eq!(merged.notes, None);
    }
}
