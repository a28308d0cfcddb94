//! Transaction service - create, edit and delete stored transactions

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use super::store::TransactionStore;
use crate::domain::{ReferenceData, Transaction, TransactionPatch};
use crate::ports::Repository;

pub struct TransactionService {
    repository: Arc<dyn Repository>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    async fn reference(&self) -> Result<ReferenceData> {
        Ok(ReferenceData::new(
            self.repository.list_categories().await?,
            self.repository.list_payment_methods().await?,
        ))
    }

    /// Load everything into a store for listing
    pub async fn load_store(&self, page_size: usize) -> Result<TransactionStore> {
        let mut store = TransactionStore::new(
            self.repository.list_transactions().await?,
            self.repository.list_categories().await?,
            self.repository.list_payment_methods().await?,
        );
        store.set_page_size(page_size);
        Ok(store)
    }

    /// Validate and store a new transaction
    ///
    /// The category must exist; an unknown payment method is accepted.
    pub async fn create(&self, tx: Transaction) -> Result<Transaction> {
        validate(&tx, &self.reference().await?)?;
        self.repository.insert_transactions(std::slice::from_ref(&tx)).await?;
        log::debug!("created transaction {}", tx.id);
        Ok(tx)
    }

    /// Merge a partial update into a stored transaction
    pub async fn update(&self, id: Uuid, patch: TransactionPatch) -> Result<Transaction> {
        let mut tx = self
            .repository
            .get_transaction(id)
            .await?
            .with_context(|| format!("Transaction not found: {}", id))?;
        tx.apply(patch);
        validate(&tx, &self.reference().await?)?;
        self.repository.update_transaction(&tx).await?;
        Ok(tx)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.repository.delete_transaction(id).await?)
    }

    /// Find a transaction by full id or unique id prefix
    pub async fn resolve_id(&self, id_or_prefix: &str) -> Result<Uuid> {
        if let Ok(id) = Uuid::parse_str(id_or_prefix) {
            return Ok(id);
        }
        let prefix = id_or_prefix.trim().to_lowercase();
        if prefix.is_empty() {
            bail!("Empty transaction id");
        }
        let matches: Vec<Uuid> = self
            .repository
            .list_transactions()
            .await?
            .into_iter()
            .map(|t| t.id)
            .filter(|id| id.to_string().starts_with(&prefix))
            .collect();
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => bail!("Transaction not found: {}", id_or_prefix),
            _ => bail!("Ambiguous transaction id prefix: {}", id_or_prefix),
        }
    }
}

fn validate(tx: &Transaction, reference: &ReferenceData) -> Result<()> {
    if tx.amount.is_zero() {
        bail!("Amount must be non-zero");
    }
    if tx.description.trim().is_empty() {
        bail!("Description is required");
    }
    if reference.category(&tx.category_id).is_none() {
        bail!("Category not found: {}", tx.category_id);
    }
    Ok(())
}
