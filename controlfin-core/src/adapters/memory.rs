//! In-memory repository implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockWriteGuard};
use uuid::Uuid;

use crate::domain::reference::{default_categories, default_payment_methods};
use crate::domain::result::{Error, Result};
use crate::domain::{Category, PaymentMethod, Transaction};
use crate::ports::Repository;

/// Everything a repository stores
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

impl Dataset {
    /// Empty ledger with the default categories and payment methods
    pub fn seeded() -> Self {
        Self {
            transactions: Vec::new(),
            categories: default_categories(),
            payment_methods: default_payment_methods(),
        }
    }

    /// All-or-nothing: one clashing id rejects the whole batch
    pub fn insert_transactions(&mut self, txs: &[Transaction]) -> Result<usize> {
        for tx in txs {
            if self.transactions.iter().any(|t| t.id == tx.id) {
                return Err(Error::storage(format!("duplicate transaction id {}", tx.id)));
            }
        }
        self.transactions.extend_from_slice(txs);
        Ok(txs.len())
    }

    pub fn update_transaction(&mut self, tx: &Transaction) -> Result<()> {
        let slot = self
            .transactions
            .iter_mut()
            .find(|t| t.id == tx.id)
            .ok_or_else(|| Error::not_found(format!("transaction {}", tx.id)))?;
        *slot = tx.clone();
        Ok(())
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        self.transactions.len() != before
    }

    pub fn upsert_category(&mut self, category: &Category) {
        match self.categories.iter_mut().find(|c| c.id == category.id) {
            Some(slot) => *slot = category.clone(),
            None => self.categories.push(category.clone()),
        }
    }

    pub fn upsert_payment_method(&mut self, method: &PaymentMethod) {
        match self.payment_methods.iter_mut().find(|p| p.id == method.id) {
            Some(slot) => *slot = method.clone(),
            None => self.payment_methods.push(method.clone()),
        }
    }

    pub fn delete_category(&mut self, id: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        self.categories.len() != before
    }

    pub fn delete_payment_method(&mut self, id: &str) -> bool {
        let before = self.payment_methods.len();
        self.payment_methods.retain(|p| p.id != id);
        self.payment_methods.len() != before
    }
}

/// Repository kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryRepository {
    data: RwLock<Dataset>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            data: RwLock::new(dataset),
        }
    }

    /// Exclusive access for callers that must stage a change before applying it
    pub async fn lock(&self) -> RwLockWriteGuard<'_, Dataset> {
        self.data.write().await
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.data.read().await.transactions.clone())
    }

    async fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>> {
        let data = self.data.read().await;
        Ok(data.transactions.iter().find(|t| t.id == id).cloned())
    }

    async fn insert_transactions(&self, txs: &[Transaction]) -> Result<usize> {
        self.data.write().await.insert_transactions(txs)
    }

    async fn update_transaction(&self, tx: &Transaction) -> Result<()> {
        self.data.write().await.update_transaction(tx)
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<bool> {
        Ok(self.data.write().await.delete_transaction(id))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.data.read().await.categories.clone())
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>> {
        Ok(self.data.read().await.payment_methods.clone())
    }

    async fn upsert_category(&self, category: &Category) -> Result<()> {
        self.data.write().await.upsert_category(category);
        Ok(())
    }

    async fn upsert_payment_method(&self, method: &PaymentMethod) -> Result<()> {
        self.data.write().await.upsert_payment_method(method);
        Ok(())
    }

    async fn delete_category(&self, id: &str) -> Result<bool> {
        Ok(self.data.write().await.delete_category(id))
    }

    async fn delete_payment_method(&self, id: &str) -> Result<bool> {
        Ok(self.data.write().await.delete_payment_method(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn tx(desc: &str) -> Transaction {
        Transaction::new(
            TransactionType::Expense,
            Decimal::new(1000, 2),
            desc,
            "groceries",
            "cash",
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let repo = MemoryRepository::with_dataset(Dataset::seeded());
        let mut a = tx("Bakery");
        let b = tx("Butcher");
        assert_eq!(repo.insert_transactions(&[a.clone(), b.clone()]).await.unwrap(), 2);

        a.description = "Bakery (weekend)".to_string();
        repo.update_transaction(&a).await.unwrap();
        let stored = repo.get_transaction(a.id).await.unwrap().unwrap();
        assert_eq!(stored.description, "Bakery (weekend)");

        assert!(repo.delete_transaction(b.id).await.unwrap());
        assert!(!repo.delete_transaction(b.id).await.unwrap());
        assert_eq!(repo.list_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let repo = MemoryRepository::new();
        let a = tx("Bakery");
        repo.insert_transactions(&[a.clone()]).await.unwrap();
        let err = repo.insert_transactions(&[a]).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = MemoryRepository::new();
        let err = repo.update_transaction(&tx("Ghost")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upsert_category_replaces() {
        let repo = MemoryRepository::with_dataset(Dataset::seeded());
        let count = repo.list_categories().await.unwrap().len();
        let renamed = Category::new("groceries", "Food", TransactionType::Expense, "#000000");
        repo.upsert_category(&renamed).await.unwrap();
        let categories = repo.list_categories().await.unwrap();
        assert_eq!(categories.len(), count);
        assert!(categories.iter().any(|c| c.name == "Food"));
    }

    #[tokio::test]
    async fn test_delete_payment_method() {
        let repo = MemoryRepository::with_dataset(Dataset::seeded());
        let count = repo.list_payment_methods().await.unwrap().len();
        assert!(repo.delete_payment_method("cash").await.unwrap());
        assert!(!repo.delete_payment_method("cash").await.unwrap());
        assert_eq!(repo.list_payment_methods().await.unwrap().len(), count - 1);
    }
}
