//! Repository port - persistence abstraction

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{Category, PaymentMethod, Transaction};

/// Persistence abstraction for transactions and their reference data
///
/// Implementations (adapters) decide where data lives. The core only hands
/// validated records over and reads them back.
#[async_trait]
pub trait Repository: Send + Sync {
    // === Transactions ===

    /// All transactions, in insertion order
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;

    /// Get transaction by ID
    async fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>>;

    /// Insert new transactions; returns how many were stored
    async fn insert_transactions(&self, txs: &[Transaction]) -> Result<usize>;

    /// Replace an existing transaction (matched by id)
    async fn update_transaction(&self, tx: &Transaction) -> Result<()>;

    /// Delete a transaction; returns false when it did not exist
    async fn delete_transaction(&self, id: Uuid) -> Result<bool>;

    // === Reference data ===

    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>>;

    /// Insert or replace a category (matched by id)
    async fn upsert_category(&self, category: &Category) -> Result<()>;

    /// Insert or replace a payment method (matched by id)
    async fn upsert_payment_method(&self, method: &PaymentMethod) -> Result<()>;

    /// Delete a category; transactions keep their (now dangling) reference
    async fn delete_category(&self, id: &str) -> Result<bool>;

    /// Delete a payment method; transactions keep their reference
    async fn delete_payment_method(&self, id: &str) -> Result<bool>;
}
