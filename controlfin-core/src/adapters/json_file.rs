//! JSON file repository implementation
//!
//! The whole dataset lives in memory. A mutation is applied to a copy, the
//! copy is written to disk (temp file, then rename over the original) and
//! only then replaces the in-memory dataset, so a failed write leaves both
//! untouched.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use super::memory::{Dataset, MemoryRepository};
use crate::domain::result::Result;
use crate::domain::{Category, PaymentMethod, Transaction};
use crate::ports::Repository;

pub const DATA_FILE: &str = "data.json";

pub struct JsonFileRepository {
    path: PathBuf,
    inner: MemoryRepository,
}

impl JsonFileRepository {
    /// Open `data.json` in `data_dir`, creating a seeded file when missing
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(DATA_FILE);
        let dataset = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read(&path).await?;
            serde_json::from_slice::<Dataset>(&content)?
        } else {
            log::info!("creating new data file at {}", path.display());
            tokio::fs::create_dir_all(data_dir).await?;
            let seeded = Dataset::seeded();
            write_dataset(&path, &seeded).await?;
            seeded
        };

        Ok(Self {
            path,
            inner: MemoryRepository::with_dataset(dataset),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn mutate<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Dataset) -> Result<T> + Send,
        T: Send,
    {
        let mut current = self.inner.lock().await;
        let mut next = current.clone();
        let out = apply(&mut next)?;
        write_dataset(&self.path, &next).await?;
        *current = next;
        Ok(out)
    }
}

async fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    let content = serde_json::to_vec_pretty(dataset)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    log::debug!("wrote {} transactions to {}", dataset.transactions.len(), path.display());
    Ok(())
}

#[async_trait]
impl Repository for JsonFileRepository {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.inner.list_transactions().await
    }

    async fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>> {
        self.inner.get_transaction(id).await
    }

    async fn insert_transactions(&self, txs: &[Transaction]) -> Result<usize> {
        self.mutate(|data| data.insert_transactions(txs)).await
    }

    async fn update_transaction(&self, tx: &Transaction) -> Result<()> {
        self.mutate(|data| data.update_transaction(tx)).await
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<bool> {
        if self.inner.get_transaction(id).await?.is_none() {
            return Ok(false);
        }
        self.mutate(|data| Ok(data.delete_transaction(id))).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.inner.list_categories().await
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>> {
        self.inner.list_payment_methods().await
    }

    async fn upsert_category(&self, category: &Category) -> Result<()> {
        self.mutate(|data| {
            data.upsert_category(category);
            Ok(())
        })
        .await
    }

    async fn upsert_payment_method(&self, method: &PaymentMethod) -> Result<()> {
        self.mutate(|data| {
            data.upsert_payment_method(method);
            Ok(())
        })
        .await
    }

    async fn delete_category(&self, id: &str) -> Result<bool> {
        self.mutate(|data| Ok(data.delete_category(id))).await
    }

    async fn delete_payment_method(&self, id: &str) -> Result<bool> {
        self.mutate(|data| Ok(data.delete_payment_method(id))).await
    }
}
