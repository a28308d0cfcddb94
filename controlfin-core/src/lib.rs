//! ControlFin Core - Business logic for personal finance tracking
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Transaction, Category, filters, etc.)
//! - **ports**: Trait definitions for external dependencies (Repository)
//! - **services**: Business logic orchestration (filter/sort, import, export, analytics)
//! - **adapters**: Concrete implementations (in-memory, JSON file)
//! - **codec**: CSV and spreadsheet readers/writers
//! - **i18n**: Message catalogue and language negotiation

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod i18n;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::JsonFileRepository;
use config::Config;
use i18n::{catalog, Locale};
use ports::Repository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Category, PaymentMethod, Transaction, TransactionFilters, TransactionType};

/// Main context for ControlFin operations
///
/// This is the primary entry point for all business logic. It holds
/// the repository, configuration, the caller's locale and all services.
pub struct ControlFinContext {
    pub data_dir: PathBuf,
    pub config: Config,
    pub locale: Locale,
    pub repository: Arc<dyn Repository>,
    pub transaction_service: TransactionService,
    pub import_service: ImportService,
    pub export_service: ExportService,
    pub analytics_service: AnalyticsService,
}

impl ControlFinContext {
    /// Open the JSON data file in `data_dir`, creating it when missing
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let repository: Arc<dyn Repository> = Arc::new(JsonFileRepository::open(data_dir).await?);
        Self::with_repository(data_dir, repository)
    }

    /// Build a context over any repository implementation
    pub fn with_repository(data_dir: &Path, repository: Arc<dyn Repository>) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let locale = Locale::new(config.language.clone());
        if !catalog().supports(locale.language()) {
            log::warn!("no messages for language '{}', using English", locale.language());
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            transaction_service: TransactionService::new(Arc::clone(&repository)),
            import_service: ImportService::new(Arc::clone(&repository), data_dir.to_path_buf()),
            export_service: ExportService::new(Arc::clone(&repository)),
            analytics_service: AnalyticsService::new(Arc::clone(&repository)),
            config,
            locale,
            repository,
        })
    }

    /// Localised message for this context's locale
    pub fn message(&self, key: &str, params: Option<&serde_json::Value>) -> String {
        catalog().get_message(&self.locale, key, params)
    }
}
