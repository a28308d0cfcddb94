//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod analytics;
pub mod export;
pub mod filter;
pub mod import;
pub mod store;
mod transactions;

pub use analytics::{AnalyticsService, CategoryTotal, MonthlyTotal, Report, Summary};
pub use export::{ExportFormat, ExportOptions, ExportOutcome, ExportPayload, ExportService};
pub use filter::{filter_and_sort, sort_transactions};
pub use import::{ImportOptions, ImportPreview, ImportResult, ImportService, InvalidRow};
pub use store::TransactionStore;
pub use transactions::TransactionService;
