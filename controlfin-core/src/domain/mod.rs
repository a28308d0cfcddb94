//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

pub mod filters;
pub mod import;
pub mod pagination;
pub mod reference;
pub mod result;
mod transaction;

pub use filters::{AmountRange, DateRange, SortKey, SortOrder, TransactionFilters, TypeFilter};
pub use import::{ColumnMapping, HeaderMode, ImportField, RowIssue};
pub use pagination::{paginate, Pagination};
pub use reference::{Category, PaymentMethod, PaymentMethodType, ReferenceData, Resolved};
pub use transaction::{
    fingerprint, Transaction, TransactionMetadata, TransactionPatch, TransactionType,
};
