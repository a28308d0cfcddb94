//! Transaction store - single-writer state container
//!
//! Holds the loaded transactions and reference data together with the list
//! view state (filters, search, sort, page). The visible list is recomputed
//! after every mutation, so `pagination().total_count` always equals
//! `visible().len()`.

use uuid::Uuid;

use super::filter::filter_and_sort;
use crate::domain::pagination::DEFAULT_PAGE_SIZE;
use crate::domain::result::{Error, Result};
use crate::domain::{
    paginate, Category, Pagination, PaymentMethod, ReferenceData, SortKey, SortOrder,
    Transaction, TransactionFilters, TransactionPatch,
};

#[derive(Debug, Clone)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    reference: ReferenceData,
    filters: TransactionFilters,
    search_query: String,
    sort_by: Option<SortKey>,
    sort_order: SortOrder,
    current_page: usize,
    page_size: usize,
    visible: Vec<Transaction>,
}

impl Default for TransactionStore {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }
}

impl TransactionStore {
    /// Newest first by default
    pub fn new(
        transactions: Vec<Transaction>,
        categories: Vec<Category>,
        payment_methods: Vec<PaymentMethod>,
    ) -> Self {
        let mut store = Self {
            transactions,
            reference: ReferenceData::new(categories, payment_methods),
            filters: TransactionFilters::default(),
            search_query: String::new(),
            sort_by: Some(SortKey::Date),
            sort_order: SortOrder::Desc,
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            visible: Vec::new(),
        };
        store.refresh();
        store
    }

    fn refresh(&mut self) {
        self.visible = filter_and_sort(
            &self.transactions,
            &self.filters,
            &self.search_query,
            self.sort_by,
            self.sort_order,
            &self.reference,
        );
    }

    fn reset_page(&mut self) {
        self.current_page = 1;
    }

    // === Data ===

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn get(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn set_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
        self.refresh();
    }

    pub fn add(&mut self, tx: Transaction) {
        self.transactions.push(tx);
        self.refresh();
    }

    /// Merge a partial update into an existing transaction
    pub fn update(&mut self, id: Uuid, patch: TransactionPatch) -> Result<&Transaction> {
        let idx = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::not_found(format!("transaction {}", id)))?;
        self.transactions[idx].apply(patch);
        self.refresh();
        Ok(&self.transactions[idx])
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        let removed = self.transactions.len() != before;
        if removed {
            self.refresh();
        }
        removed
    }

    pub fn upsert_category(&mut self, category: Category) {
        let mut categories = self.reference.categories().to_vec();
        match categories.iter_mut().find(|c| c.id == category.id) {
            Some(slot) => *slot = category,
            None => categories.push(category),
        }
        self.reference = ReferenceData::new(categories, self.reference.payment_methods().to_vec());
        self.refresh();
    }

    pub fn remove_category(&mut self, id: &str) -> bool {
        let mut categories = self.reference.categories().to_vec();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return false;
        }
        self.reference = ReferenceData::new(categories, self.reference.payment_methods().to_vec());
        self.refresh();
        true
    }

    pub fn upsert_payment_method(&mut self, method: PaymentMethod) {
        let mut methods = self.reference.payment_methods().to_vec();
        match methods.iter_mut().find(|p| p.id == method.id) {
            Some(slot) => *slot = method,
            None => methods.push(method),
        }
        self.reference = ReferenceData::new(self.reference.categories().to_vec(), methods);
    }

    pub fn remove_payment_method(&mut self, id: &str) -> bool {
        let mut methods = self.reference.payment_methods().to_vec();
        let before = methods.len();
        methods.retain(|p| p.id != id);
        if methods.len() == before {
            return false;
        }
        self.reference = ReferenceData::new(self.reference.categories().to_vec(), methods);
        true
    }

    // === View state ===

    pub fn filters(&self) -> &TransactionFilters {
        &self.filters
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn sort(&self) -> (Option<SortKey>, SortOrder) {
        (self.sort_by, self.sort_order)
    }

    pub fn set_filters(&mut self, filters: TransactionFilters) {
        self.filters = filters;
        self.reset_page();
        self.refresh();
    }

    pub fn reset_filters(&mut self) {
        self.set_filters(TransactionFilters::default());
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.reset_page();
        self.refresh();
    }

    pub fn set_sort(&mut self, sort_by: Option<SortKey>, sort_order: SortOrder) {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self.reset_page();
        self.refresh();
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Zero is read as one
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.reset_page();
    }

    // === Derived ===

    /// Filtered and sorted transactions
    pub fn visible(&self) -> &[Transaction] {
        &self.visible
    }

    pub fn current_page_items(&self) -> &[Transaction] {
        paginate(&self.visible, self.current_page, self.page_size)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.current_page, self.page_size, self.visible.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reference::{default_categories, default_payment_methods};
    use crate::domain::{Resolved, TransactionType, TypeFilter};
    use chrono::{Datelike, NaiveDate};
    use rust_decimal::Decimal;

    fn tx(desc: &str, t: TransactionType, day: u32) -> Transaction {
        Transaction::new(
            t,
            Decimal::new(1000 + day as i64, 2),
            desc,
            "groceries",
            "cash",
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
        )
    }

    fn store(n: u32) -> TransactionStore {
        let txs = (1..=n)
            .map(|d| {
                let t = if d % 2 == 0 {
                    TransactionType::Income
                } else {
                    TransactionType::Expense
                };
                tx(&format!("item {}", d), t, d)
            })
            .collect();
        TransactionStore::new(txs, default_categories(), default_payment_methods())
    }

    #[test]
    fn test_default_sort_newest_first() {
        let store = store(3);
        let days: Vec<u32> = store.visible().iter().map(|t| t.date.day()).collect();
        assert_eq!(days, vec![3, 2, 1]);
    }

    #[test]
    fn test_total_count_tracks_filters() {
        let mut store = store(25);
        assert_eq!(store.pagination().total_count, 25);
        assert_eq!(store.pagination().total_pages(), 3);

        store.set_page(3);
        assert_eq!(store.current_page_items().len(), 5);

        store.set_filters(
            TransactionFilters::builder()
                .transaction_type(TypeFilter::Only(TransactionType::Income))
                .build(),
        );
        assert_eq!(store.pagination().current_page, 1);
        assert_eq!(store.pagination().total_count, 12);
        assert_eq!(store.visible().len(), 12);

        store.set_search("item 1");
        // item 10, 12, 14, 16, 18
        assert_eq!(store.pagination().total_count, 5);

        store.reset_filters();
        // item 1, 10..=19
        assert_eq!(store.pagination().total_count, 11);
    }

    #[test]
    fn test_crud_refreshes_visible() {
        let mut store = store(2);
        let extra = tx("Bakery", TransactionType::Expense, 20);
        let id = extra.id;
        store.add(extra);
        assert_eq!(store.visible()[0].id, id);

        let patch = TransactionPatch {
            description: Some("Bakery (weekend)".to_string()),
            ..Default::default()
        };
        assert_eq!(store.update(id, patch).unwrap().description, "Bakery (weekend)");
        store.set_search("weekend");
        assert_eq!(store.visible().len(), 1);

        assert!(store.remove(id));
        assert!(store.visible().is_empty());
        assert!(!store.remove(id));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut store = store(1);
        let err = store.update(Uuid::new_v4(), TransactionPatch::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_category_rename_resorts() {
        let mut store = TransactionStore::new(
            vec![
                Transaction::new(
                    TransactionType::Expense,
                    Decimal::ONE,
                    "a",
                    "groceries",
                    "cash",
                    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                ),
                Transaction::new(
                    TransactionType::Expense,
                    Decimal::ONE,
                    "b",
                    "housing",
                    "cash",
                    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                ),
            ],
            default_categories(),
            default_payment_methods(),
        );
        store.set_sort(Some(SortKey::Category), SortOrder::Asc);
        assert_eq!(store.visible()[0].description, "a");

        store.upsert_category(Category::new(
            "groceries",
            "Supermarket",
            TransactionType::Expense,
            "#000000",
        ));
        assert_eq!(store.visible()[0].description, "b");
        assert!(store.remove_category("groceries"));
        assert!(!store.remove_category("groceries"));
        // unresolved names sort as empty strings
        assert_eq!(store.visible()[0].description, "a");
    }

    #[test]
    fn test_page_size_resets_page() {
        let mut store = store(30);
        store.set_page(3);
        store.set_page_size(0);
        assert_eq!(store.pagination().current_page, 1);
        assert_eq!(store.pagination().page_size, 1);
        assert_eq!(store.current_page_items().len(), 1);
    }

    #[test]
    fn test_set_transactions_recomputes_count() {
        let mut store = store(25);
        store.set_filters(
            TransactionFilters::builder()
                .transaction_type(TypeFilter::Only(TransactionType::Expense))
                .build(),
        );
        assert_eq!(store.pagination().total_count, 13);

        store.set_transactions(vec![
            tx("a", TransactionType::Expense, 1),
            tx("b", TransactionType::Income, 2),
            tx("c", TransactionType::Expense, 3),
        ]);
        assert_eq!(store.transactions().len(), 3);
        // filters survive a reload
        assert_eq!(store.pagination().total_count, 2);
        assert_eq!(store.visible().len(), 2);
    }

    #[test]
    fn test_remove_payment_method() {
        let mut store = store(2);
        let count = store.reference().payment_methods().len();
        assert!(store.remove_payment_method("cash"));
        assert!(!store.remove_payment_method("cash"));
        assert_eq!(store.reference().payment_methods().len(), count - 1);
        // transactions keep the dangling id
        assert!(store.transactions().iter().all(|t| t.payment_method_id == "cash"));
        assert_eq!(store.reference().payment_method_name("cash"), Resolved::NotFound);
    }
}
