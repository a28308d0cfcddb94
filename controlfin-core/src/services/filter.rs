//! Filter/sort engine over an in-memory transaction list
//!
//! Pure functions: no I/O, never fail, and the sort is stable so equal keys
//! keep their input order in both directions.

use std::cmp::Ordering;

use crate::domain::{ReferenceData, SortKey, SortOrder, Transaction, TransactionFilters};

/// Narrow `transactions` by `filters` and `search_query`, then order by `sort_by`
///
/// Stages run conjunctively: search, type, category, payment method, date
/// range, amount range, tags, recurring. A `None` sort key keeps input order.
pub fn filter_and_sort(
    transactions: &[Transaction],
    filters: &TransactionFilters,
    search_query: &str,
    sort_by: Option<SortKey>,
    sort_order: SortOrder,
    reference: &ReferenceData,
) -> Vec<Transaction> {
    let needle = search_query.trim().to_lowercase();

    let mut result: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| matches_search(tx, &needle) && filters.matches(tx))
        .cloned()
        .collect();

    if let Some(key) = sort_by {
        sort_transactions(&mut result, key, sort_order, reference);
    }

    result
}

/// Case-insensitive substring match against the description or any tag
///
/// `needle` must already be lower-cased; an empty needle matches everything.
fn matches_search(tx: &Transaction, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    tx.description.to_lowercase().contains(needle)
        || tx.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

/// Stable in-place sort
pub fn sort_transactions(
    transactions: &mut [Transaction],
    key: SortKey,
    order: SortOrder,
    reference: &ReferenceData,
) {
    transactions.sort_by(|a, b| {
        let ordering = compare(a, b, key, reference);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &Transaction, b: &Transaction, key: SortKey, reference: &ReferenceData) -> Ordering {
    match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Amount => a.amount.cmp(&b.amount),
        SortKey::Description => a
            .description
            .to_lowercase()
            .cmp(&b.description.to_lowercase()),
        SortKey::Category => {
            let name_a = reference.category_name(&a.category_id).unwrap_or("");
            let name_b = reference.category_name(&b.category_id).unwrap_or("");
            name_a.to_lowercase().cmp(&name_b.to_lowercase())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reference::{default_categories, default_payment_methods};
    use crate::domain::{TransactionType, TypeFilter};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(
        t: TransactionType,
        cents: i64,
        desc: &str,
        category: &str,
        day: u32,
        tags: &[&str],
    ) -> Transaction {
        let tags: Vec<String> = tags.iter().map(|s| s.to_string()).collect();
        Transaction::new(t, Decimal::new(cents, 2), desc, category, "cash", date(2025, 1, day))
            .with_tags(&tags)
    }

    fn sample() -> Vec<Transaction> {
        let mut recurring = tx(TransactionType::Expense, 120000, "Rent", "housing", 1, &["home"]);
        recurring.is_recurring = true;
        vec![
            tx(TransactionType::Income, 500000, "January salary", "salary", 5, &[]),
            recurring,
            tx(TransactionType::Expense, 4599, "Supermarket", "groceries", 10, &["food", "weekly"]),
            tx(TransactionType::Expense, 1250, "Bus pass", "transport", 10, &["commute"]),
            tx(TransactionType::Expense, 3020, "Farmers market", "groceries", 31, &["food"]),
            tx(TransactionType::Transfer, 20000, "To savings", "unknown-cat", 15, &[]),
        ]
    }

    fn refs() -> ReferenceData {
        ReferenceData::new(default_categories(), default_payment_methods())
    }

    fn descriptions(txs: &[Transaction]) -> Vec<&str> {
        txs.iter().map(|t| t.description.as_str()).collect()
    }

    #[test]
    fn test_no_constraints_keeps_everything() {
        let input = sample();
        let out = filter_and_sort(&input, &TransactionFilters::default(), "", None, SortOrder::Asc, &refs());
        assert_eq!(out, input);

        let sorted = filter_and_sort(
            &input,
            &TransactionFilters::default(),
            "  ",
            Some(SortKey::Amount),
            SortOrder::Desc,
            &refs(),
        );
        assert_eq!(sorted.len(), input.len());
        for t in &input {
            assert!(sorted.iter().any(|s| s.id == t.id));
        }
    }

    #[test]
    fn test_search_matches_description_or_tag() {
        let input = sample();
        let filters = TransactionFilters::default();
        let out = filter_and_sort(&input, &filters, "MARKET", None, SortOrder::Asc, &refs());
        assert_eq!(descriptions(&out), vec!["Supermarket", "Farmers market"]);

        let out = filter_and_sort(&input, &filters, "commute", None, SortOrder::Asc, &refs());
        assert_eq!(descriptions(&out), vec!["Bus pass"]);
    }

    #[test]
    fn test_type_category_and_recurring_filters() {
        let input = sample();
        let filters = TransactionFilters::builder()
            .transaction_type(TypeFilter::Only(TransactionType::Expense))
            .category("groceries")
            .build();
        let out = filter_and_sort(&input, &filters, "", None, SortOrder::Asc, &refs());
        assert_eq!(descriptions(&out), vec!["Supermarket", "Farmers market"]);

        let filters = TransactionFilters::builder().recurring(true).build();
        let out = filter_and_sort(&input, &filters, "", None, SortOrder::Asc, &refs());
        assert_eq!(descriptions(&out), vec!["Rent"]);

        let filters = TransactionFilters::builder().recurring(false).build();
        let out = filter_and_sort(&input, &filters, "", None, SortOrder::Asc, &refs());
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_date_range_includes_boundaries() {
        let input = sample();
        let filters = TransactionFilters::builder()
            .date_range(date(2025, 1, 10), date(2025, 1, 31))
            .build();
        let out = filter_and_sort(&input, &filters, "", None, SortOrder::Asc, &refs());
        assert_eq!(
            descriptions(&out),
            vec!["Supermarket", "Bus pass", "Farmers market", "To savings"]
        );
    }

    #[test]
    fn test_amount_range_inclusive() {
        let input = sample();
        let filters = TransactionFilters::builder()
            .amount_range(Decimal::new(1250, 2), Decimal::new(4599, 2))
            .build();
        let out = filter_and_sort(&input, &filters, "", None, SortOrder::Asc, &refs());
        assert_eq!(descriptions(&out), vec!["Supermarket", "Bus pass", "Farmers market"]);
    }

    #[test]
    fn test_tags_require_all() {
        let input = sample();
        let filters = TransactionFilters::builder().tags(["food", "weekly"]).build();
        let out = filter_and_sort(&input, &filters, "", None, SortOrder::Asc, &refs());
        assert_eq!(descriptions(&out), vec!["Supermarket"]);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let input = sample();
        let filters = TransactionFilters::default();
        let asc = filter_and_sort(&input, &filters, "", Some(SortKey::Date), SortOrder::Asc, &refs());
        let pos = |v: &[Transaction], d: &str| v.iter().position(|t| t.description == d).unwrap();
        // Supermarket and Bus pass share a date; input order wins
        assert!(pos(&asc, "Supermarket") < pos(&asc, "Bus pass"));

        let desc = filter_and_sort(&input, &filters, "", Some(SortKey::Date), SortOrder::Desc, &refs());
        assert!(pos(&desc, "Supermarket") < pos(&desc, "Bus pass"));
        assert_eq!(desc[0].description, "Farmers market");
    }

    #[test]
    fn test_sort_by_category_name_with_unresolved_first() {
        let input = sample();
        let out = filter_and_sort(
            &input,
            &TransactionFilters::default(),
            "",
            Some(SortKey::Category),
            SortOrder::Asc,
            &refs(),
        );
        // "unknown-cat" resolves to "" and sorts first
        assert_eq!(out[0].description, "To savings");
        assert_eq!(out[1].description, "Supermarket");
        assert_eq!(out.last().unwrap().description, "Bus pass");
    }

    #[test]
    fn test_sort_by_description_ignores_case() {
        let input = vec![
            tx(TransactionType::Expense, 100, "banana", "groceries", 1, &[]),
            tx(TransactionType::Expense, 100, "Apple", "groceries", 1, &[]),
        ];
        let out = filter_and_sort(
            &input,
            &TransactionFilters::default(),
            "",
            Some(SortKey::Description),
            SortOrder::Asc,
            &refs(),
        );
        assert_eq!(descriptions(&out), vec!["Apple", "banana"]);
    }

    #[test]
    fn test_idempotent() {
        let input = sample();
        let filters = TransactionFilters::builder().tags(["food"]).build();
        let a = filter_and_sort(&input, &filters, "market", Some(SortKey::Amount), SortOrder::Desc, &refs());
        let b = filter_and_sort(&input, &filters, "market", Some(SortKey::Amount), SortOrder::Desc, &refs());
        assert_eq!(a, b);
    }
}
