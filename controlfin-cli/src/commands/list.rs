//! List command - filtered, searched, sorted and paged transactions

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::Cell;
use rust_decimal::Decimal;
use serde_json::json;

use controlfin_core::domain::{ReferenceData, SortKey, SortOrder, TransactionFilters, TypeFilter};
use controlfin_core::Transaction;

use super::{date_range, get_context};
use crate::output;

pub struct ListArgs {
    pub search: String,
    pub transaction_type: TypeFilter,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub tags: Vec<String>,
    pub recurring: Option<bool>,
    pub sort: String,
    pub order: String,
    pub page: usize,
    pub page_size: Option<usize>,
}

impl ListArgs {
    fn filters(&self) -> TransactionFilters {
        let mut builder = TransactionFilters::builder()
            .transaction_type(self.transaction_type)
            .tags(self.tags.iter().map(String::as_str));
        if let Some(category) = &self.category {
            builder = builder.category(category.as_str());
        }
        if let Some(method) = &self.payment_method {
            builder = builder.payment_method(method.as_str());
        }
        if let Some(range) = date_range(self.from, self.to) {
            builder = builder.date_range(range.start, range.end);
        }
        if self.min.is_some() || self.max.is_some() {
            builder = builder.amount_range(
                self.min.unwrap_or(Decimal::MIN),
                self.max.unwrap_or(Decimal::MAX),
            );
        }
        if let Some(recurring) = self.recurring {
            builder = builder.recurring(recurring);
        }
        builder.build()
    }
}

pub async fn run(lang: Option<&str>, args: ListArgs, json: bool) -> Result<()> {
    let ctx = get_context(lang).await?;
    let page_size = args.page_size.unwrap_or(ctx.config.page_size);

    let mut store = ctx.transaction_service.load_store(page_size).await?;
    store.set_filters(args.filters());
    store.set_search(args.search.as_str());

    let sort_key = SortKey::parse(&args.sort);
    if sort_key.is_none() {
        log::warn!("unknown sort key '{}', keeping stored order", args.sort);
    }
    store.set_sort(sort_key, SortOrder::parse(&args.order).unwrap_or_default());
    store.set_page(args.page);

    let pagination = store.pagination();

    if json {
        let out = json!({
            "transactions": store.current_page_items(),
            "pagination": {
                "currentPage": pagination.current_page,
                "pageSize": pagination.page_size,
                "totalCount": pagination.total_count,
                "totalPages": pagination.total_pages(),
            },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let items = store.current_page_items();
    if items.is_empty() {
        println!("{}", ctx.message("transactions.empty", None).dimmed());
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec![
        "ID".to_string(),
        ctx.message("transactions.columns.date", None),
        ctx.message("transactions.columns.type", None),
        ctx.message("transactions.columns.amount", None),
        ctx.message("transactions.columns.description", None),
        ctx.message("transactions.columns.category", None),
        ctx.message("transactions.columns.paymentMethod", None),
        ctx.message("transactions.columns.tags", None),
    ]);

    for tx in items {
        table.add_row(row(tx, store.reference(), &ctx.config.currency, &|key| ctx.message(key, None)));
    }

    println!("{}", table);
    println!(
        "{}",
        ctx.message(
            "pagination.summary",
            Some(&json!({
                "page": pagination.current_page,
                "pages": pagination.total_pages(),
                "total": pagination.total_count,
            })),
        )
        .dimmed()
    );

    Ok(())
}

fn row(
    tx: &Transaction,
    reference: &ReferenceData,
    currency: &str,
    message: &dyn Fn(&str) -> String,
) -> Vec<Cell> {
    let short_id: String = tx.id.to_string().chars().take(8).collect();
    vec![
        Cell::new(short_id),
        Cell::new(tx.date.to_string()),
        Cell::new(message(&format!("transactions.types.{}", tx.transaction_type))),
        output::amount_cell(tx.amount, tx.transaction_type, currency),
        Cell::new(&tx.description),
        Cell::new(reference.category_name(&tx.category_id).unwrap_or(&tx.category_id)),
        Cell::new(
            reference
                .payment_method_name(&tx.payment_method_id)
                .unwrap_or(&tx.payment_method_id),
        ),
        Cell::new(tx.tags.join(", ")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ListArgs {
        ListArgs {
            search: String::new(),
            transaction_type: TypeFilter::All,
            category: None,
            payment_method: None,
            from: None,
            to: None,
            min: None,
            max: None,
            tags: Vec::new(),
            recurring: None,
            sort: "date".to_string(),
            order: "desc".to_string(),
            page: 1,
            page_size: None,
        }
    }

    #[test]
    fn test_no_flags_means_no_filters() {
        assert!(args().filters().is_empty());
    }

    #[test]
    fn test_single_amount_bound_is_open_on_the_other_side() {
        let mut a = args();
        a.min = Some(Decimal::new(100, 0));
        let range = a.filters().amount_range.unwrap();
        assert!(range.contains(&Decimal::new(1_000_000, 0)));
        assert!(!range.contains(&Decimal::new(99, 0)));
    }
}
