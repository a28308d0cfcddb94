//! Summary command - totals, spending by category and monthly overview

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::Cell;
use rust_decimal::Decimal;

use controlfin_core::TransactionType;

use super::{date_range, get_context};
use crate::output;

pub async fn run(
    lang: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let ctx = get_context(lang).await?;
    let report = ctx.analytics_service.report(date_range(from, to)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.summary.count == 0 {
        println!("{}", ctx.message("transactions.empty", None).dimmed());
        return Ok(());
    }

    let currency = ctx.config.currency.as_str();
    let summary = &report.summary;

    let mut table = output::create_table();
    table.add_row(vec![
        Cell::new(ctx.message("analytics.income", None)),
        output::amount_cell(summary.income, TransactionType::Income, currency),
    ]);
    table.add_row(vec![
        Cell::new(ctx.message("analytics.expense", None)),
        output::amount_cell(summary.expense, TransactionType::Expense, currency),
    ]);
    table.add_row(vec![
        Cell::new(ctx.message("analytics.transfer", None)),
        output::amount_cell(summary.transfer, TransactionType::Transfer, currency),
    ]);
    table.add_row(vec![
        Cell::new(ctx.message("analytics.balance", None)),
        Cell::new(format!("{:.2} {}", summary.balance.round_dp(2), currency)),
    ]);
    println!("{}", table);
    println!();

    if !report.by_category.is_empty() {
        println!("{}", ctx.message("analytics.byCategory", None).bold());
        let mut table = output::create_table();
        table.set_header(vec![
            ctx.message("transactions.columns.category", None),
            ctx.message("transactions.columns.amount", None),
            "%".to_string(),
            "#".to_string(),
        ]);
        for category in &report.by_category {
            table.add_row(vec![
                category.name.clone(),
                format!("{:.2} {}", category.total.round_dp(2), currency),
                format!("{:.1}", share(category.total, summary.expense)),
                category.count.to_string(),
            ]);
        }
        println!("{}", table);
        println!();
    }

    println!("{}", ctx.message("analytics.monthly", None).bold());
    let mut table = output::create_table();
    table.set_header(vec![
        String::new(),
        ctx.message("analytics.income", None),
        ctx.message("analytics.expense", None),
    ]);
    for month in &report.monthly {
        table.add_row(vec![
            Cell::new(&month.month),
            output::amount_cell(month.income, TransactionType::Income, currency),
            output::amount_cell(month.expense, TransactionType::Expense, currency),
        ]);
    }
    println!("{}", table);

    Ok(())
}

/// Percentage of `part` in `whole`, zero when there is no whole
fn share(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        (part * Decimal::ONE_HUNDRED / whole).round_dp(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share() {
        assert_eq!(share(Decimal::new(25, 0), Decimal::new(100, 0)), Decimal::new(25, 0));
        assert_eq!(share(Decimal::new(1, 0), Decimal::new(3, 0)), Decimal::new(333, 1));
        assert_eq!(share(Decimal::new(5, 0), Decimal::ZERO), Decimal::ZERO);
    }
}
