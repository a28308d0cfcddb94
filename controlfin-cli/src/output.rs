//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use controlfin_core::TransactionType;
use rust_decimal::Decimal;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Render an amount with its direction
///
/// Stored amounts keep whatever sign was entered; the sign shown comes
/// from the transaction type alone.
pub fn format_amount(amount: Decimal, transaction_type: TransactionType, currency: &str) -> String {
    let magnitude = amount.abs().round_dp(2);
    match transaction_type {
        TransactionType::Income => format!("+{:.2} {}", magnitude, currency),
        TransactionType::Expense => format!("-{:.2} {}", magnitude, currency),
        TransactionType::Transfer => format!("{:.2} {}", magnitude, currency),
    }
}

/// Colored table cell for an amount
pub fn amount_cell(amount: Decimal, transaction_type: TransactionType, currency: &str) -> Cell {
    let cell = Cell::new(format_amount(amount, transaction_type, currency));
    match transaction_type {
        TransactionType::Income => cell.fg(Color::Green),
        TransactionType::Expense => cell.fg(Color::Red),
        TransactionType::Transfer => cell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_sign_from_type() {
        assert_eq!(format_amount(Decimal::new(125, 1), TransactionType::Expense, "USD"), "-12.50 USD");
        assert_eq!(format_amount(Decimal::new(-125, 1), TransactionType::Expense, "USD"), "-12.50 USD");
        assert_eq!(format_amount(Decimal::new(-3, 0), TransactionType::Income, "BRL"), "+3.00 BRL");
        assert_eq!(format_amount(Decimal::new(7125, 3), TransactionType::Transfer, "EUR"), "7.12 EUR");
    }
}
