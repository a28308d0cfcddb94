//! Category and payment method commands

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use controlfin_core::domain::PaymentMethodType;
use controlfin_core::{Category, PaymentMethod, TransactionType};

use super::get_context;
use crate::output;

const DEFAULT_COLOR: &str = "#6B7280";

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add or replace a category
    Add {
        /// Category id (e.g. "groceries")
        id: String,
        /// Display name
        name: String,
        /// income, expense or transfer
        #[arg(long = "type", default_value = "expense")]
        category_type: TransactionType,
        #[arg(long, default_value = DEFAULT_COLOR)]
        color: String,
    },
    /// Delete a category; transactions keep the id
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum PaymentMethodCommands {
    /// List payment methods
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add or replace a payment method
    Add {
        /// Payment method id (e.g. "card")
        id: String,
        /// Display name
        name: String,
        /// cash, card, bank, digital, crypto or other
        #[arg(long = "type", default_value = "other")]
        method_type: PaymentMethodType,
        #[arg(long, default_value = DEFAULT_COLOR)]
        color: String,
    },
    /// Delete a payment method; transactions keep the id
    Remove {
        id: String,
    },
}

pub async fn run_categories(lang: Option<&str>, command: CategoryCommands) -> Result<()> {
    let ctx = get_context(lang).await?;

    match command {
        CategoryCommands::List { json } => {
            let categories = ctx.repository.list_categories().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&categories)?);
                return Ok(());
            }
            if categories.is_empty() {
                println!("{}", ctx.message("categories.empty", None).dimmed());
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Type", "Color"]);
            for c in &categories {
                table.add_row(vec![
                    c.id.clone(),
                    c.name.clone(),
                    ctx.message(&format!("transactions.types.{}", c.category_type), None),
                    c.color.clone(),
                ]);
            }
            println!("{}", table);
        }
        CategoryCommands::Add {
            id,
            name,
            category_type,
            color,
        } => {
            let id = id.trim().to_string();
            if id.is_empty() {
                bail!("Category id must not be empty");
            }
            let category = Category::new(id, name.trim(), category_type, color);
            ctx.repository.upsert_category(&category).await?;
            output::success(&ctx.message("categories.saved", Some(&json!({ "name": category.name }))));
        }
        CategoryCommands::Remove { id } => {
            if !ctx.repository.delete_category(&id).await? {
                bail!("Category not found: {}", id);
            }
            output::success(&ctx.message("categories.deleted", Some(&json!({ "id": id }))));
        }
    }
    Ok(())
}

pub async fn run_payment_methods(lang: Option<&str>, command: PaymentMethodCommands) -> Result<()> {
    let ctx = get_context(lang).await?;

    match command {
        PaymentMethodCommands::List { json } => {
            let methods = ctx.repository.list_payment_methods().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&methods)?);
                return Ok(());
            }
            if methods.is_empty() {
                println!("{}", ctx.message("paymentMethods.empty", None).dimmed());
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Type", "Color"]);
            for m in &methods {
                table.add_row(vec![
                    m.id.clone(),
                    m.name.clone(),
                    m.method_type.as_str().to_string(),
                    m.color.clone(),
                ]);
            }
            println!("{}", table);
        }
        PaymentMethodCommands::Add {
            id,
            name,
            method_type,
            color,
        } => {
            let id = id.trim().to_string();
            if id.is_empty() {
                bail!("Payment method id must not be empty");
            }
            let method = PaymentMethod::new(id, name.trim(), method_type, color);
            ctx.repository.upsert_payment_method(&method).await?;
            output::success(&ctx.message("paymentMethods.saved", Some(&json!({ "name": method.name }))));
        }
        PaymentMethodCommands::Remove { id } => {
            if !ctx.repository.delete_payment_method(&id).await? {
                bail!("Payment method not found: {}", id);
            }
            output::success(&ctx.message("paymentMethods.deleted", Some(&json!({ "id": id }))));
        }
    }
    Ok(())
}
