//! Delete command - remove a transaction

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Confirm;
use serde_json::json;

use super::get_context;
use crate::output;

pub async fn run(lang: Option<&str>, id: &str, force: bool) -> Result<()> {
    let ctx = get_context(lang).await?;
    let id = ctx.transaction_service.resolve_id(id).await?;
    let params = json!({ "id": id.to_string() });

    if !force
        && !Confirm::new()
            .with_prompt(ctx.message("transactions.confirmDelete", Some(&params)))
            .default(false)
            .interact()?
    {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    if !ctx.transaction_service.delete(id).await? {
        bail!("Transaction not found: {}", id);
    }
    output::success(&ctx.message("transactions.deleted", Some(&params)));
    Ok(())
}
