//! Export command - write transactions to CSV or Excel

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::json;

use controlfin_core::services::{ExportFormat, ExportOptions};

use super::{date_range, get_context};
use crate::output;

pub struct ExportArgs {
    pub format: ExportFormat,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub include_categories: bool,
    pub include_payment_methods: bool,
    pub include_metadata: bool,
    pub out: Option<PathBuf>,
}

impl ExportArgs {
    fn options(&self) -> ExportOptions {
        ExportOptions {
            format: self.format,
            date_range: date_range(self.from, self.to),
            include_categories: self.include_categories,
            include_payment_methods: self.include_payment_methods,
            include_metadata: self.include_metadata,
        }
    }
}

pub async fn run(lang: Option<&str>, args: ExportArgs, json: bool) -> Result<()> {
    let ctx = get_context(lang).await?;

    let out_dir = match &args.out {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    let outcome = ctx
        .export_service
        .export(&args.options(), &ctx.locale, &out_dir)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.count == 0 {
        output::warning(&ctx.message("export.empty", None));
    }
    output::success(&ctx.message(
        "export.success",
        Some(&json!({
            "count": outcome.count,
            "file": outcome.path.display().to_string(),
        })),
    ));
    Ok(())
}
