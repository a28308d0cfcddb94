//! Import command - import transactions from CSV or Excel

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Select};
use serde_json::json;

use controlfin_core::config::ImportProfile;
use controlfin_core::domain::{ColumnMapping, HeaderMode, ImportField, RowIssue};
use controlfin_core::services::{ImportOptions, ImportPreview, ImportResult};
use controlfin_core::ControlFinContext;

use super::get_context;
use crate::output;

const PREVIEW_ROWS: usize = 10;

pub struct ImportArgs {
    pub file: Option<PathBuf>,
    pub preview: bool,
    pub profile: Option<String>,
    pub save_profile: Option<String>,
    pub list_profiles: bool,
    pub mappings: Vec<String>,
    pub interactive: bool,
    pub delimiter: Option<char>,
    pub date_format: Option<String>,
    pub scan_header: bool,
    pub keep_duplicates: bool,
    pub update_existing: bool,
}

pub async fn run(lang: Option<&str>, args: ImportArgs, json: bool) -> Result<()> {
    let ctx = get_context(lang).await?;

    if args.list_profiles {
        return print_profiles(&ctx, json);
    }

    let file_path = args
        .file
        .clone()
        .ok_or_else(|| anyhow!("File path required for import"))?;

    let (mut mapping, mut options) = base_settings(&ctx, &args)?;
    for assignment in &args.mappings {
        let (header, field) = parse_assignment(assignment)?;
        mapping.set(header, field);
    }

    let mut preview = ctx
        .import_service
        .preview(&file_path, &mapping, &options, &ctx.locale)
        .await?;

    if args.interactive && !json {
        print_mapping(&ctx, &preview);
        mapping = review_mapping(&ctx, &preview, mapping)?;
        preview = ctx
            .import_service
            .preview(&file_path, &mapping, &options, &ctx.locale)
            .await?;
    }

    if let Some(name) = &args.save_profile {
        let profile = ImportProfile {
            mapping: effective_mapping(&preview, &mapping),
            delimiter: Some(options.delimiter),
            date_format: options.date_format.clone(),
            header_mode: options.header_mode,
        };
        ctx.import_service.save_profile(name, profile)?;
        if !json {
            println!("Profile '{}' saved", name);
        }
    }

    if args.preview {
        if json {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        } else {
            print_mapping(&ctx, &preview);
            print_preview(&ctx, &preview);
            println!("{}", "PREVIEW MODE - No changes applied".yellow());
        }
        return Ok(());
    }

    if preview.valid.is_empty() {
        if json {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        } else {
            print_mapping(&ctx, &preview);
            print_issues(&preview.errors, &preview.warnings);
            output::warning(&ctx.message("import.nothingToImport", None));
        }
        return Ok(());
    }

    if !json {
        print_mapping(&ctx, &preview);
        print_preview(&ctx, &preview);

        if args.interactive
            && !Confirm::new()
                .with_prompt(ctx.message(
                    "import.confirm",
                    Some(&json!({ "count": preview.valid_count() })),
                ))
                .default(true)
                .interact()?
        {
            println!("{}", ctx.message("import.cancelled", None).dimmed());
            return Ok(());
        }
    }

    // Flags given on the command line win over profile values
    if args.keep_duplicates {
        options.skip_duplicates = false;
    }
    if args.update_existing {
        options.update_existing = true;
    }

    let result = ctx.import_service.commit(&preview, &options).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&ctx, &result);
    }

    match result.failure {
        Some(failure) => Err(anyhow!(failure)),
        None => Ok(()),
    }
}

/// Settings defaults, layered with the named profile and CLI overrides
fn base_settings(ctx: &ControlFinContext, args: &ImportArgs) -> Result<(ColumnMapping, ImportOptions)> {
    let mut options = ImportOptions::from_defaults(&ctx.config.import);
    let mut mapping = ColumnMapping::new();

    if let Some(name) = &args.profile {
        let profile = ctx
            .import_service
            .get_profile(name)?
            .ok_or_else(|| anyhow!("Profile not found: {}", name))?;
        options = options.with_profile(&profile);
        mapping = profile.mapping;
    }

    if let Some(delimiter) = args.delimiter {
        options.delimiter = delimiter;
    }
    if args.date_format.is_some() {
        options.date_format = args.date_format.clone();
    }
    if args.scan_header {
        options.header_mode = HeaderMode::Scan;
    }
    Ok((mapping, options))
}

/// Parse `HEADER=FIELD`; the header may itself contain `=`
fn parse_assignment(assignment: &str) -> Result<(String, ImportField)> {
    let (header, field) = assignment
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("Invalid mapping '{}', expected HEADER=FIELD", assignment))?;
    let header = header.trim();
    if header.is_empty() {
        return Err(anyhow!("Invalid mapping '{}', header is empty", assignment));
    }
    let field: ImportField = field
        .parse()
        .with_context(|| format!("Invalid mapping '{}'", assignment))?;
    Ok((header.to_string(), field))
}

/// Every resolved header, so a saved profile does not depend on keywords
fn effective_mapping(preview: &ImportPreview, user: &ColumnMapping) -> ColumnMapping {
    let mut mapping = user.clone();
    for (header, field) in preview.headers.iter().zip(&preview.mapping) {
        if let Some(field) = field {
            mapping.set(header.clone(), *field);
        }
    }
    mapping
}

fn review_mapping(
    ctx: &ControlFinContext,
    preview: &ImportPreview,
    mut mapping: ColumnMapping,
) -> Result<ColumnMapping> {
    let mut choices: Vec<ImportField> = ImportField::AUTO.to_vec();
    choices.push(ImportField::Notes);
    choices.push(ImportField::Skip);

    let labels: Vec<String> = choices
        .iter()
        .map(|f| match f {
            ImportField::Skip => ctx.message("import.mapping.unmapped", None),
            other => other.to_string(),
        })
        .collect();

    for (header, current) in preview.headers.iter().zip(&preview.mapping) {
        let default = current
            .and_then(|f| choices.iter().position(|c| *c == f))
            .unwrap_or(choices.len() - 1);
        let selection = Select::new()
            .with_prompt(header)
            .items(&labels)
            .default(default)
            .interact()?;
        mapping.set(header.clone(), choices[selection]);
    }
    Ok(mapping)
}

fn print_profiles(ctx: &ControlFinContext, json: bool) -> Result<()> {
    let profiles = ctx.import_service.list_profiles()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }
    if profiles.is_empty() {
        println!("No saved profiles.");
        return Ok(());
    }

    let mut names: Vec<&String> = profiles.keys().collect();
    names.sort();

    println!("Saved import profiles:");
    for name in names {
        let profile = &profiles[name];
        println!();
        println!("  {}", name.green());
        for (header, field) in profile.mapping.iter() {
            println!("    {} -> {}", header, field);
        }
        if let Some(delimiter) = profile.delimiter {
            println!("    Delimiter: {:?}", delimiter);
        }
        if let Some(format) = &profile.date_format {
            println!("    Date format: {}", format);
        }
        if profile.header_mode == HeaderMode::Scan {
            println!("    Header: scan");
        }
    }
    Ok(())
}

fn print_mapping(ctx: &ControlFinContext, preview: &ImportPreview) {
    println!("{}", ctx.message("import.mapping.title", None).cyan());
    let ignored = ctx.message("import.mapping.unmapped", None);
    for (header, field) in preview.headers.iter().zip(&preview.mapping) {
        match field {
            Some(ImportField::Skip) | None => println!("  {} {}", header, ignored.dimmed()),
            Some(field) => println!("  {} -> {}", header, field),
        }
    }

    let missing = preview.unmapped_required();
    if !missing.is_empty() {
        let fields: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
        output::warning(&ctx.message(
            "import.errors.missingFields",
            Some(&json!({ "fields": fields.join(", ") })),
        ));
    }
    println!();
}

fn print_preview(ctx: &ControlFinContext, preview: &ImportPreview) {
    println!(
        "{}",
        ctx.message(
            "import.preview.title",
            Some(&json!({
                "valid": preview.valid_count(),
                "invalid": preview.invalid_count(),
            })),
        )
        .bold()
    );

    if !preview.valid.is_empty() {
        let mut table = output::create_table();
        table.set_header(vec![
            ctx.message("transactions.columns.date", None),
            ctx.message("transactions.columns.type", None),
            ctx.message("transactions.columns.amount", None),
            ctx.message("transactions.columns.description", None),
            ctx.message("transactions.columns.category", None),
        ]);
        for tx in preview.valid.iter().take(PREVIEW_ROWS) {
            table.add_row(vec![
                tx.date.to_string(),
                tx.transaction_type.to_string(),
                output::format_amount(tx.amount, tx.transaction_type, &ctx.config.currency),
                tx.description.clone(),
                tx.category_id.clone(),
            ]);
        }
        println!("{}", table);
        if preview.valid.len() > PREVIEW_ROWS {
            println!("... and {} more", preview.valid.len() - PREVIEW_ROWS);
        }
    }

    print_issues(&preview.errors, &preview.warnings);
    println!();
}

fn print_issues(errors: &[RowIssue], warnings: &[RowIssue]) {
    for issue in errors {
        eprintln!("  {} {}", format!("row {}:", issue.row).red(), issue.message);
    }
    for issue in warnings {
        println!("  {} {}", format!("row {}:", issue.row).yellow(), issue.message);
    }
}

fn print_result(ctx: &ControlFinContext, result: &ImportResult) {
    if !result.success {
        return;
    }
    output::success(&ctx.message("import.success", Some(&json!({ "count": result.imported }))));
    if result.updated > 0 {
        output::info(&ctx.message("import.updated", Some(&json!({ "count": result.updated }))));
    }
    if result.skipped_duplicates > 0 {
        output::info(&ctx.message(
            "import.skipped",
            Some(&json!({ "count": result.skipped_duplicates })),
        ));
    }
}
