//! CLI command implementations

pub mod add;
pub mod categories;
pub mod delete;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod messages;
pub mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use controlfin_core::domain::DateRange;
use controlfin_core::ControlFinContext;

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CONTROLFIN_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".controlfin"))
}

/// Open the context, optionally forcing the message language
pub async fn get_context(lang: Option<&str>) -> Result<ControlFinContext> {
    let data_dir = get_data_dir()?;

    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let mut ctx = ControlFinContext::open(&data_dir)
        .await
        .context("Failed to initialize controlfin context")?;
    if let Some(lang) = lang {
        ctx.locale.set_language(lang);
    }
    Ok(ctx)
}

/// Turn optional CLI bounds into an inclusive range
///
/// A missing bound leaves that side open.
pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<DateRange> {
    match (from, to) {
        (None, None) => None,
        (from, to) => Some(DateRange::new(
            from.unwrap_or(NaiveDate::MIN),
            to.unwrap_or(NaiveDate::MAX),
        )),
    }
}
