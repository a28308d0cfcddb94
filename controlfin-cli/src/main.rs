//! ControlFin CLI - Personal finance tracking in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;
mod output;

use commands::{add, categories, delete, edit, export, import, list, messages, summary};
use controlfin_core::domain::TypeFilter;
use controlfin_core::services::ExportFormat;
use controlfin_core::TransactionType;

/// ControlFin - personal finance tracking in your terminal
#[derive(Parser)]
#[command(name = "cf", version, about, long_about = None)]
struct Cli {
    /// Message language (overrides settings and CONTROLFIN_LANGUAGE)
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List transactions with filters, search, sorting and pages
    List {
        /// Case-insensitive search in description and tags
        #[arg(short, long, default_value = "")]
        search: String,
        /// income, expense, transfer or all
        #[arg(long = "type", default_value = "all")]
        transaction_type: TypeFilter,
        /// Category id
        #[arg(long)]
        category: Option<String>,
        /// Payment method id
        #[arg(long)]
        payment_method: Option<String>,
        /// First day (inclusive), YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day (inclusive), YYYY-MM-DD
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        min: Option<Decimal>,
        #[arg(long)]
        max: Option<Decimal>,
        /// Required tag (repeatable; all must match)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Only recurring (true) or one-off (false) transactions
        #[arg(long)]
        recurring: Option<bool>,
        /// date, amount, description or category
        #[arg(long, default_value = "date")]
        sort: String,
        /// asc or desc
        #[arg(long, default_value = "desc")]
        order: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Defaults to the configured page size
        #[arg(long)]
        page_size: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a transaction
    Add {
        #[arg(long = "type")]
        transaction_type: TransactionType,
        #[arg(long, allow_hyphen_values = true)]
        amount: Decimal,
        #[arg(long)]
        description: String,
        /// Category id
        #[arg(long)]
        category: String,
        /// Payment method id
        #[arg(long)]
        payment_method: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        recurring: bool,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a transaction (only the given fields change)
    Edit {
        /// Transaction id or unique prefix
        id: String,
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        payment_method: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Replace tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        #[arg(long)]
        recurring: Option<bool>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a transaction
    Delete {
        /// Transaction id or unique prefix
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Import transactions from CSV or Excel
    Import {
        /// Path to CSV/XLSX file
        file: Option<PathBuf>,
        /// Validate and show the outcome without importing
        #[arg(long)]
        preview: bool,
        /// Use saved import profile
        #[arg(long)]
        profile: Option<String>,
        /// Save mapping and options as profile
        #[arg(long)]
        save_profile: Option<String>,
        /// List saved profiles
        #[arg(long)]
        list_profiles: bool,
        /// Column assignment HEADER=FIELD (repeatable), e.g. "Valor=amount"
        #[arg(long = "map")]
        mappings: Vec<String>,
        /// Review the column mapping interactively
        #[arg(long)]
        interactive: bool,
        /// Field delimiter for CSV
        #[arg(long)]
        delimiter: Option<char>,
        /// Date layout hint, e.g. DD/MM/YYYY
        #[arg(long)]
        date_format: Option<String>,
        /// Look for the header row below preamble lines
        #[arg(long)]
        scan_header: bool,
        /// Keep rows that match existing transactions
        #[arg(long)]
        keep_duplicates: bool,
        /// Overwrite matching transactions instead of skipping them
        #[arg(long)]
        update_existing: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export transactions to CSV or Excel
    Export {
        /// csv, xlsx or pdf
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Leave out the category column
        #[arg(long)]
        no_categories: bool,
        /// Leave out the payment method column
        #[arg(long)]
        no_payment_methods: bool,
        /// Include location and notes
        #[arg(long)]
        metadata: bool,
        /// Target directory (defaults to the current directory)
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Totals, spending by category and monthly overview
    Summary {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: categories::CategoryCommands,
    },

    /// Manage payment methods
    PaymentMethods {
        #[command(subcommand)]
        command: categories::PaymentMethodCommands,
    },

    /// Look up messages and negotiate languages
    Messages {
        #[command(subcommand)]
        command: messages::MessageCommands,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let lang = cli.lang.as_deref();
    match cli.command {
        Commands::List {
            search,
            transaction_type,
            category,
            payment_method,
            from,
            to,
            min,
            max,
            tags,
            recurring,
            sort,
            order,
            page,
            page_size,
            json,
        } => {
            let args = list::ListArgs {
                search,
                transaction_type,
                category,
                payment_method,
                from,
                to,
                min,
                max,
                tags,
                recurring,
                sort,
                order,
                page,
                page_size,
            };
            list::run(lang, args, json).await
        }
        Commands::Add {
            transaction_type,
            amount,
            description,
            category,
            payment_method,
            date,
            tags,
            recurring,
            location,
            notes,
            json,
        } => {
            let args = add::AddArgs {
                transaction_type,
                amount,
                description,
                category,
                payment_method,
                date,
                tags,
                recurring,
                location,
                notes,
            };
            add::run(lang, args, json).await
        }
        Commands::Edit {
            id,
            transaction_type,
            amount,
            description,
            category,
            payment_method,
            date,
            tags,
            recurring,
            location,
            notes,
            json,
        } => {
            let args = edit::EditArgs {
                transaction_type,
                amount,
                description,
                category,
                payment_method,
                date,
                tags,
                recurring,
                location,
                notes,
            };
            edit::run(lang, &id, args, json).await
        }
        Commands::Delete { id, force } => delete::run(lang, &id, force).await,
        Commands::Import {
            file,
            preview,
            profile,
            save_profile,
            list_profiles,
            mappings,
            interactive,
            delimiter,
            date_format,
            scan_header,
            keep_duplicates,
            update_existing,
            json,
        } => {
            let args = import::ImportArgs {
                file,
                preview,
                profile,
                save_profile,
                list_profiles,
                mappings,
                interactive,
                delimiter,
                date_format,
                scan_header,
                keep_duplicates,
                update_existing,
            };
            import::run(lang, args, json).await
        }
        Commands::Export {
            format,
            from,
            to,
            no_categories,
            no_payment_methods,
            metadata,
            out,
            json,
        } => {
            let args = export::ExportArgs {
                format,
                from,
                to,
                include_categories: !no_categories,
                include_payment_methods: !no_payment_methods,
                include_metadata: metadata,
                out,
            };
            export::run(lang, args, json).await
        }
        Commands::Summary { from, to, json } => summary::run(lang, from, to, json).await,
        Commands::Categories { command } => categories::run_categories(lang, command).await,
        Commands::PaymentMethods { command } => categories::run_payment_methods(lang, command).await,
        Commands::Messages { command } => messages::run(lang, command),
    }
}
