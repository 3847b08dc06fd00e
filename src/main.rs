//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `gamedata_etl` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use gamedata_etl::config::{
    AIRTABLE_API_BASE_URL, DEFAULT_BATCH_COUNT, DEFAULT_BATCH_SIZE, DEFAULT_FIELDS, LOG_FILE,
    MAX_BATCH_SIZE,
};
use gamedata_etl::dataset::table_name_from_path;
use gamedata_etl::fetch::spreadsheet::SpreadsheetClient;
use gamedata_etl::initialization::{init_client, init_logger_with};
use gamedata_etl::table::literal::parse_cell;
use gamedata_etl::table::{read_csv, write_csv};
use gamedata_etl::{
    run_extract, Dataset, ExtractConfig, LogFormat, LogLevel, ReplacePlan, Table, TableRef,
};

#[derive(Debug, Parser)]
#[command(name = "gamedata_etl", version, about)]
struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract endpoints of the game-metadata API
    Extract(ExtractArgs),
    /// Extract tables from the spreadsheet backend into one CSV file
    Spreadsheet(SpreadsheetArgs),
    /// Replace foreign ids in CSV tables by values of other tables
    ReplaceIds(ReplaceIdsArgs),
    /// Split a column into one column per discriminator value
    Split(SplitArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Endpoint names (the first becomes the main table)
    #[arg(required = true)]
    endpoints: Vec<String>,

    /// Maximum number of requests per endpoint
    #[arg(long, default_value_t = DEFAULT_BATCH_COUNT)]
    batches: usize,

    /// Records per request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
    batch_size: usize,

    /// Fields to extract (`*` for all)
    #[arg(long, default_value = DEFAULT_FIELDS)]
    fields: String,

    /// Append request logs to the log file
    #[arg(long)]
    keep_logs: bool,

    /// Log file used with --keep-logs
    #[arg(long, default_value = LOG_FILE)]
    log_file: PathBuf,

    /// Do not print request logs
    #[arg(long)]
    quiet: bool,

    /// Save every table as {endpoint}_data.csv
    #[arg(long)]
    save_csv: bool,

    /// Directory for --save-csv
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// OAuth client id
    #[arg(long, env = "IGDB_CLIENT_ID", hide_env_values = true)]
    client_id: String,

    /// OAuth client secret
    #[arg(long, env = "IGDB_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,
}

#[derive(Debug, Args)]
struct SpreadsheetArgs {
    /// App (base) id
    app: String,

    /// Tables to extract, concatenated in order
    #[arg(required = true)]
    tables: Vec<String>,

    /// Output CSV file
    #[arg(long)]
    output: PathBuf,

    /// API key
    #[arg(long, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// API base URL
    #[arg(long, default_value = AIRTABLE_API_BASE_URL)]
    base_url: String,
}

#[derive(Debug, Args)]
struct ReplaceIdsArgs {
    /// CSV files; the first is the main table, the others are looked up by name
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Column to rewrite (repeatable)
    #[arg(long = "column", required = true)]
    columns: Vec<String>,

    /// Table holding the values for the matching --column (repeatable)
    #[arg(long = "table", required = true)]
    tables: Vec<String>,

    /// Value column of the matching --table (repeatable)
    #[arg(long = "field", required = true)]
    fields: Vec<String>,

    /// Key column: once for all tables, or once per --column (default `id`)
    #[arg(long = "key")]
    keys: Vec<String>,

    /// Rewrite this named table instead of the main table
    #[arg(long)]
    target: Option<String>,

    /// Output CSV file
    #[arg(long)]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct SplitArgs {
    /// Input CSV file
    csv: PathBuf,

    /// Column to split
    #[arg(long)]
    column: String,

    /// Discriminator column
    #[arg(long)]
    by: String,

    /// Discriminator values
    #[arg(long, required = true, num_args = 1..)]
    values: Vec<String>,

    /// Output CSV file
    #[arg(long)]
    output: PathBuf,
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|e| format!("{}", e))?;
    if size == 0 || size > MAX_BATCH_SIZE {
        return Err(format!("must be between 1 and {}", MAX_BATCH_SIZE));
    }
    Ok(size)
}

async fn extract(args: ExtractArgs) -> Result<()> {
    let config = ExtractConfig {
        endpoints: args.endpoints,
        client_id: args.client_id,
        client_secret: args.client_secret,
        batch_count: args.batches,
        batch_size: args.batch_size,
        fields: args.fields,
        keep_logs: args.keep_logs,
        show_logs: !args.quiet,
        log_file: args.log_file,
        save_csv_dir: args.save_csv.then_some(args.output_dir),
        ..Default::default()
    };

    let report = run_extract(config).await?;
    let total: usize = report.records_per_endpoint.iter().map(|(_, n)| n).sum();
    println!(
        "Extracted {} record{} from {} endpoint{} in {:.1}s",
        total,
        if total == 1 { "" } else { "s" },
        report.records_per_endpoint.len(),
        if report.records_per_endpoint.len() == 1 { "" } else { "s" },
        report.elapsed_seconds
    );
    for path in &report.csv_files {
        println!("Saved {}", path.display());
    }
    Ok(())
}

async fn spreadsheet(args: SpreadsheetArgs) -> Result<()> {
    let client = init_client().context("Failed to initialize HTTP client")?;
    let spreadsheet = SpreadsheetClient::with_base_url(client, args.base_url, args.api_key);
    let records = spreadsheet
        .extract_tables(&args.app, args.tables.as_slice())
        .await
        .with_context(|| format!("Failed to extract tables from app '{}'", args.app))?;

    let table = Table::from_records(table_name_from_path(&args.output), &records);
    write_csv(&table, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Wrote {} rows to {}",
        table.n_rows(),
        args.output.display()
    );
    Ok(())
}

fn replace_ids(args: ReplaceIdsArgs) -> Result<()> {
    let plan = ReplacePlan::new(args.columns, args.tables, args.fields);
    let plan = match args.keys.len() {
        0 => plan,
        1 => plan.with_shared_key(args.keys[0].clone()),
        _ => plan.with_key_columns(args.keys),
    };

    let mut dataset = Dataset::read_csvs(args.files.as_slice()).context("Failed to read CSV files")?;
    let target = match &args.target {
        Some(name) => TableRef::Named(name),
        None => TableRef::Main,
    };
    let Some(table) = dataset.replace_ids(&plan, target, false)? else {
        bail!("Rewrite produced no table");
    };

    write_csv(&table, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Rewrote {} column{} of {} rows into {}",
        plan.columns.len(),
        if plan.columns.len() == 1 { "" } else { "s" },
        table.n_rows(),
        args.output.display()
    );
    Ok(())
}

fn split(args: SplitArgs) -> Result<()> {
    let name = table_name_from_path(&args.csv);
    let mut dataset = Dataset::new();
    dataset.insert(
        read_csv(&args.csv, &name)
            .with_context(|| format!("Failed to read {}", args.csv.display()))?,
    );

    let values: Vec<_> = args
        .values
        .iter()
        .map(|value| parse_cell(value).into_value())
        .collect();
    dataset.split_column(&args.column, &args.by, &values, TableRef::Named(&name), true)?;

    let table = dataset.table(TableRef::Named(&name))?;
    write_csv(table, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Wrote {} columns to {}", table.n_cols(), args.output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a .env file next to the working directory
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logger_with(cli.log_level.into(), cli.log_format)
        .context("Failed to initialize logger")?;

    let result = match cli.command {
        Command::Extract(args) => extract(args).await,
        Command::Spreadsheet(args) => spreadsheet(args).await,
        Command::ReplaceIds(args) => replace_ids(args),
        Command::Split(args) => split(args),
    };

    if let Err(e) = result {
        eprintln!("gamedata_etl error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
