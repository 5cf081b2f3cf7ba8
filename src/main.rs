use analytics::{AggregationEngine, ReportAssembler};
use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{init_tracing, load_config, Config};
use database::{connect, run_migrations, QueryCatalog, SalesRepository};
use ingest::{ingest_files, CleaningRules, CleaningSummary};
use std::path::PathBuf;

/// The main entry point for the Groupwise experiment analytics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the config file and environment still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from '{}'", cli.config.display()))?;
    let _log_guard = init_tracing(&config.logging).context("Failed to initialize logging")?;

    // Initialize the database connection and run migrations
    let pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let repo = SalesRepository::new(pool);

    let result = match cli.command {
        Commands::Ingest(args) => handle_ingest(&config, &repo, args).await,
        Commands::Report(args) => handle_report(&config, repo, args).await,
        Commands::Run(args) => {
            handle_ingest(&config, &repo, IngestArgs::default()).await?;
            handle_report(&config, repo, args).await
        }
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {e:#}");
    }
    result
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Sales analytics for a four-group (A/B/C/D) website experiment.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the raw CSV files and load them into the store.
    Ingest(IngestArgs),
    /// Build the experiment report from the stored data.
    Report(ReportArgs),
    /// Ingest with the configured files, then build the report.
    Run(ReportArgs),
}

#[derive(Parser, Default)]
struct IngestArgs {
    /// Invoices CSV. Defaults to `data.invoices_csv`.
    #[arg(long)]
    invoices: Option<PathBuf>,

    /// Group assignments CSV. Defaults to `data.assignments_csv`.
    #[arg(long)]
    assignments: Option<PathBuf>,
}

#[derive(Parser)]
struct ReportArgs {
    /// Output directory. Defaults to `report.output_dir`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write `summary_report.json`.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_ingest(config: &Config, repo: &SalesRepository, args: IngestArgs) -> anyhow::Result<()> {
    let invoices = args.invoices.unwrap_or_else(|| config.data.invoices_csv.clone());
    let assignments = args.assignments.unwrap_or_else(|| config.data.assignments_csv.clone());
    let rules = CleaningRules::from_settings(&config.data);

    tracing::info!(invoices = %invoices.display(), assignments = %assignments.display(), "Starting ingestion.");
    let summary = ingest_files(repo, &invoices, &assignments, &rules)
        .await
        .context("Ingestion failed")?;

    print_cleaning("invoices", &summary.invoices);
    print_cleaning("group assignments", &summary.assignments);
    Ok(())
}

async fn handle_report(config: &Config, repo: SalesRepository, args: ReportArgs) -> anyhow::Result<()> {
    let catalog = match &config.queries.path {
        Some(path) => QueryCatalog::load(path)
            .with_context(|| format!("Failed to load query catalog '{}'", path.display()))?,
        None => QueryCatalog::bundled().context("Bundled query catalog is invalid")?,
    };
    tracing::info!(queries = catalog.len(), "Query catalog loaded.");

    let aggregation = AggregationEngine::new(catalog, repo);
    aggregation
        .verify()
        .await
        .context("Query catalog does not match the expected projections")?;

    let assembler = ReportAssembler::new(aggregation, config.report.significance_level);
    let report = assembler.assemble().await.context("Failed to assemble report")?;

    let output = args.output.unwrap_or_else(|| config.report.output_dir.clone());
    let markdown = reporting::write_markdown(&report, &output)?;
    println!("Report written to {}", markdown.display());
    if args.json {
        let json = reporting::write_json(&report, &output)?;
        println!("JSON written to {}", json.display());
    }

    reporting::print_summary(&report);
    Ok(())
}

fn print_cleaning(table: &str, summary: &CleaningSummary) {
    println!(
        "Loaded {} of {} {table} rows ({} incomplete, {} unparseable, {} outside the analysis window).",
        summary.kept,
        summary.read,
        summary.dropped_incomplete,
        summary.dropped_unparseable,
        summary.dropped_out_of_window
    );
}
