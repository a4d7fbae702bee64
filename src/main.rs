use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use card_portfolio::{run, summarize_file, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "card-portfolio", version, about = "Reconcile card inventory against catalog prices")]
struct Cli {
    /// Directory holding the lookup/inventory folders and portfolio.csv
    #[arg(long, env = "CARD_PORTFOLIO_BASE_DIR", default_value = ".", global = true)]
    base_dir: PathBuf,

    /// JSON pipeline config (overrides the base-dir layout)
    #[arg(long, env = "CARD_PORTFOLIO_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Catalog directory; repeat to read several, in order
    #[arg(long = "catalog-dir", global = true)]
    catalog_dirs: Vec<PathBuf>,

    /// Inventory directory; repeat to read several, in order
    #[arg(long = "inventory-dir", global = true)]
    inventory_dirs: Vec<PathBuf>,

    /// Output portfolio CSV
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Rebuild the portfolio CSV from inventory and catalog sources
    Update,
    /// Print total value and the most valuable card of the portfolio CSV
    Summary,
    /// Update, then summarize (default)
    Run,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("card_portfolio=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Update => run_update(&config)?,
        Commands::Summary => run_summary(&config)?,
        Commands::Run => {
            run_update(&config)?;
            run_summary(&config)?;
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::new(&cli.base_dir),
    };

    if !cli.catalog_dirs.is_empty() {
        config = config.with_catalog_dirs(cli.catalog_dirs.clone());
    }
    if !cli.inventory_dirs.is_empty() {
        config = config.with_inventory_dirs(cli.inventory_dirs.clone());
    }
    if let Some(output) = &cli.output {
        config = config.with_output_path(output.clone());
    }

    Ok(config)
}

fn run_update(config: &PipelineConfig) -> Result<()> {
    let outcome = run(config)?;

    for skipped in outcome
        .catalog_load
        .skipped
        .iter()
        .chain(outcome.inventory_load.skipped.iter())
    {
        eprintln!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    println!(
        "Wrote {} rows to {}",
        outcome.rows_written(),
        outcome.output_path().display()
    );
    Ok(())
}

fn run_summary(config: &PipelineConfig) -> Result<()> {
    let summary = summarize_file(&config.output_path)?;
    println!("{}", summary.render().trim_end());
    Ok(())
}
