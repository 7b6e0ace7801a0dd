//! spendopt - Ad spend optimizer for campaign dashboards

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spendopt_core::{
    export_results_to_csv, export_results_to_json, CoreError, HistorySource, HistoryStore,
    LoadReport, OptimizerConfig, SpendOptimizer,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "spendopt",
    version,
    about = "Recommend daily ad spend from spend/lead history",
    long_about = "Fits spend → leads response curves to a campaign's recent daily history\n\
                  and recommends the daily spend with the best marginal lead yield.\n\
                  \n\
                  History files are JSON (array of {date, adSpend, leads}, or\n\
                  {\"campaigns\": {id: [...]}}) or CSV (date,adSpend,leads[,campaign]).\n\
                  \n\
                  Examples:\n\
                    spendopt optimize history.csv                 # Single-campaign file\n\
                    spendopt optimize all.json --campaign search  # One campaign of many\n\
                    spendopt batch all.json --export out.csv      # Every campaign, exported\n\
                    spendopt fit history.csv                      # Show fitted curves\n\
                    spendopt config                               # Effective tuning as TOML\n\
                  \n\
                  Environment Variables:\n\
                    SPENDOPT_CONFIG                  # Optimizer config file (TOML)\n\
                    SPENDOPT_FORMAT                  # Force output format: json|table\n\
                    SPENDOPT_NO_COLOR                # Disable ANSI colors (log-friendly)\n\
                    SPENDOPT_LOG                     # Log filter (default: spendopt=warn)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Optimizer config file (default: <config dir>/spendopt/config.toml)
    #[arg(long, env = "SPENDOPT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Force output format (json|table)
    #[arg(long, env = "SPENDOPT_FORMAT", value_parser = ["json", "table"], global = true)]
    format: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "SPENDOPT_NO_COLOR", global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Recommend daily spend for one campaign
    Optimize {
        /// History file (.json or .csv)
        file: PathBuf,
        /// Campaign id (required when the file holds several)
        #[arg(long, short = 'c')]
        campaign: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recommend daily spend for every campaign in a file
    Batch {
        /// History file (.json or .csv)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Also write results to a file (.json for JSON, CSV otherwise)
        #[arg(long, short = 'o')]
        export: Option<PathBuf>,
    },
    /// Show the fitted response curves and gate decision
    Fit {
        /// History file (.json or .csv)
        file: PathBuf,
        /// Campaign id (required when the file holds several)
        #[arg(long, short = 'c')]
        campaign: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective optimizer configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_tracing(cli.no_color);

    let (config, config_source) = load_config(cli.config.as_deref())?;

    // Extract flags for command handlers
    let no_color = cli.no_color;
    let force_json = cli.format.as_deref() == Some("json");

    match cli.mode {
        Mode::Optimize {
            file,
            campaign,
            json,
        } => {
            run_optimize(&file, campaign, config, json || force_json, no_color).await?;
        }
        Mode::Batch { file, json, export } => {
            run_batch(&file, export, config, json || force_json, no_color).await?;
        }
        Mode::Fit {
            file,
            campaign,
            json,
        } => {
            run_fit(&file, campaign, config, json || force_json, no_color).await?;
        }
        Mode::Config => {
            run_config(&config, config_source.as_deref(), force_json)?;
        }
    }

    Ok(())
}

/// Resolve the optimizer config and the file it came from
///
/// An explicit `--config` must exist; the default location may be absent.
fn load_config(explicit: Option<&Path>) -> Result<(OptimizerConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => match OptimizerConfig::default_path() {
            Some(path) => path,
            None => return Ok((OptimizerConfig::default(), None)),
        },
    };

    let config = OptimizerConfig::load(&path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    let source = path.exists().then_some(path);
    tracing::debug!(source = ?source, "Optimizer config resolved");
    Ok((config, source))
}

/// Load a history file into a fresh store, printing skipped rows unless quiet
async fn load_store(file: &Path, config: OptimizerConfig, quiet: bool) -> Result<HistoryStore> {
    let store = HistoryStore::new(config);
    let mut report = LoadReport::new();

    if !store.load_file(file, &mut report).await {
        for error in report.errors.iter() {
            eprintln!("  - {}: {}", error.source, error.message);
            if let Some(suggestion) = &error.suggestion {
                eprintln!("    hint: {}", suggestion);
            }
        }
        anyhow::bail!("Failed to load history from {}", file.display());
    }

    if !quiet {
        for warning in report.warnings() {
            eprintln!("⚠ {}", warning.message);
        }
    }

    Ok(store)
}

async fn run_optimize(
    file: &Path,
    campaign: Option<String>,
    config: OptimizerConfig,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let store = load_store(file, config, json).await?;
    let campaign =
        cli::select_campaign(&store, campaign.as_deref(), &file.display().to_string())?;

    let result = store.optimize_campaign(&campaign)?;
    println!("{}", cli::format_result(&campaign, &result, json, no_color));

    Ok(())
}

async fn run_batch(
    file: &Path,
    export: Option<PathBuf>,
    config: OptimizerConfig,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let store = load_store(file, config, json).await?;
    let results = store.optimize_all();
    tracing::debug!(campaigns = results.len(), "Batch optimization complete");

    println!("{}", cli::format_batch_table(&results, json, no_color));

    if let Some(path) = export {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            export_results_to_json(&results, &path)?;
        } else {
            export_results_to_csv(&results, &path)?;
        }
        if !json {
            eprintln!(
                "\n✓ Exported {} campaigns to {}",
                results.len(),
                path.display()
            );
        }
    }

    Ok(())
}

async fn run_fit(
    file: &Path,
    campaign: Option<String>,
    config: OptimizerConfig,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let store = load_store(file, config.clone(), json).await?;
    let campaign =
        cli::select_campaign(&store, campaign.as_deref(), &file.display().to_string())?;

    let history = store
        .history(&campaign)
        .ok_or_else(|| CoreError::CampaignNotFound {
            campaign: campaign.clone(),
        })?;
    let diagnostics = SpendOptimizer::new(config).diagnose(&history);

    println!("{}", cli::format_fit(&campaign, &diagnostics, json, no_color));

    Ok(())
}

fn run_config(config: &OptimizerConfig, source: Option<&Path>, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(config).context("Failed to serialize config")?
        );
        return Ok(());
    }

    match source {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# Built-in defaults"),
    }
    println!("{}", config.to_toml_string()?);

    Ok(())
}
