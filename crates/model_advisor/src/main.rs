//! model-advisor: profile this machine, pick an inference backend, and rank
//! catalog models by how well they would run here.

mod config;
mod report;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use hardware_profile::collect_snapshot;
use model_catalog::ModelCatalog;
use model_recommender::rank_variants;

use config::AdvisorConfig;
use report::{BackendReport, HostReport};

#[derive(Parser)]
#[command(name = "model-advisor")]
#[command(version, about = "Hardware-aware model and backend recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the detected hardware, its tier and llama.cpp build flags
    Profile,

    /// Show which inference backend would serve a workload
    Backend {
        /// Workload size in GB (defaults to the configured target size)
        #[arg(long, value_name = "GB")]
        size: Option<f64>,
    },

    /// Rank catalog variants for this machine
    Recommend {
        /// Catalog document to rank instead of the configured one
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,

        /// Limit number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Inspect or export the model catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// Write the built-in catalog to a file
    Export {
        path: PathBuf,
    },

    /// List catalog models
    List {
        /// Catalog document to list instead of the configured one
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AdvisorConfig::load(cli.config.as_deref())?;
    log::debug!("Using config {config:?}");

    match cli.command {
        None => {
            let report = host_report(&config);
            emit(cli.json, &report, HostReport::render_startup)
        }
        Some(Commands::Profile) => {
            let report = host_report(&config);
            emit(cli.json, &report, HostReport::render_profile)
        }
        Some(Commands::Backend { size }) => {
            let snapshot = collect_snapshot(&config.collector_options());
            let target_size_gb = size.unwrap_or(config.target_size_gb);
            let report = BackendReport::new(&snapshot, target_size_gb, &config.backend);
            emit(cli.json, &report, BackendReport::render)
        }
        Some(Commands::Recommend { catalog, limit }) => {
            recommend(&config, catalog.as_deref(), limit, cli.json)
        }
        Some(Commands::Catalog { command }) => match command {
            CatalogCommands::Export { path } => {
                let catalog = ModelCatalog::builtin()?;
                catalog.save_to(&path)?;
                println!("Wrote {} models to {}", catalog.len(), path.display());
                Ok(())
            }
            CatalogCommands::List { catalog } => {
                let catalog = config.load_catalog(catalog.as_deref())?;
                if cli.json {
                    println!("{}", catalog.to_json_pretty()?);
                } else {
                    print!("{}", report::render_catalog(&catalog));
                }
                Ok(())
            }
        },
    }
}

/// `RUST_LOG` wins over the `--verbose` default.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn host_report(config: &AdvisorConfig) -> HostReport {
    let snapshot = collect_snapshot(&config.collector_options());
    HostReport::new(snapshot, config.target_size_gb, &config.backend)
}

fn recommend(
    config: &AdvisorConfig,
    catalog_path: Option<&Path>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    // Fail on a bad catalog before spending time on hardware probes.
    let catalog = config.load_catalog(catalog_path)?;
    let snapshot = collect_snapshot(&config.collector_options());

    let mut ranked = rank_variants(&snapshot, &catalog, &config.scoring);
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    if json {
        println!("{}", report::to_json(&ranked)?);
    } else {
        println!("{}", snapshot.summary());
        print!("{}", report::render_recommendations(&ranked));
    }
    Ok(())
}

fn emit<T: serde::Serialize>(json: bool, report: &T, render: fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", report::to_json(report)?);
    } else {
        print!("{}", render(report));
    }
    Ok(())
}
