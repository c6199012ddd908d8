#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the disaster risk toolchain.
//!
//! Every query and analysis is available as a subcommand. Running without
//! one opens an interactive menu instead.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use disaster_risk_analytics_models::AnalysisConfig;
use disaster_risk_database::{DuckDbStore, db};

#[derive(Parser)]
#[command(
    name = "disaster_risk_cli",
    about = "Disaster risk assessment and evacuation planning"
)]
struct Cli {
    /// Path to the `DuckDB` store (overrides `DISASTER_RISK_DB`)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Analysis configuration TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all districts
    Districts,
    /// Show aggregated facts for one district
    Summary {
        /// District name (e.g., "Nsanje")
        name: String,
    },
    /// List districts with flood history or flood-prone water bodies
    FloodProne,
    /// Find the districts a river flows through
    Rivers {
        /// Partial, case-insensitive river name
        name: String,
    },
    /// List historical disaster events recorded for a district
    Events {
        /// District name
        district: String,
    },
    /// List evacuation centers
    Centers {
        /// Only list centers in this district
        #[arg(long)]
        district: Option<String>,
    },
    /// List infrastructure in a district
    Infrastructure {
        /// District name
        district: String,
    },
    /// List mapped risk zones
    Zones {
        /// Only list zones with this stored risk level (e.g., "High")
        #[arg(long)]
        level: Option<String>,
        /// Only list zones in this district
        #[arg(long)]
        district: Option<String>,
    },
    /// Show census history for a district
    Population {
        /// District name
        district: String,
    },
    /// Run the composite risk assessment
    Assess {
        /// Assess the areas inside one district instead of every district
        #[arg(long)]
        district: Option<String>,
        /// Write the assessments to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Generate an evacuation plan for a district
    Plan {
        /// District name
        district: String,
        /// Write the plan report to this file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Persist the computed routes to the store
        #[arg(long)]
        save_routes: bool,
    },
    /// Create the store schema if it does not exist yet
    Init,
}

fn open_store(path: Option<PathBuf>) -> Result<DuckDbStore, Box<dyn std::error::Error>> {
    let store = match path {
        Some(path) => {
            log::debug!("Opening disaster store at {}", path.display());
            DuckDbStore::open(&path)?
        }
        None => db::connect_from_env()?,
    };
    Ok(store)
}

fn load_config(path: Option<PathBuf>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };

    let text = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config = AnalysisConfig::from_toml_str(&text)?;
    log::info!("Loaded analysis config from {}", path.display());

    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = disaster_risk_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = load_config(cli.config)?;

    let Some(command) = cli.command else {
        let store = open_store(cli.db)?;
        return interactive::run(&store, &config, &multi);
    };

    let store = open_store(cli.db)?;

    match command {
        Commands::Districts => commands::list_districts(&store)?,
        Commands::Summary { name } => commands::show_summary(&store, &name)?,
        Commands::FloodProne => commands::list_flood_prone(&store)?,
        Commands::Rivers { name } => commands::list_rivers(&store, &name)?,
        Commands::Events { district } => commands::list_events(&store, &district)?,
        Commands::Centers { district } => {
            let district = district
                .map(|name| commands::find_district(&store, &name))
                .transpose()?;
            commands::list_centers(&store, district.as_ref())?;
        }
        Commands::Infrastructure { district } => {
            let district = commands::find_district(&store, &district)?;
            commands::list_infrastructure(&store, &district)?;
        }
        Commands::Zones { level, district } => {
            let district = district
                .map(|name| commands::find_district(&store, &name))
                .transpose()?;
            commands::list_zones(&store, level.as_deref(), district.as_ref())?;
        }
        Commands::Population { district } => {
            let district = commands::find_district(&store, &district)?;
            commands::show_population(&store, &district)?;
        }
        Commands::Assess { district, csv } => {
            let district = district
                .map(|name| commands::find_district(&store, &name))
                .transpose()?;
            commands::assess(&store, &config, district.as_ref(), csv.as_deref(), &multi)?;
        }
        Commands::Plan {
            district,
            output,
            save_routes,
        } => {
            let district = commands::find_district(&store, &district)?;
            let plan = commands::plan(&store, &config, &district)?;
            if let Some(output) = output {
                commands::export_plan(&plan, &output)?;
            }
            if save_routes {
                commands::save_routes(&store, &plan);
            }
        }
        Commands::Init => log::info!("Schema ready."),
    }

    Ok(())
}
